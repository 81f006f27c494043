use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::DomainError;

/// Content limit in UTF-16 code units, so an emoji outside the BMP counts twice.
pub(crate) const MAX_CONTENT_LEN: usize = 280;

pub(crate) const CONTENT_EMPTY_MESSAGE: &str = "Content cannot be empty";
pub(crate) const CONTENT_TOO_LONG_MESSAGE: &str = "Content is too long";
pub(crate) const CONTENT_NUL_MESSAGE: &str = "Content cannot contain null characters";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct Post {
    pub(crate) id: i64,
    pub(crate) author_id: String,
    pub(crate) content: String,
    pub(crate) created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct CreatePostRequest {
    pub(crate) content: String,
}

impl CreatePostRequest {
    /// Content is kept verbatim; only its length and NUL bytes are checked.
    pub(crate) fn validate(self) -> Result<Self, DomainError> {
        check_content(&self.content)?;
        Ok(self)
    }
}

impl Post {
    pub(crate) fn new(
        id: i64,
        author_id: impl Into<String>,
        content: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        if id <= 0 {
            return Err(DomainError::Validation {
                field: "id",
                message: "must be > 0",
            });
        }
        let author_id = author_id.into();
        if author_id.trim().is_empty() {
            return Err(DomainError::Validation {
                field: "author_id",
                message: "must not be empty",
            });
        }
        let content = content.into();
        check_content(&content)?;

        Ok(Self {
            id,
            author_id,
            content,
            created_at,
        })
    }
}

pub(crate) fn check_content(content: &str) -> Result<(), DomainError> {
    let len = content.encode_utf16().count();
    if len == 0 {
        return Err(DomainError::Validation {
            field: "content",
            message: CONTENT_EMPTY_MESSAGE,
        });
    }
    if len > MAX_CONTENT_LEN {
        return Err(DomainError::Validation {
            field: "content",
            message: CONTENT_TOO_LONG_MESSAGE,
        });
    }
    // postgres text cannot store U+0000
    if content.contains('\0') {
        return Err(DomainError::Validation {
            field: "content",
            message: CONTENT_NUL_MESSAGE,
        });
    }
    Ok(())
}
