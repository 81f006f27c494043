use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::data::user_directory::{MAX_USERS_PER_LOOKUP, UserDirectory};
use crate::domain::author::Author;
use crate::domain::error::DomainError;

#[derive(Debug, Error)]
pub(crate) enum IdentityError {
    #[error("identity client build failed")]
    Build(#[source] reqwest::Error),

    #[error("identity request failed")]
    Request(#[source] reqwest::Error),

    #[error("identity service responded with {0}")]
    Status(reqwest::StatusCode),
}

impl From<IdentityError> for DomainError {
    fn from(err: IdentityError) -> Self {
        DomainError::Unexpected(err.to_string())
    }
}

/// User record as returned by `GET /v1/users`. Everything else the provider
/// sends is dropped during deserialization.
#[derive(Debug, Deserialize)]
struct UserRecordDto {
    id: String,
    first_name: Option<String>,
    last_name: Option<String>,
    username: Option<String>,
    image_url: Option<String>,
    profile_image_url: Option<String>,
}

impl From<UserRecordDto> for Author {
    fn from(record: UserRecordDto) -> Self {
        Self {
            id: record.id,
            first_name: record.first_name,
            last_name: record.last_name,
            username: record.username,
            profile_image_url: record.image_url.or(record.profile_image_url),
        }
    }
}

/// Client for the hosted user directory (Clerk backend API shape).
#[derive(Debug, Clone)]
pub(crate) struct HttpUserDirectory {
    base_url: String,
    secret_key: String,
    client: Client,
}

impl HttpUserDirectory {
    pub(crate) fn new(
        base_url: impl Into<String>,
        secret_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, IdentityError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .timeout(timeout)
            .build()
            .map_err(IdentityError::Build)?;

        Ok(Self {
            base_url: base_url.into(),
            secret_key: secret_key.into(),
            client,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    async fn fetch_users(&self, query: &[(&str, String)]) -> Result<Vec<Author>, IdentityError> {
        let response = self
            .client
            .get(self.endpoint("/v1/users"))
            .bearer_auth(&self.secret_key)
            .query(query)
            .send()
            .await
            .map_err(IdentityError::Request)?;

        let status = response.status();
        if !status.is_success() {
            return Err(IdentityError::Status(status));
        }

        let records = response
            .json::<Vec<UserRecordDto>>()
            .await
            .map_err(IdentityError::Request)?;
        Ok(records.into_iter().map(Author::from).collect())
    }
}

#[async_trait]
impl UserDirectory for HttpUserDirectory {
    async fn find_by_ids(&self, ids: &[String]) -> Result<Vec<Author>, DomainError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut query: Vec<(&str, String)> = ids
            .iter()
            .take(MAX_USERS_PER_LOOKUP)
            .map(|id| ("user_id", id.clone()))
            .collect();
        query.push(("limit", MAX_USERS_PER_LOOKUP.to_string()));

        let authors = self.fetch_users(&query).await?;
        debug!(requested = ids.len(), found = authors.len(), "identity lookup by ids");
        Ok(authors)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<Author>, DomainError> {
        let query = [("username", username.to_string()), ("limit", "1".to_string())];
        let authors = self.fetch_users(&query).await?;

        // the provider matches usernames case-insensitively; keep only an exact hit
        Ok(authors
            .into_iter()
            .find(|author| author.username.as_deref() == Some(username)))
    }
}
