use async_trait::async_trait;

use crate::domain::error::DomainError;
use crate::domain::post::Post;

/// Upper bound for every post listing.
pub(crate) const MAX_POSTS_PER_QUERY: u32 = 100;

#[derive(Debug, Clone)]
pub(crate) struct NewPost {
    pub(crate) content: String,
    pub(crate) author_id: String,
}

/// Listing filter. Results are always newest first.
#[derive(Debug, Clone, Default)]
pub(crate) struct PostQuery {
    pub(crate) author_id: Option<String>,
    pub(crate) limit: u32,
}

impl PostQuery {
    pub(crate) fn latest() -> Self {
        Self {
            author_id: None,
            limit: MAX_POSTS_PER_QUERY,
        }
    }

    pub(crate) fn by_author(author_id: impl Into<String>) -> Self {
        Self {
            author_id: Some(author_id.into()),
            limit: MAX_POSTS_PER_QUERY,
        }
    }

    pub(crate) fn effective_limit(&self) -> i64 {
        i64::from(self.limit.clamp(1, MAX_POSTS_PER_QUERY))
    }
}

#[async_trait]
pub(crate) trait PostRepository: Send + Sync {
    async fn create_post(&self, input: NewPost) -> Result<Post, DomainError>;
    async fn get_post(&self, id: i64) -> Result<Option<Post>, DomainError>;
    async fn list_posts(&self, query: PostQuery) -> Result<Vec<Post>, DomainError>;
}
