use async_trait::async_trait;

use crate::domain::author::Author;
use crate::domain::error::DomainError;

/// Batch size the identity service accepts in one lookup.
pub(crate) const MAX_USERS_PER_LOOKUP: usize = 100;

/// Read-only view of the external user directory.
#[async_trait]
pub(crate) trait UserDirectory: Send + Sync {
    /// Records for the given ids. Unknown ids are simply absent from the result.
    async fn find_by_ids(&self, ids: &[String]) -> Result<Vec<Author>, DomainError>;
    async fn find_by_username(&self, username: &str) -> Result<Option<Author>, DomainError>;
}
