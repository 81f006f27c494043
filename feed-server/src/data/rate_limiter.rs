use std::time::Duration;

use async_trait::async_trait;

use crate::domain::error::DomainError;

/// Posts one author may create inside [`CREATE_POST_WINDOW`].
pub(crate) const CREATE_POST_QUOTA: u32 = 3;
pub(crate) const CREATE_POST_WINDOW: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RateLimitDecision {
    Allowed,
    Denied,
}

impl RateLimitDecision {
    pub(crate) fn is_allowed(self) -> bool {
        matches!(self, Self::Allowed)
    }
}

/// Sliding-window gate. An allowed check consumes one unit for `key`;
/// a denied check consumes nothing.
#[async_trait]
pub(crate) trait RateLimiter: Send + Sync {
    async fn check(&self, key: &str) -> Result<RateLimitDecision, DomainError>;
}
