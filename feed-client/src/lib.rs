//! Client library for `feed-server`.
//!
//! `FeedClient` wraps the REST API: the public feed, per-user feeds, single
//! posts, profile lookup and post creation. Creating a post needs a session
//! token issued by the identity provider, set once with [`FeedClient::set_token`].
#![warn(missing_docs)]

mod error;
mod http_client;
mod models;

pub use error::{FeedClientError, FeedClientResult};
pub use models::{Author, FeedEntry, Post, Profile};

use http_client::HttpClient;

#[derive(Debug, Clone)]
/// Feed API client over HTTP.
pub struct FeedClient {
    http_client: HttpClient,
    token: Option<String>,
}

impl FeedClient {
    /// Creates a client for the server at `base_url`, e.g. `http://127.0.0.1:8080`.
    pub fn new(base_url: impl Into<String>) -> FeedClientResult<Self> {
        Ok(Self {
            http_client: HttpClient::new(base_url)?,
            token: None,
        })
    }

    /// Sets the session token used for authenticated calls.
    pub fn set_token(&mut self, token: impl Into<String>) {
        self.token = Some(token.into());
    }

    /// Current session token, if any.
    pub fn get_token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Drops the stored session token.
    pub fn clear_token(&mut self) {
        self.token = None;
    }

    /// Newest posts (at most 100) with their authors.
    pub async fn list_posts(&self) -> FeedClientResult<Vec<FeedEntry>> {
        self.http_client.list_posts().await
    }

    /// Newest posts (at most 100) of one user.
    pub async fn list_user_posts(&self, user_id: &str) -> FeedClientResult<Vec<FeedEntry>> {
        self.http_client.list_user_posts(user_id).await
    }

    /// One post with its author.
    pub async fn get_post(&self, id: i64) -> FeedClientResult<FeedEntry> {
        self.http_client.get_post(id).await
    }

    /// Profile by username; a leading `@` is accepted.
    pub async fn get_profile(&self, username: &str) -> FeedClientResult<Profile> {
        self.http_client.get_profile(username).await
    }

    /// Creates a post as the token's user.
    ///
    /// Fails with [`FeedClientError::RateLimited`] after three posts within a minute.
    pub async fn create_post(&self, content: &str) -> FeedClientResult<Post> {
        let token = self.require_token()?;
        self.http_client.create_post(token, content).await
    }

    fn require_token(&self) -> FeedClientResult<&str> {
        self.token.as_deref().ok_or(FeedClientError::Unauthorized)
    }
}
