//! Hand-written fakes behind the data-layer traits, shared by unit tests.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};

use crate::data::post_repository::{NewPost, PostQuery, PostRepository};
use crate::data::rate_limiter::{RateLimitDecision, RateLimiter};
use crate::data::user_directory::UserDirectory;
use crate::domain::author::Author;
use crate::domain::error::DomainError;
use crate::domain::post::Post;

#[derive(Clone)]
pub(crate) struct FakePostRepo {
    posts: Arc<Mutex<Vec<Post>>>,
    last_query: Arc<Mutex<Option<PostQuery>>>,
    epoch: DateTime<Utc>,
}

impl FakePostRepo {
    pub(crate) fn new() -> Self {
        Self {
            posts: Arc::new(Mutex::new(Vec::new())),
            last_query: Arc::new(Mutex::new(None)),
            epoch: Utc::now(),
        }
    }

    pub(crate) fn seed(&self, author_id: &str, count: usize) {
        let mut posts = self.posts.lock().expect("posts mutex poisoned");
        for _ in 0..count {
            let id = posts.len() as i64 + 1;
            let created_at = self.epoch + Duration::seconds(id);
            posts.push(
                Post::new(id, author_id, format!("post {id}"), created_at)
                    .expect("seed post must be valid"),
            );
        }
    }

    pub(crate) fn last_author_filter(&self) -> Option<String> {
        self.last_query
            .lock()
            .expect("last_query mutex poisoned")
            .as_ref()
            .and_then(|query| query.author_id.clone())
    }

    pub(crate) fn stored(&self) -> usize {
        self.posts.lock().expect("posts mutex poisoned").len()
    }
}

#[async_trait]
impl PostRepository for FakePostRepo {
    async fn create_post(&self, input: NewPost) -> Result<Post, DomainError> {
        let mut posts = self.posts.lock().expect("posts mutex poisoned");
        let id = posts.len() as i64 + 1;
        let post = Post::new(
            id,
            input.author_id,
            input.content,
            self.epoch + Duration::seconds(id),
        )?;
        posts.push(post.clone());
        Ok(post)
    }

    async fn get_post(&self, id: i64) -> Result<Option<Post>, DomainError> {
        Ok(self
            .posts
            .lock()
            .expect("posts mutex poisoned")
            .iter()
            .find(|post| post.id == id)
            .cloned())
    }

    async fn list_posts(&self, query: PostQuery) -> Result<Vec<Post>, DomainError> {
        let limit = query.effective_limit() as usize;
        *self.last_query.lock().expect("last_query mutex poisoned") = Some(query.clone());

        let mut posts: Vec<Post> = self
            .posts
            .lock()
            .expect("posts mutex poisoned")
            .iter()
            .filter(|post| {
                query
                    .author_id
                    .as_deref()
                    .is_none_or(|author_id| post.author_id == author_id)
            })
            .cloned()
            .collect();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        posts.truncate(limit);
        Ok(posts)
    }
}

#[derive(Clone)]
pub(crate) struct FakeDirectory {
    authors: Arc<Vec<Author>>,
    lookups: Arc<Mutex<Vec<Vec<String>>>>,
}

impl FakeDirectory {
    pub(crate) fn new(authors: Vec<Author>) -> Self {
        Self {
            authors: Arc::new(authors),
            lookups: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub(crate) fn lookups(&self) -> Vec<Vec<String>> {
        self.lookups.lock().expect("lookups mutex poisoned").clone()
    }
}

#[async_trait]
impl UserDirectory for FakeDirectory {
    async fn find_by_ids(&self, ids: &[String]) -> Result<Vec<Author>, DomainError> {
        self.lookups
            .lock()
            .expect("lookups mutex poisoned")
            .push(ids.to_vec());
        Ok(self
            .authors
            .iter()
            .filter(|author| ids.contains(&author.id))
            .cloned()
            .collect())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<Author>, DomainError> {
        Ok(self
            .authors
            .iter()
            .find(|author| author.username.as_deref() == Some(username))
            .cloned())
    }
}

#[derive(Clone)]
pub(crate) struct FixedLimiter {
    decision: RateLimitDecision,
    calls: Arc<Mutex<Vec<String>>>,
}

impl FixedLimiter {
    pub(crate) fn new(decision: RateLimitDecision) -> Self {
        Self {
            decision,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("calls mutex poisoned").clone()
    }
}

#[async_trait]
impl RateLimiter for FixedLimiter {
    async fn check(&self, key: &str) -> Result<RateLimitDecision, DomainError> {
        self.calls
            .lock()
            .expect("calls mutex poisoned")
            .push(key.to_string());
        Ok(self.decision)
    }
}

pub(crate) fn author(id: &str, username: Option<&str>) -> Author {
    Author {
        id: id.to_string(),
        first_name: Some("First".to_string()),
        last_name: Some("Last".to_string()),
        username: username.map(str::to_string),
        profile_image_url: Some(format!("https://img.example.com/{id}.png")),
    }
}
