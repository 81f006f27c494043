use std::sync::Arc;

use tracing::{error, info};

use crate::data::post_repository::{NewPost, PostQuery, PostRepository};
use crate::data::rate_limiter::RateLimiter;
use crate::data::user_directory::{MAX_USERS_PER_LOOKUP, UserDirectory};
use crate::domain::author::{Author, EnrichedPost, attach_authors, distinct_author_ids};
use crate::domain::error::DomainError;
use crate::domain::post::{CreatePostRequest, Post};

pub(crate) struct FeedService {
    posts: Arc<dyn PostRepository>,
    users: Arc<dyn UserDirectory>,
    limiter: Arc<dyn RateLimiter>,
}

impl FeedService {
    pub(crate) fn new(
        posts: Arc<dyn PostRepository>,
        users: Arc<dyn UserDirectory>,
        limiter: Arc<dyn RateLimiter>,
    ) -> Self {
        Self {
            posts,
            users,
            limiter,
        }
    }

    pub(crate) async fn list_all(&self) -> Result<Vec<EnrichedPost>, DomainError> {
        let posts = self.posts.list_posts(PostQuery::latest()).await?;
        self.enrich(posts).await
    }

    pub(crate) async fn list_by_author(
        &self,
        author_id: &str,
    ) -> Result<Vec<EnrichedPost>, DomainError> {
        let posts = self.posts.list_posts(PostQuery::by_author(author_id)).await?;
        self.enrich(posts).await
    }

    pub(crate) async fn get_post(&self, id: i64) -> Result<EnrichedPost, DomainError> {
        let post = self
            .posts
            .get_post(id)
            .await?
            .ok_or(DomainError::NotFound(format!("post id: {id}")))?;

        let mut enriched = self.enrich(vec![post]).await?;
        enriched
            .pop()
            .ok_or_else(|| DomainError::Unexpected(format!("post id {id} lost during enrichment")))
    }

    /// Validates, then consumes one rate-limit unit for the author, then writes.
    pub(crate) async fn create_post(
        &self,
        author_id: &str,
        req: CreatePostRequest,
    ) -> Result<Post, DomainError> {
        let req = req.validate()?;

        if !self.limiter.check(author_id).await?.is_allowed() {
            return Err(DomainError::RateLimited);
        }

        let post = self
            .posts
            .create_post(NewPost {
                content: req.content,
                author_id: author_id.to_string(),
            })
            .await?;

        info!(post_id = post.id, author_id, "post created");
        Ok(post)
    }

    pub(crate) async fn profile_by_username(&self, username: &str) -> Result<Author, DomainError> {
        let username = username.trim().trim_start_matches('@');
        if username.is_empty() {
            return Err(DomainError::Validation {
                field: "username",
                message: "must not be empty",
            });
        }

        self.users
            .find_by_username(username)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("user: {username}")))
    }

    async fn enrich(&self, posts: Vec<Post>) -> Result<Vec<EnrichedPost>, DomainError> {
        if posts.is_empty() {
            return Ok(Vec::new());
        }

        let author_ids = distinct_author_ids(&posts, MAX_USERS_PER_LOOKUP);
        let authors = self.users.find_by_ids(&author_ids).await?;

        attach_authors(posts, authors).inspect_err(|err| {
            error!(error = %err, "identity directory and post store disagree");
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::FeedService;
    use crate::data::rate_limiter::{
        CREATE_POST_QUOTA, CREATE_POST_WINDOW, RateLimitDecision, RateLimiter,
    };
    use crate::domain::error::DomainError;
    use crate::domain::post::{CreatePostRequest, MAX_CONTENT_LEN};
    use crate::infrastructure::memory_rate_limiter::InMemoryRateLimiter;
    use crate::test_support::{FakeDirectory, FakePostRepo, FixedLimiter, author};

    fn service(
        repo: &FakePostRepo,
        directory: &FakeDirectory,
        limiter: Arc<dyn RateLimiter>,
    ) -> FeedService {
        FeedService::new(Arc::new(repo.clone()), Arc::new(directory.clone()), limiter)
    }

    fn content(text: &str) -> CreatePostRequest {
        CreatePostRequest {
            content: text.to_string(),
        }
    }

    #[tokio::test]
    async fn create_post_stores_content_verbatim() {
        let repo = FakePostRepo::new();
        let directory = FakeDirectory::new(Vec::new());
        let limiter = FixedLimiter::new(RateLimitDecision::Allowed);
        let service = service(&repo, &directory, Arc::new(limiter.clone()));

        for text in ["a".to_string(), "  hi  ".to_string(), "b".repeat(MAX_CONTENT_LEN)] {
            let post = service
                .create_post("user_a", content(&text))
                .await
                .expect("create must succeed");
            assert_eq!(post.content, text);
            assert_eq!(post.author_id, "user_a");
        }
        assert_eq!(limiter.calls(), vec!["user_a"; 3]);
    }

    #[tokio::test]
    async fn create_post_rejects_invalid_content_before_rate_limit() {
        let repo = FakePostRepo::new();
        let directory = FakeDirectory::new(Vec::new());
        let limiter = FixedLimiter::new(RateLimitDecision::Allowed);
        let service = service(&repo, &directory, Arc::new(limiter.clone()));

        for text in [
            String::new(),
            "x".repeat(MAX_CONTENT_LEN + 1),
            "nul\u{0}byte".to_string(),
        ] {
            let err = service
                .create_post("user_a", content(&text))
                .await
                .expect_err("invalid content must fail");
            assert!(matches!(err, DomainError::Validation { field: "content", .. }));
        }

        assert_eq!(repo.stored(), 0);
        assert!(limiter.calls().is_empty());
    }

    #[tokio::test]
    async fn create_post_denied_by_limiter_writes_nothing() {
        let repo = FakePostRepo::new();
        let directory = FakeDirectory::new(Vec::new());
        let service = service(
            &repo,
            &directory,
            Arc::new(FixedLimiter::new(RateLimitDecision::Denied)),
        );

        let err = service
            .create_post("user_a", content("hello"))
            .await
            .expect_err("must be rate limited");

        assert!(matches!(err, DomainError::RateLimited));
        assert_eq!(repo.stored(), 0);
    }

    #[tokio::test]
    async fn fourth_create_in_window_is_rate_limited() {
        let repo = FakePostRepo::new();
        let directory = FakeDirectory::new(Vec::new());
        let limiter = InMemoryRateLimiter::new(CREATE_POST_QUOTA, CREATE_POST_WINDOW);
        let service = service(&repo, &directory, Arc::new(limiter));

        for n in 0..3 {
            service
                .create_post("user_a", content(&format!("post {n}")))
                .await
                .expect("first three creates succeed");
        }

        let err = service
            .create_post("user_a", content("one too many"))
            .await
            .expect_err("fourth create must be limited");
        assert!(matches!(err, DomainError::RateLimited));
        assert_eq!(repo.stored(), 3);

        service
            .create_post("user_b", content("someone else"))
            .await
            .expect("other authors are unaffected");
    }

    #[tokio::test]
    async fn list_all_returns_newest_first_and_caps_at_100() {
        let repo = FakePostRepo::new();
        repo.seed("user_a", 70);
        repo.seed("user_b", 60);
        let directory = FakeDirectory::new(vec![
            author("user_a", Some("alice")),
            author("user_b", Some("bob")),
        ]);
        let service = service(
            &repo,
            &directory,
            Arc::new(FixedLimiter::new(RateLimitDecision::Allowed)),
        );

        let feed = service.list_all().await.expect("list_all must succeed");

        assert_eq!(feed.len(), 100);
        assert!(
            feed.windows(2)
                .all(|pair| pair[0].post.created_at >= pair[1].post.created_at)
        );
        assert_eq!(feed[0].post.id, 130);
        assert_eq!(feed[0].author.username, "bob");

        let lookups = directory.lookups();
        assert_eq!(lookups.len(), 1, "authors are fetched in one batch");
        assert_eq!(lookups[0], vec!["user_b".to_string(), "user_a".to_string()]);
    }

    #[tokio::test]
    async fn list_by_author_filters_posts() {
        let repo = FakePostRepo::new();
        repo.seed("user_a", 3);
        repo.seed("user_b", 2);
        repo.seed("user_a", 1);
        let directory = FakeDirectory::new(vec![
            author("user_a", Some("alice")),
            author("user_b", Some("bob")),
        ]);
        let service = service(
            &repo,
            &directory,
            Arc::new(FixedLimiter::new(RateLimitDecision::Allowed)),
        );

        let feed = service
            .list_by_author("user_a")
            .await
            .expect("list_by_author must succeed");

        let ids: Vec<i64> = feed.iter().map(|entry| entry.post.id).collect();
        assert_eq!(ids, vec![6, 3, 2, 1]);
        assert!(feed.iter().all(|entry| entry.post.author_id == "user_a"));
        assert_eq!(repo.last_author_filter(), Some("user_a".to_string()));
    }

    #[tokio::test]
    async fn list_skips_directory_when_feed_is_empty() {
        let repo = FakePostRepo::new();
        let directory = FakeDirectory::new(Vec::new());
        let service = service(
            &repo,
            &directory,
            Arc::new(FixedLimiter::new(RateLimitDecision::Allowed)),
        );

        let feed = service.list_all().await.expect("empty feed is fine");

        assert!(feed.is_empty());
        assert!(directory.lookups().is_empty());
    }

    #[tokio::test]
    async fn list_fails_when_author_is_unresolved() {
        let repo = FakePostRepo::new();
        repo.seed("user_a", 2);
        repo.seed("ghost", 1);
        let directory = FakeDirectory::new(vec![author("user_a", Some("alice"))]);
        let service = service(
            &repo,
            &directory,
            Arc::new(FixedLimiter::new(RateLimitDecision::Allowed)),
        );

        let err = service.list_all().await.expect_err("ghost author must fail");
        assert!(matches!(err, DomainError::AuthorNotFound(_)));
    }

    #[tokio::test]
    async fn list_fails_when_author_has_no_username() {
        let repo = FakePostRepo::new();
        repo.seed("user_a", 1);
        let directory = FakeDirectory::new(vec![author("user_a", None)]);
        let service = service(
            &repo,
            &directory,
            Arc::new(FixedLimiter::new(RateLimitDecision::Allowed)),
        );

        let err = service
            .list_by_author("user_a")
            .await
            .expect_err("missing username must fail");
        assert!(matches!(err, DomainError::AuthorNotFound(_)));
    }

    #[tokio::test]
    async fn get_post_returns_enriched_post_or_not_found() {
        let repo = FakePostRepo::new();
        repo.seed("user_a", 2);
        let directory = FakeDirectory::new(vec![author("user_a", Some("alice"))]);
        let service = service(
            &repo,
            &directory,
            Arc::new(FixedLimiter::new(RateLimitDecision::Allowed)),
        );

        let found = service.get_post(2).await.expect("post 2 exists");
        assert_eq!(found.post.id, 2);
        assert_eq!(found.author.username, "alice");

        let err = service.get_post(42).await.expect_err("post 42 is missing");
        assert!(matches!(err, DomainError::NotFound(_)));
    }

    #[tokio::test]
    async fn profile_by_username_strips_at_sign() {
        let repo = FakePostRepo::new();
        let directory = FakeDirectory::new(vec![author("user_a", Some("alice"))]);
        let service = service(
            &repo,
            &directory,
            Arc::new(FixedLimiter::new(RateLimitDecision::Allowed)),
        );

        let profile = service
            .profile_by_username("@alice")
            .await
            .expect("profile must be found");
        assert_eq!(profile.id, "user_a");

        let err = service
            .profile_by_username("nobody")
            .await
            .expect_err("unknown user");
        assert!(matches!(err, DomainError::NotFound(_)));

        let err = service.profile_by_username("@").await.expect_err("blank");
        assert!(matches!(err, DomainError::Validation { field: "username", .. }));
    }
}
