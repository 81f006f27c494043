use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::data::post_repository::{NewPost, PostQuery, PostRepository};
use crate::domain::error::DomainError;
use crate::domain::post::{
    CONTENT_EMPTY_MESSAGE, CONTENT_NUL_MESSAGE, CONTENT_TOO_LONG_MESSAGE, Post,
};

#[derive(Debug, Clone)]
pub(crate) struct PostgresPostRepository {
    pool: PgPool,
}

impl PostgresPostRepository {
    pub(crate) fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct PostRow {
    id: i64,
    author_id: String,
    content: String,
    created_at: DateTime<Utc>,
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn create_post(&self, input: NewPost) -> Result<Post, DomainError> {
        let row = sqlx::query_as::<_, PostRow>(
            r#"
            INSERT INTO posts (content, author_id)
            VALUES ($1, $2)
            RETURNING id, author_id, content, created_at
            "#,
        )
        .bind(&input.content)
        .bind(&input.author_id)
        .fetch_one(&self.pool)
        .await
        .map_err(map_post_db_error)?;

        map_row_to_post(row)
    }

    async fn get_post(&self, id: i64) -> Result<Option<Post>, DomainError> {
        let row = sqlx::query_as::<_, PostRow>(
            r#"
            SELECT
            id,
            author_id,
            content,
            created_at
            FROM posts
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_post_db_error)?;

        row.map(map_row_to_post).transpose()
    }

    async fn list_posts(&self, query: PostQuery) -> Result<Vec<Post>, DomainError> {
        let rows = sqlx::query_as::<_, PostRow>(
            r#"
            SELECT
                id,
                author_id,
                content,
                created_at
            FROM posts
            WHERE ($1::TEXT IS NULL OR author_id = $1)
            ORDER BY created_at DESC, id DESC
            LIMIT $2
            "#,
        )
        .bind(query.author_id.as_deref())
        .bind(query.effective_limit())
        .fetch_all(&self.pool)
        .await
        .map_err(map_post_db_error)?;

        rows.into_iter().map(map_row_to_post).collect()
    }
}

fn map_row_to_post(row: PostRow) -> Result<Post, DomainError> {
    Post::new(row.id, row.author_id, row.content, row.created_at)
        .map_err(|err| DomainError::Unexpected(err.to_string()))
}

fn map_post_db_error(err: sqlx::Error) -> DomainError {
    if let sqlx::Error::Database(db_err) = &err
        && let Some(message) = db_err.code().as_deref().and_then(content_violation)
    {
        return DomainError::Validation {
            field: "content",
            message,
        };
    }
    DomainError::Unexpected(err.to_string())
}

/// Field message for SQLSTATE codes raised by bad post content.
fn content_violation(code: &str) -> Option<&'static str> {
    match code {
        // check_violation: char_length(content) >= 1
        "23514" => Some(CONTENT_EMPTY_MESSAGE),
        // string_data_right_truncation: VARCHAR(280)
        "22001" => Some(CONTENT_TOO_LONG_MESSAGE),
        // character_not_in_repertoire: U+0000
        "22021" => Some(CONTENT_NUL_MESSAGE),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use std::time::{SystemTime, UNIX_EPOCH};

    use super::{PostgresPostRepository, content_violation};
    use crate::data::post_repository::{NewPost, PostQuery, PostRepository};
    use crate::domain::error::DomainError;
    use crate::domain::post::{
        CONTENT_EMPTY_MESSAGE, CONTENT_NUL_MESSAGE, CONTENT_TOO_LONG_MESSAGE,
    };
    use crate::infrastructure::database::{create_pool, run_migrations};

    #[test]
    fn content_violations_map_to_field_messages() {
        assert_eq!(content_violation("23514"), Some(CONTENT_EMPTY_MESSAGE));
        assert_eq!(content_violation("22001"), Some(CONTENT_TOO_LONG_MESSAGE));
        assert_eq!(content_violation("22021"), Some(CONTENT_NUL_MESSAGE));
        assert_eq!(content_violation("23505"), None);
    }

    async fn repository() -> PostgresPostRepository {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must point at postgres");
        let pool = create_pool(&url).await.expect("pool must connect");
        run_migrations(&pool).await.expect("migrations must apply");
        PostgresPostRepository::new(pool)
    }

    fn unique_author(prefix: &str) -> String {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system clock must be after unix epoch")
            .as_nanos();
        format!("{prefix}_{nanos}")
    }

    async fn insert(repo: &PostgresPostRepository, author_id: &str, content: &str) -> i64 {
        repo.create_post(NewPost {
            content: content.to_string(),
            author_id: author_id.to_string(),
        })
        .await
        .expect("insert must succeed")
        .id
    }

    #[tokio::test]
    #[ignore = "requires postgres"]
    async fn list_filters_by_author_and_orders_newest_first() {
        let repo = repository().await;
        let author = unique_author("pg_author");
        let other = unique_author("pg_other");

        let first = insert(&repo, &author, "first").await;
        let foreign = insert(&repo, &other, "foreign").await;
        let second = insert(&repo, &author, "second").await;
        let third = insert(&repo, &author, "third").await;

        let own = repo
            .list_posts(PostQuery::by_author(author.clone()))
            .await
            .expect("list must succeed");
        let ids: Vec<i64> = own.iter().map(|post| post.id).collect();
        assert_eq!(ids, vec![third, second, first]);
        assert!(own.iter().all(|post| post.author_id == author));
        assert!(!ids.contains(&foreign));

        let limited = repo
            .list_posts(PostQuery {
                author_id: Some(author.clone()),
                limit: 2,
            })
            .await
            .expect("list must succeed");
        let ids: Vec<i64> = limited.iter().map(|post| post.id).collect();
        assert_eq!(ids, vec![third, second]);
    }

    #[tokio::test]
    #[ignore = "requires postgres"]
    async fn latest_is_capped_and_sorted() {
        let repo = repository().await;
        let author = unique_author("pg_latest");
        for n in 0..3 {
            insert(&repo, &author, &format!("post {n}")).await;
        }

        let feed = repo
            .list_posts(PostQuery::latest())
            .await
            .expect("list must succeed");
        assert!(!feed.is_empty());
        assert!(feed.len() <= 100);
        assert!(feed.windows(2).all(|pair| {
            (pair[0].created_at, pair[0].id) > (pair[1].created_at, pair[1].id)
        }));
    }

    #[tokio::test]
    #[ignore = "requires postgres"]
    async fn get_post_finds_inserted_row() {
        let repo = repository().await;
        let author = unique_author("pg_get");
        let id = insert(&repo, &author, "  kept verbatim  ").await;

        let post = repo
            .get_post(id)
            .await
            .expect("get must succeed")
            .expect("post must exist");
        assert_eq!(post.content, "  kept verbatim  ");
        assert_eq!(post.author_id, author);

        let missing = repo.get_post(i64::MAX).await.expect("get must succeed");
        assert!(missing.is_none());
    }

    #[tokio::test]
    #[ignore = "requires postgres"]
    async fn database_rejections_become_validation_errors() {
        let repo = repository().await;
        let author = unique_author("pg_invalid");

        for (content, expected) in [
            (String::new(), CONTENT_EMPTY_MESSAGE),
            ("a".repeat(281), CONTENT_TOO_LONG_MESSAGE),
            ("a\u{0}b".to_string(), CONTENT_NUL_MESSAGE),
        ] {
            let err = repo
                .create_post(NewPost {
                    content,
                    author_id: author.clone(),
                })
                .await
                .expect_err("invalid content must be rejected");
            match err {
                DomainError::Validation { field, message } => {
                    assert_eq!(field, "content");
                    assert_eq!(message, expected);
                }
                other => panic!("expected validation error, got {other:?}"),
            }
        }
    }
}
