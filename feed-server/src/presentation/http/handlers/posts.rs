use std::borrow::Cow;

use axum::{
    Json,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use crate::domain::author::{EnrichedPost, PostAuthor};
use crate::domain::error::DomainError;
use crate::domain::post::{CreatePostRequest, Post, check_content};
use crate::presentation::AppState;
use crate::presentation::http::app_error::AppResult;
use crate::presentation::http::middleware::auth::AuthenticatedUser;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub(crate) struct CreatePostDto {
    /// 1..=280 characters.
    #[validate(custom(function = "validate_post_content"))]
    pub(crate) content: String,
}

fn validate_post_content(content: &str) -> Result<(), ValidationError> {
    match check_content(content) {
        Ok(()) => Ok(()),
        Err(DomainError::Validation { message, .. }) => {
            Err(ValidationError::new("length").with_message(Cow::Borrowed(message)))
        }
        Err(_) => Err(ValidationError::new("content")),
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct PostDto {
    pub(crate) id: i64,
    pub(crate) author_id: String,
    pub(crate) content: String,
    pub(crate) created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct AuthorDto {
    pub(crate) id: String,
    pub(crate) first_name: Option<String>,
    pub(crate) last_name: Option<String>,
    pub(crate) username: String,
    pub(crate) profile_image_url: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct EnrichedPostDto {
    pub(crate) post: PostDto,
    pub(crate) author: AuthorDto,
}

impl From<Post> for PostDto {
    fn from(post: Post) -> Self {
        Self {
            id: post.id,
            author_id: post.author_id,
            content: post.content,
            created_at: post.created_at,
        }
    }
}

impl From<PostAuthor> for AuthorDto {
    fn from(author: PostAuthor) -> Self {
        Self {
            id: author.id,
            first_name: author.first_name,
            last_name: author.last_name,
            username: author.username,
            profile_image_url: author.profile_image_url,
        }
    }
}

impl From<EnrichedPost> for EnrichedPostDto {
    fn from(entry: EnrichedPost) -> Self {
        Self {
            post: entry.post.into(),
            author: entry.author.into(),
        }
    }
}

fn to_feed(entries: Vec<EnrichedPost>) -> Vec<EnrichedPostDto> {
    entries.into_iter().map(EnrichedPostDto::from).collect()
}

#[utoipa::path(
    get,
    path = "/api/posts",
    tag = "posts",
    responses(
        (status = 200, description = "Newest 100 posts with their authors", body = [EnrichedPostDto]),
        (status = 500, description = "Author not found or internal error")
    )
)]
pub(crate) async fn list_posts(
    State(state): State<AppState>,
) -> AppResult<(StatusCode, Json<Vec<EnrichedPostDto>>)> {
    let feed = state.feed_service.list_all().await?;
    Ok((StatusCode::OK, Json(to_feed(feed))))
}

#[utoipa::path(
    get,
    path = "/api/users/{user_id}/posts",
    tag = "posts",
    params(
        ("user_id" = String, Path, description = "Identity provider user id")
    ),
    responses(
        (status = 200, description = "Newest 100 posts of the user", body = [EnrichedPostDto]),
        (status = 500, description = "Author not found or internal error")
    )
)]
pub(crate) async fn list_user_posts(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> AppResult<(StatusCode, Json<Vec<EnrichedPostDto>>)> {
    let feed = state.feed_service.list_by_author(&user_id).await?;
    Ok((StatusCode::OK, Json(to_feed(feed))))
}

#[utoipa::path(
    get,
    path = "/api/posts/{id}",
    tag = "posts",
    params(
        ("id" = i64, Path, description = "Post id")
    ),
    responses(
        (status = 200, description = "Post found", body = EnrichedPostDto),
        (status = 400, description = "Id is not a number"),
        (status = 404, description = "Post not found"),
        (status = 500, description = "Author not found or internal error")
    )
)]
pub(crate) async fn get_post(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> AppResult<(StatusCode, Json<EnrichedPostDto>)> {
    let Path(id) = path?;
    let entry = state.feed_service.get_post(id).await?;
    Ok((StatusCode::OK, Json(EnrichedPostDto::from(entry))))
}

#[utoipa::path(
    post,
    path = "/api/posts",
    tag = "posts",
    security(
        ("bearer_auth" = [])
    ),
    request_body = CreatePostDto,
    responses(
        (status = 201, description = "Post created", body = PostDto),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 429, description = "Rate limit exceeded"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn create_post(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    payload: Result<Json<CreatePostDto>, JsonRejection>,
) -> AppResult<(StatusCode, Json<PostDto>)> {
    let Json(dto) = payload?;
    dto.validate()?;
    let req = CreatePostRequest {
        content: dto.content,
    };

    let post = state.feed_service.create_post(&auth.user_id, req).await?;
    Ok((StatusCode::CREATED, Json(PostDto::from(post))))
}
