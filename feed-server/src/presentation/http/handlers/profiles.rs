use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::author::Author;
use crate::presentation::AppState;
use crate::presentation::http::app_error::AppResult;

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct ProfileDto {
    pub(crate) id: String,
    pub(crate) first_name: Option<String>,
    pub(crate) last_name: Option<String>,
    pub(crate) username: Option<String>,
    pub(crate) profile_image_url: Option<String>,
}

impl From<Author> for ProfileDto {
    fn from(author: Author) -> Self {
        Self {
            id: author.id,
            first_name: author.first_name,
            last_name: author.last_name,
            username: author.username,
            profile_image_url: author.profile_image_url,
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/profiles/{username}",
    tag = "profiles",
    params(
        ("username" = String, Path, description = "Username, a leading '@' is ignored")
    ),
    responses(
        (status = 200, description = "Profile found", body = ProfileDto),
        (status = 400, description = "Blank username"),
        (status = 404, description = "No such user"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn get_profile(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> AppResult<(StatusCode, Json<ProfileDto>)> {
    let author = state.feed_service.profile_by_username(&username).await?;
    Ok((StatusCode::OK, Json(ProfileDto::from(author))))
}
