use axum::{Router, routing::get};

use crate::presentation::AppState;
use crate::presentation::http::handlers::profiles::get_profile;

pub(crate) fn router() -> Router<AppState> {
    Router::new().route("/{username}", get(get_profile))
}
