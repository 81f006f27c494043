use axum::Router;
use axum::routing::get;

use crate::presentation::AppState;
use crate::presentation::http::handlers::health::health_handler;

pub(crate) mod posts;
pub(crate) mod profiles;
pub(crate) mod users;

pub(crate) fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(health_handler))
        .nest("/api/posts", posts::router(state.clone()))
        .nest("/api/users", users::router())
        .nest("/api/profiles", profiles::router())
        .with_state(state)
}
