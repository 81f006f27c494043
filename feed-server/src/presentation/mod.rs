use std::sync::Arc;

use crate::application::feed_service::FeedService;
use crate::infrastructure::jwt::JwtService;

pub(crate) mod http;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) feed_service: Arc<FeedService>,
    pub(crate) jwt: Arc<JwtService>,
}

impl AppState {
    pub(crate) fn new(feed_service: Arc<FeedService>, jwt: Arc<JwtService>) -> Self {
        Self { feed_service, jwt }
    }
}
