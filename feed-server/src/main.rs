use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tracing::{info, warn};

mod application;
mod data;
mod domain;
mod infrastructure;
mod presentation;
mod server;
#[cfg(test)]
mod test_support;

use application::feed_service::FeedService;
use data::post_repository::PostRepository;
use data::rate_limiter::{CREATE_POST_QUOTA, CREATE_POST_WINDOW, RateLimiter};
use data::repositories::postgres::post_repository::PostgresPostRepository;
use data::user_directory::UserDirectory;
use infrastructure::database::{create_pool, run_migrations};
use infrastructure::identity::HttpUserDirectory;
use infrastructure::jwt::JwtService;
use infrastructure::logging::init_logging;
use infrastructure::memory_rate_limiter::InMemoryRateLimiter;
use infrastructure::redis_rate_limiter::RedisRateLimiter;
use infrastructure::settings::Settings;
use presentation::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let settings = Settings::from_env()?;

    init_logging(&settings.log_level)?;
    info!(version = env!("CARGO_PKG_VERSION"), "starting feed-server");

    let pool = create_pool(&settings.database_url).await?;
    run_migrations(&pool).await?;

    let posts: Arc<dyn PostRepository> = Arc::new(PostgresPostRepository::new(pool));
    let users: Arc<dyn UserDirectory> = Arc::new(HttpUserDirectory::new(
        settings.identity_api_url.clone(),
        settings.identity_secret_key.clone(),
        Duration::from_secs(settings.identity_request_timeout_secs),
    )?);
    let limiter = build_rate_limiter(&settings).await?;

    let feed_service = Arc::new(FeedService::new(posts, users, limiter));
    let jwt = Arc::new(JwtService::new(&settings.auth_jwt_secret));
    let state = AppState::new(feed_service, jwt);

    server::run_http(&settings, state).await
}

async fn build_rate_limiter(settings: &Settings) -> Result<Arc<dyn RateLimiter>> {
    match &settings.redis_url {
        Some(redis_url) => {
            let limiter =
                RedisRateLimiter::connect(redis_url, CREATE_POST_QUOTA, CREATE_POST_WINDOW).await?;
            Ok(Arc::new(limiter))
        }
        None => {
            warn!("REDIS_URL is not set, rate limits are tracked per process");
            Ok(Arc::new(InMemoryRateLimiter::new(
                CREATE_POST_QUOTA,
                CREATE_POST_WINDOW,
            )))
        }
    }
}
