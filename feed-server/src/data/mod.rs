pub(crate) mod post_repository;
pub(crate) mod rate_limiter;
pub(crate) mod repositories;
pub(crate) mod user_directory;
