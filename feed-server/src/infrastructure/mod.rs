pub(crate) mod database;
pub(crate) mod identity;
pub(crate) mod jwt;
pub(crate) mod logging;
pub(crate) mod memory_rate_limiter;
pub(crate) mod redis_rate_limiter;
pub(crate) mod settings;
