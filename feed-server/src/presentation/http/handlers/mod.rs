pub(crate) mod health;
pub(crate) mod posts;
pub(crate) mod profiles;
