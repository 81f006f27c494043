pub(crate) mod author;
pub(crate) mod error;
pub(crate) mod post;
