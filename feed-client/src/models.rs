use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
/// A post as stored by the server.
pub struct Post {
    /// Post id.
    pub id: i64,
    /// Identity provider id of the author.
    pub author_id: String,
    /// Post text, 1..=280 characters.
    pub content: String,
    /// Creation time (UTC).
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Public author data attached to feed entries.
pub struct Author {
    /// Identity provider id.
    pub id: String,
    /// First name, if set.
    pub first_name: Option<String>,
    /// Last name, if set.
    pub last_name: Option<String>,
    /// Username, always present on feed entries.
    pub username: String,
    /// Avatar URL.
    pub profile_image_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// One feed entry: a post together with its author.
pub struct FeedEntry {
    /// The post.
    pub post: Post,
    /// Its author.
    pub author: Author,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Profile returned by the username lookup.
pub struct Profile {
    /// Identity provider id.
    pub id: String,
    /// First name, if set.
    pub first_name: Option<String>,
    /// Last name, if set.
    pub last_name: Option<String>,
    /// Username.
    pub username: Option<String>,
    /// Avatar URL.
    pub profile_image_url: Option<String>,
}
