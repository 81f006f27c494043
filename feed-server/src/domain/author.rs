use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::error::DomainError;
use super::post::Post;

/// Identity record reduced to the fields the feed exposes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct Author {
    pub(crate) id: String,
    pub(crate) first_name: Option<String>,
    pub(crate) last_name: Option<String>,
    pub(crate) username: Option<String>,
    pub(crate) profile_image_url: Option<String>,
}

/// Author attached to a post. Unlike [`Author`], the username is always present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct PostAuthor {
    pub(crate) id: String,
    pub(crate) first_name: Option<String>,
    pub(crate) last_name: Option<String>,
    pub(crate) username: String,
    pub(crate) profile_image_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct EnrichedPost {
    pub(crate) post: Post,
    pub(crate) author: PostAuthor,
}

impl TryFrom<Author> for PostAuthor {
    type Error = DomainError;

    fn try_from(author: Author) -> Result<Self, Self::Error> {
        let username = author
            .username
            .filter(|name| !name.is_empty())
            .ok_or_else(|| DomainError::AuthorNotFound(author.id.clone()))?;

        Ok(Self {
            id: author.id,
            first_name: author.first_name,
            last_name: author.last_name,
            username,
            profile_image_url: author.profile_image_url,
        })
    }
}

/// Distinct author ids in first-seen order, capped at `limit`.
pub(crate) fn distinct_author_ids(posts: &[Post], limit: usize) -> Vec<String> {
    let mut ids: Vec<String> = Vec::new();
    for post in posts {
        if ids.len() >= limit {
            break;
        }
        if !ids.iter().any(|id| id == &post.author_id) {
            ids.push(post.author_id.clone());
        }
    }
    ids
}

/// Joins every post with its author, keeping the order of `posts`.
///
/// Fails on the first post whose author is missing from `authors` or has no
/// username; nothing is returned for the rest of the batch in that case.
pub(crate) fn attach_authors(
    posts: Vec<Post>,
    authors: Vec<Author>,
) -> Result<Vec<EnrichedPost>, DomainError> {
    let by_id: HashMap<&str, &Author> = authors
        .iter()
        .map(|author| (author.id.as_str(), author))
        .collect();

    posts
        .into_iter()
        .map(|post| {
            let author = by_id
                .get(post.author_id.as_str())
                .map(|author| (*author).clone())
                .ok_or_else(|| DomainError::AuthorNotFound(post.author_id.clone()))?;
            let author = PostAuthor::try_from(author)?;
            Ok(EnrichedPost { post, author })
        })
        .collect()
}
