use std::collections::BTreeMap;
use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder, Url};
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::error::{FeedClientError, FeedClientResult};
use crate::models::{FeedEntry, Post, Profile};

#[derive(Debug, Serialize)]
struct CreatePostRequestDto<'a> {
    content: &'a str,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorResponseDto {
    error: Option<String>,
    #[serde(default)]
    fields: BTreeMap<String, Vec<String>>,
}

#[derive(Debug, Clone)]
/// HTTP client for the `feed-server` REST API.
pub(crate) struct HttpClient {
    base_url: Url,
    client: Client,
}

impl HttpClient {
    pub(crate) fn new(base_url: impl Into<String>) -> FeedClientResult<Self> {
        let raw = base_url.into();
        let base_url =
            Url::parse(&raw).map_err(|err| FeedClientError::InvalidUrl(format!("{raw}: {err}")))?;
        if base_url.cannot_be_a_base() {
            return Err(FeedClientError::InvalidUrl(raw));
        }

        let client = Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(15))
            .build()?;

        Ok(Self { base_url, client })
    }

    /// Appends `segments` to the base path, percent-encoding each one.
    fn endpoint(&self, segments: &[&str]) -> FeedClientResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| FeedClientError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn decode_error(response: reqwest::Response) -> FeedClientError {
        let status = response.status();
        let body = response
            .json::<ErrorResponseDto>()
            .await
            .unwrap_or_default();

        FeedClientError::from_http_status(status, body.error, body.fields)
    }

    async fn execute<TRes>(&self, request: RequestBuilder) -> FeedClientResult<TRes>
    where
        TRes: DeserializeOwned,
    {
        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(Self::decode_error(response).await);
        }

        Ok(response.json::<TRes>().await?)
    }

    async fn get_json<TRes>(&self, segments: &[&str]) -> FeedClientResult<TRes>
    where
        TRes: DeserializeOwned,
    {
        let request = self.client.request(Method::GET, self.endpoint(segments)?);
        self.execute(request).await
    }

    pub(crate) async fn list_posts(&self) -> FeedClientResult<Vec<FeedEntry>> {
        self.get_json(&["api", "posts"]).await
    }

    pub(crate) async fn list_user_posts(&self, user_id: &str) -> FeedClientResult<Vec<FeedEntry>> {
        self.get_json(&["api", "users", user_id, "posts"]).await
    }

    pub(crate) async fn get_post(&self, id: i64) -> FeedClientResult<FeedEntry> {
        let id = id.to_string();
        self.get_json(&["api", "posts", &id]).await
    }

    pub(crate) async fn get_profile(&self, username: &str) -> FeedClientResult<Profile> {
        let username = username.trim_start_matches('@');
        self.get_json(&["api", "profiles", username]).await
    }

    pub(crate) async fn create_post(&self, token: &str, content: &str) -> FeedClientResult<Post> {
        let request = self
            .client
            .request(Method::POST, self.endpoint(&["api", "posts"])?)
            .bearer_auth(token)
            .json(&CreatePostRequestDto { content });
        self.execute(request).await
    }
}
