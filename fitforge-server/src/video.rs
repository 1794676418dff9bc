use async_trait::async_trait;
use serde::Deserialize;

use crate::config::Video;
use crate::upstream::{check_status, http_client, UpstreamError};

/// Finds a demonstration video for an exercise
#[async_trait]
pub trait VideoLookup: Send + Sync {
    /// At most one URL; lookup failures resolve to `None`
    async fn find_demo(&self, exercise_name: &str) -> Option<String>;
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    id: SearchItemId,
}

#[derive(Debug, Deserialize)]
struct SearchItemId {
    #[serde(rename = "videoId")]
    video_id: Option<String>,
}

/// YouTube Data API search client
pub struct YouTubeClient {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl YouTubeClient {
    pub fn new(settings: &Video) -> Self {
        Self {
            client: http_client(),
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            api_key: settings.api_key.clone().filter(|k| !k.is_empty()),
        }
    }

    async fn search(&self, exercise_name: &str) -> Result<Option<String>, UpstreamError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(UpstreamError::NotConfigured("YouTube API key"))?;
        let query = format!("{} exercise form", exercise_name);

        let response = self
            .client
            .get(format!("{}/search", self.base_url))
            .query(&[
                ("part", "snippet"),
                ("type", "video"),
                ("maxResults", "1"),
                ("q", query.as_str()),
                ("key", api_key),
            ])
            .send()
            .await?;

        let results: SearchResponse = check_status(response).await?.json().await?;
        Ok(first_video_url(results))
    }
}

fn first_video_url(results: SearchResponse) -> Option<String> {
    results
        .items
        .into_iter()
        .find_map(|item| item.id.video_id)
        .map(|id| format!("https://www.youtube.com/watch?v={}", id))
}

#[async_trait]
impl VideoLookup for YouTubeClient {
    async fn find_demo(&self, exercise_name: &str) -> Option<String> {
        match self.search(exercise_name).await {
            Ok(url) => url,
            Err(e) => {
                tracing::warn!("Video lookup for '{}' failed: {}", exercise_name, e);
                None
            }
        }
    }
}
