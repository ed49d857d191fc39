use super::payload::{convert_items, ChannelItem, ListResponse, SearchItem, VideoItem};
use super::{ApiResult, ChannelDetail, RawSearchHit, SearchRequest, VideoDetail, YouTubeApi};
use crate::error::{ApiError, FinderError};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;
use url::Url;

pub const DEFAULT_BASE_URL: &str = "https://www.googleapis.com/youtube/v3/";

/// HTTP implementation of [`YouTubeApi`]
#[derive(Clone)]
pub struct YouTubeClient {
    client: Client,
    base_url: Url,
}

impl YouTubeClient {
    /// Create a client whose every request is bounded by `timeout_seconds`
    pub fn new(base_url: &str, timeout_seconds: u64) -> Result<Self, FinderError> {
        // Url::join drops the last segment unless the base ends with a slash
        let normalized = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{}/", base_url)
        };
        let base_url = Url::parse(&normalized).map_err(|e| {
            FinderError::Configuration(format!("invalid API base URL {}: {}", base_url, e))
        })?;

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()
            .map_err(|e| FinderError::Configuration(format!("HTTP client: {}", e)))?;

        Ok(Self { client, base_url })
    }

    async fn get_list<T: DeserializeOwned>(
        &self,
        resource: &str,
        query: &[(&str, String)],
    ) -> ApiResult<ListResponse<T>> {
        let url = self
            .base_url
            .join(resource)
            .map_err(|e| ApiError::Transport(format!("bad endpoint {}: {}", resource, e)))?;

        debug!("GET {}", url);

        let response = self.client.get(url).query(query).send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Status { status, body });
        }

        Ok(response.json::<ListResponse<T>>().await?)
    }
}

#[async_trait]
impl YouTubeApi for YouTubeClient {
    async fn search(&self, request: &SearchRequest, api_key: &str) -> ApiResult<Vec<RawSearchHit>> {
        let query = [
            ("part", "snippet".to_string()),
            ("q", request.keyword.clone()),
            ("type", "video".to_string()),
            ("order", "viewCount".to_string()),
            ("publishedAfter", request.published_after_param()),
            ("maxResults", request.page_size.to_string()),
            ("videoDuration", "short".to_string()),
            ("regionCode", request.region_code.clone()),
            ("relevanceLanguage", request.language_hint.clone()),
            ("key", api_key.to_string()),
        ];

        let page = self.get_list::<SearchItem>("search", &query).await?;
        Ok(convert_items(page.items))
    }

    async fn videos(&self, video_ids: &[String], api_key: &str) -> ApiResult<Vec<VideoDetail>> {
        let query = [
            ("part", "snippet,statistics,contentDetails".to_string()),
            ("id", video_ids.join(",")),
            ("key", api_key.to_string()),
        ];

        let page = self.get_list::<VideoItem>("videos", &query).await?;
        Ok(convert_items(page.items))
    }

    async fn channels(
        &self,
        channel_ids: &[String],
        api_key: &str,
    ) -> ApiResult<Vec<ChannelDetail>> {
        let query = [
            ("part", "statistics,snippet".to_string()),
            ("id", channel_ids.join(",")),
            ("key", api_key.to_string()),
        ];

        let page = self.get_list::<ChannelItem>("channels", &query).await?;
        Ok(convert_items(page.items))
    }
}
