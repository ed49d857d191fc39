/// YouTube Data API access
///
/// The pipeline only ever talks to the [`YouTubeApi`] trait. [`client::YouTubeClient`]
/// is the HTTP implementation; [`crate::cache::ResultCache`] sits in front of it.

pub mod client;
pub mod payload;

pub use client::YouTubeClient;

use crate::error::ApiError;
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Result of one upstream call
pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// Parameters of one search call. Built once per (keyword, region) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchRequest {
    pub keyword: String,
    pub region_code: String,
    pub published_after: DateTime<Utc>,
    pub page_size: u32,
    pub language_hint: String,
}

impl SearchRequest {
    /// RFC 3339 lower bound as sent upstream, whole seconds
    pub fn published_after_param(&self) -> String {
        self.published_after
            .to_rfc3339_opts(SecondsFormat::Secs, true)
    }
}

/// One row of a search page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawSearchHit {
    pub video_id: String,
    pub channel_id: String,
    pub title: String,
    pub channel_title: String,
}

/// Snippet, statistics and content details of one video
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoDetail {
    pub video_id: String,
    pub title: String,
    pub description: String,
    /// Raw RFC 3339 timestamp; empty when the payload omitted it
    pub published_at: String,
    pub channel_title: String,
    pub tags: Vec<String>,
    /// Raw ISO-8601 duration token
    pub duration: String,
    pub view_count: u64,
    pub like_count: u64,
    pub comment_count: u64,
    pub thumbnail_url: String,
}

/// Statistics of one channel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelDetail {
    pub channel_id: String,
    pub subscriber_count: u64,
    pub country: Option<String>,
}

/// The three read-only upstream operations
#[async_trait]
pub trait YouTubeApi: Send + Sync {
    async fn search(&self, request: &SearchRequest, api_key: &str) -> ApiResult<Vec<RawSearchHit>>;

    /// Batched video lookup; ids the endpoint does not know are simply absent
    async fn videos(&self, video_ids: &[String], api_key: &str) -> ApiResult<Vec<VideoDetail>>;

    /// Batched channel lookup; ids the endpoint does not know are simply absent
    async fn channels(&self, channel_ids: &[String], api_key: &str)
        -> ApiResult<Vec<ChannelDetail>>;
}
