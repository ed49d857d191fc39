/// Wire shapes of the YouTube Data API v3 list responses
///
/// Every field is optional on the wire. Conversion into the typed records either
/// yields a populated record or an [`ApiError::DataShape`]; counters that are
/// absent or unparsable default to zero.
use super::{ChannelDetail, RawSearchHit, VideoDetail};
use crate::error::ApiError;
use serde::Deserialize;
use tracing::warn;

#[derive(Debug, Deserialize)]
pub struct ListResponse<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
}

#[derive(Debug, Deserialize)]
pub struct SearchItem {
    pub id: Option<SearchItemId>,
    pub snippet: Option<SearchSnippet>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchItemId {
    pub video_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchSnippet {
    pub channel_id: Option<String>,
    pub title: Option<String>,
    pub channel_title: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoItem {
    pub id: Option<String>,
    pub snippet: Option<VideoSnippet>,
    pub statistics: Option<VideoStatistics>,
    pub content_details: Option<ContentDetails>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoSnippet {
    pub title: Option<String>,
    pub description: Option<String>,
    pub published_at: Option<String>,
    pub channel_title: Option<String>,
    pub tags: Option<Vec<String>>,
    pub thumbnails: Option<Thumbnails>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Thumbnails {
    pub high: Option<Thumbnail>,
    pub default: Option<Thumbnail>,
}

#[derive(Debug, Deserialize)]
pub struct Thumbnail {
    pub url: Option<String>,
}

/// Counters arrive as decimal strings
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoStatistics {
    pub view_count: Option<String>,
    pub like_count: Option<String>,
    pub comment_count: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ContentDetails {
    pub duration: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ChannelItem {
    pub id: Option<String>,
    pub statistics: Option<ChannelStatistics>,
    pub snippet: Option<ChannelSnippet>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelStatistics {
    pub subscriber_count: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ChannelSnippet {
    pub country: Option<String>,
}

fn parse_count(raw: Option<&str>) -> u64 {
    raw.and_then(|s| s.trim().parse().ok()).unwrap_or(0)
}

impl TryFrom<SearchItem> for RawSearchHit {
    type Error = ApiError;

    fn try_from(item: SearchItem) -> Result<Self, Self::Error> {
        let video_id = item
            .id
            .and_then(|id| id.video_id)
            .ok_or_else(|| ApiError::DataShape("search item without videoId".to_string()))?;
        let snippet = item.snippet.ok_or_else(|| {
            ApiError::DataShape(format!("search item {} without snippet", video_id))
        })?;
        let channel_id = snippet.channel_id.ok_or_else(|| {
            ApiError::DataShape(format!("search item {} without channelId", video_id))
        })?;

        Ok(RawSearchHit {
            video_id,
            channel_id,
            title: snippet.title.unwrap_or_default(),
            channel_title: snippet.channel_title.unwrap_or_default(),
        })
    }
}

impl TryFrom<VideoItem> for VideoDetail {
    type Error = ApiError;

    fn try_from(item: VideoItem) -> Result<Self, Self::Error> {
        let video_id = item
            .id
            .ok_or_else(|| ApiError::DataShape("video item without id".to_string()))?;
        let snippet = item.snippet.unwrap_or_default();
        let stats = item.statistics.unwrap_or_default();
        let content = item.content_details.unwrap_or_default();

        let thumbnails = snippet.thumbnails.unwrap_or_default();
        let thumbnail_url = thumbnails
            .high
            .and_then(|t| t.url)
            .or_else(|| thumbnails.default.and_then(|t| t.url))
            .unwrap_or_default();

        Ok(VideoDetail {
            video_id,
            title: snippet.title.unwrap_or_default(),
            description: snippet.description.unwrap_or_default(),
            published_at: snippet.published_at.unwrap_or_default(),
            channel_title: snippet.channel_title.unwrap_or_default(),
            tags: snippet.tags.unwrap_or_default(),
            duration: content.duration.unwrap_or_default(),
            view_count: parse_count(stats.view_count.as_deref()),
            like_count: parse_count(stats.like_count.as_deref()),
            comment_count: parse_count(stats.comment_count.as_deref()),
            thumbnail_url,
        })
    }
}

impl TryFrom<ChannelItem> for ChannelDetail {
    type Error = ApiError;

    fn try_from(item: ChannelItem) -> Result<Self, Self::Error> {
        let channel_id = item
            .id
            .ok_or_else(|| ApiError::DataShape("channel item without id".to_string()))?;
        let stats = item.statistics.unwrap_or_default();

        Ok(ChannelDetail {
            channel_id,
            subscriber_count: parse_count(stats.subscriber_count.as_deref()),
            country: item.snippet.and_then(|s| s.country),
        })
    }
}

/// Convert every item, dropping (and logging) those with an unusable shape
pub fn convert_items<I, T>(items: Vec<I>) -> Vec<T>
where
    T: TryFrom<I, Error = ApiError>,
{
    items
        .into_iter()
        .filter_map(|item| match T::try_from(item) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!("Skipping payload item: {}", e);
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_page_skips_items_without_video_id() {
        let json = r#"{
            "items": [
                {"id": {"kind": "youtube#video", "videoId": "v1"},
                 "snippet": {"channelId": "c1", "title": "Hola", "channelTitle": "Canal"}},
                {"id": {"kind": "youtube#channel", "channelId": "c9"},
                 "snippet": {"channelId": "c9"}}
            ]
        }"#;
        let page: ListResponse<SearchItem> = serde_json::from_str(json).unwrap();
        let hits: Vec<RawSearchHit> = convert_items(page.items);

        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].video_id, "v1");
        assert_eq!(hits[0].channel_id, "c1");
        assert_eq!(hits[0].channel_title, "Canal");
    }

    #[test]
    fn test_missing_items_is_an_empty_page() {
        let page: ListResponse<SearchItem> = serde_json::from_str("{}").unwrap();
        assert!(page.items.is_empty());
    }

    #[test]
    fn test_video_detail_defaults() {
        let json = r#"{
            "items": [{
                "id": "v1",
                "snippet": {
                    "title": "Disciplina",
                    "publishedAt": "2024-03-08T12:00:00Z",
                    "thumbnails": {"default": {"url": "http://img/default.jpg"}}
                },
                "statistics": {"viewCount": "1200", "likeCount": "not-a-number"},
                "contentDetails": {"duration": "PT0M45S"}
            }]
        }"#;
        let page: ListResponse<VideoItem> = serde_json::from_str(json).unwrap();
        let videos: Vec<VideoDetail> = convert_items(page.items);

        let v = &videos[0];
        assert_eq!(v.view_count, 1200);
        assert_eq!(v.like_count, 0);
        assert_eq!(v.comment_count, 0);
        assert!(v.tags.is_empty());
        assert_eq!(v.description, "");
        assert_eq!(v.duration, "PT0M45S");
        assert_eq!(v.thumbnail_url, "http://img/default.jpg");
    }

    #[test]
    fn test_video_prefers_high_thumbnail() {
        let json = r#"{"id": "v1", "snippet": {"thumbnails": {
            "default": {"url": "d"}, "high": {"url": "h"}}}}"#;
        let item: VideoItem = serde_json::from_str(json).unwrap();
        let video = VideoDetail::try_from(item).unwrap();
        assert_eq!(video.thumbnail_url, "h");
    }

    #[test]
    fn test_channel_detail() {
        let json = r#"{"items": [
            {"id": "c1", "statistics": {"subscriberCount": "10000"}, "snippet": {"country": "ES"}},
            {"id": "c2"},
            {"statistics": {"subscriberCount": "5"}}
        ]}"#;
        let page: ListResponse<ChannelItem> = serde_json::from_str(json).unwrap();
        let channels: Vec<ChannelDetail> = convert_items(page.items);

        assert_eq!(channels.len(), 2);
        assert_eq!(channels[0].subscriber_count, 10_000);
        assert_eq!(channels[0].country.as_deref(), Some("ES"));
        assert_eq!(channels[1].subscriber_count, 0);
        assert_eq!(channels[1].country, None);
    }
}
