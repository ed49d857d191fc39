/// Output records of a run and the derived signals they carry
use crate::duration::ShortDuration;
use crate::metrics::{self, ViralityTier};
use crate::youtube::{ChannelDetail, RawSearchHit, VideoDetail};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const DESCRIPTION_LIMIT: usize = 300;
const TAG_LIMIT: usize = 10;
const ANGLE_TITLE_LIMIT: usize = 50;

/// Signals derived from one video/channel pair
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreCard {
    pub duration: ShortDuration,
    pub age_days: u64,
    pub engagement_rate: f64,
    pub virality_score: f64,
    pub views_per_day: f64,
}

impl ScoreCard {
    /// Same-day videos are scored as one day old
    pub fn compute(video: &VideoDetail, channel: &ChannelDetail, now: DateTime<Utc>) -> Self {
        let age_days = metrics::age_days_at(&video.published_at, now);
        let scored_age = age_days.max(1);
        Self {
            duration: ShortDuration::parse(&video.duration),
            age_days,
            engagement_rate: metrics::engagement_rate(
                video.view_count,
                video.like_count,
                video.comment_count,
            ),
            virality_score: metrics::virality_score(
                video.view_count,
                channel.subscriber_count,
                scored_age,
            ),
            views_per_day: metrics::views_per_day(video.view_count, scored_age),
        }
    }
}

/// Search context a record was discovered under
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchContext<'a> {
    pub keyword: &'a str,
    pub region_code: &'a str,
    pub region_name: &'a str,
    pub category: &'a str,
}

/// One discovered short, joined with its channel and scored
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredRecord {
    // Identifiers
    pub video_id: String,
    pub title: String,
    pub video_url: String,

    // Performance
    pub views: u64,
    pub likes: u64,
    pub comments: u64,
    pub engagement_rate: f64,
    pub virality_score: f64,
    pub virality_tier: ViralityTier,
    pub views_per_day: f64,

    // Video
    pub duration: String,
    pub duration_seconds: u64,
    pub published_at: String,
    pub published_date: String,
    pub age_days: u64,
    pub description: String,
    pub tags: Vec<String>,
    pub thumbnail_url: String,

    // Channel
    pub channel_id: String,
    pub channel_title: String,
    pub channel_url: String,
    pub subscribers: u64,
    pub channel_country: Option<String>,

    // Search context
    pub category: String,
    pub keyword: String,
    pub region_code: String,
    pub region_name: String,

    pub idea_angle: String,
}

impl ScoredRecord {
    pub fn assemble(
        hit: &RawSearchHit,
        video: &VideoDetail,
        channel: &ChannelDetail,
        card: &ScoreCard,
        context: &SearchContext<'_>,
    ) -> Self {
        let channel_title = if video.channel_title.is_empty() {
            hit.channel_title.clone()
        } else {
            video.channel_title.clone()
        };

        Self {
            video_id: video.video_id.clone(),
            title: video.title.clone(),
            video_url: format!("https://youtube.com/shorts/{}", video.video_id),

            views: video.view_count,
            likes: video.like_count,
            comments: video.comment_count,
            engagement_rate: card.engagement_rate,
            virality_score: card.virality_score,
            virality_tier: ViralityTier::from_score(card.virality_score),
            views_per_day: card.views_per_day.round(),

            duration: card.duration.display(),
            duration_seconds: card.duration.total_seconds(),
            published_at: video.published_at.clone(),
            published_date: video.published_at.chars().take(10).collect(),
            age_days: card.age_days,
            description: truncate_chars(&video.description, DESCRIPTION_LIMIT),
            tags: video.tags.iter().take(TAG_LIMIT).cloned().collect(),
            thumbnail_url: video.thumbnail_url.clone(),

            channel_id: channel.channel_id.clone(),
            channel_title,
            channel_url: format!("https://youtube.com/channel/{}", channel.channel_id),
            subscribers: channel.subscriber_count,
            channel_country: channel.country.clone(),

            category: context.category.to_string(),
            keyword: context.keyword.to_string(),
            region_code: context.region_code.to_string(),
            region_name: context.region_name.to_string(),

            idea_angle: idea_angle(&video.title, context.category, video.view_count, card.engagement_rate),
        }
    }
}

fn truncate_chars(text: &str, limit: usize) -> String {
    text.chars().take(limit).collect()
}

/// Threshold-based content suggestion for recreating a format
pub fn idea_angle(title: &str, category: &str, views: u64, engagement_rate: f64) -> String {
    let mut hooks = Vec::new();

    if views > 1_000_000 {
        hooks.push("formato VIRAL");
    } else if views > 100_000 {
        hooks.push("formato de alto rendimiento");
    }

    if engagement_rate > 5.0 {
        hooks.push("gancho de alto engagement");
    }

    let hook_text = if hooks.is_empty() {
        "formato trending".to_string()
    } else {
        hooks.join(", ")
    };

    format!(
        "Recrea este {} para '{}'. Estudia: '{}...' - Adapta la estructura del gancho, \
         cambia los ejemplos, mantén un ritmo similar. \
         Usa voz en español neutro o específico para tu audiencia.",
        hook_text,
        category,
        truncate_chars(title, ANGLE_TITLE_LIMIT)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn video() -> VideoDetail {
        VideoDetail {
            video_id: "abc123".to_string(),
            title: "El secreto de la disciplina".to_string(),
            description: "d".repeat(400),
            published_at: "2024-03-08T12:00:00Z".to_string(),
            channel_title: String::new(),
            tags: (0..15).map(|i| format!("tag{}", i)).collect(),
            duration: "PT0M45S".to_string(),
            view_count: 500_000,
            like_count: 25_000,
            comment_count: 5_000,
            thumbnail_url: "http://img/high.jpg".to_string(),
        }
    }

    fn channel() -> ChannelDetail {
        ChannelDetail {
            channel_id: "chan1".to_string(),
            subscriber_count: 10_000,
            country: Some("ES".to_string()),
        }
    }

    #[test]
    fn test_score_card() {
        let now = Utc.with_ymd_and_hms(2024, 3, 10, 12, 0, 0).unwrap();
        let card = ScoreCard::compute(&video(), &channel(), now);

        assert_eq!(card.age_days, 2);
        assert_eq!(card.duration.total_seconds(), 45);
        assert_eq!(card.engagement_rate, 6.0);
        assert_eq!(card.virality_score, 100.0);
        assert_eq!(card.views_per_day, 250_000.0);
    }

    #[test]
    fn test_same_day_video_scored_as_one_day() {
        let now = Utc.with_ymd_and_hms(2024, 3, 8, 18, 0, 0).unwrap();
        let mut v = video();
        v.view_count = 100;
        let card = ScoreCard::compute(&v, &channel(), now);

        assert_eq!(card.age_days, 0);
        // 100/10000*10 + 100/1000*50
        assert_eq!(card.virality_score, 5.1);
        assert_eq!(card.views_per_day, 100.0);
    }

    #[test]
    fn test_assemble_record() {
        let now = Utc.with_ymd_and_hms(2024, 3, 10, 12, 0, 0).unwrap();
        let hit = RawSearchHit {
            video_id: "abc123".to_string(),
            channel_id: "chan1".to_string(),
            title: "El secreto de la disciplina".to_string(),
            channel_title: "Mente Fuerte".to_string(),
        };
        let card = ScoreCard::compute(&video(), &channel(), now);
        let context = SearchContext {
            keyword: "disciplina personal",
            region_code: "ES",
            region_name: "España",
            category: "Disciplina y Hábitos",
        };
        let record = ScoredRecord::assemble(&hit, &video(), &channel(), &card, &context);

        assert_eq!(record.video_url, "https://youtube.com/shorts/abc123");
        assert_eq!(record.channel_url, "https://youtube.com/channel/chan1");
        assert_eq!(record.channel_title, "Mente Fuerte");
        assert_eq!(record.virality_tier, ViralityTier::Viral);
        assert_eq!(record.duration, "00:45");
        assert_eq!(record.published_date, "2024-03-08");
        assert_eq!(record.description.chars().count(), 300);
        assert_eq!(record.tags.len(), 10);
        assert_eq!(record.region_name, "España");
    }

    #[test]
    fn test_idea_angle_hooks() {
        let viral = idea_angle("Título", "Metas", 2_000_000, 6.5);
        assert!(viral.contains("formato VIRAL, gancho de alto engagement"));

        let strong = idea_angle("Título", "Metas", 200_000, 1.0);
        assert!(strong.contains("formato de alto rendimiento para 'Metas'"));

        let plain = idea_angle("Título", "Metas", 10_000, 1.0);
        assert!(plain.starts_with("Recrea este formato trending"));
    }

    #[test]
    fn test_idea_angle_truncates_title_on_char_boundary() {
        let title = "á".repeat(80);
        let angle = idea_angle(&title, "Metas", 0, 0.0);
        assert!(angle.contains(&format!("'{}...'", "á".repeat(50))));
    }
}
