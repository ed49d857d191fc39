/// Derived performance signals computed from raw video and channel counters
use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum contribution of each half of the virality score
pub const VIRALITY_COMPONENT_CAP: f64 = 50.0;

/// Score at or above which a record counts as viral in summaries
pub const VIRAL_THRESHOLD: f64 = 60.0;

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// `(likes + comments) / views * 100`, two decimals. Zero views gives zero.
pub fn engagement_rate(views: u64, likes: u64, comments: u64) -> f64 {
    if views == 0 {
        return 0.0;
    }
    let engagement = likes.saturating_add(comments) as f64 / views as f64 * 100.0;
    round_to(engagement, 2)
}

/// Views relative to channel size, capped at 50
pub fn subscriber_ratio_component(views: u64, subscribers: u64) -> f64 {
    let views_per_sub = views as f64 / subscribers.max(1) as f64;
    (views_per_sub * 10.0).min(VIRALITY_COMPONENT_CAP)
}

/// Daily view velocity, capped at 50 (1000 views/day is worth 50 points)
pub fn velocity_component(views: u64, age_days: u64) -> f64 {
    let views_per_day = views as f64 / age_days.max(1) as f64;
    (views_per_day / 1000.0 * 50.0).min(VIRALITY_COMPONENT_CAP)
}

/// Combined virality score, one decimal.
///
/// A channel without subscribers or a video without age cannot be judged by
/// velocity, so either being zero yields zero.
pub fn virality_score(views: u64, subscribers: u64, age_days: u64) -> f64 {
    if subscribers == 0 || age_days == 0 {
        return 0.0;
    }
    let score =
        subscriber_ratio_component(views, subscribers) + velocity_component(views, age_days);
    round_to(score, 1)
}

/// Views per day, treating same-day videos as one day old
pub fn views_per_day(views: u64, age_days: u64) -> f64 {
    views as f64 / age_days.max(1) as f64
}

/// Whole days between `published_at` and `now`, evaluated in the timestamp's
/// own offset. Unparsable timestamps and future dates give zero.
pub fn age_days_at(published_at: &str, now: DateTime<Utc>) -> u64 {
    match DateTime::parse_from_rfc3339(published_at) {
        Ok(published) => age_between(published, now),
        Err(_) => 0,
    }
}

/// [`age_days_at`] against the system clock
pub fn age_days(published_at: &str) -> u64 {
    age_days_at(published_at, Utc::now())
}

fn age_between(published: DateTime<FixedOffset>, now: DateTime<Utc>) -> u64 {
    let now_local = now.with_timezone(published.offset());
    let days = (now_local - published).num_days();
    days.max(0) as u64
}

/// Discrete virality label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViralityTier {
    Normal,
    Good,
    Growing,
    VeryHot,
    Viral,
}

impl ViralityTier {
    /// Lower bounds are inclusive: 80 viral, 60 very hot, 40 growing, 20 good
    pub fn from_score(score: f64) -> Self {
        if score >= 80.0 {
            ViralityTier::Viral
        } else if score >= 60.0 {
            ViralityTier::VeryHot
        } else if score >= 40.0 {
            ViralityTier::Growing
        } else if score >= 20.0 {
            ViralityTier::Good
        } else {
            ViralityTier::Normal
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ViralityTier::Viral => "viral",
            ViralityTier::VeryHot => "very hot",
            ViralityTier::Growing => "growing",
            ViralityTier::Good => "good",
            ViralityTier::Normal => "normal",
        }
    }

    /// All tiers, highest first
    pub fn all() -> [ViralityTier; 5] {
        [
            ViralityTier::Viral,
            ViralityTier::VeryHot,
            ViralityTier::Growing,
            ViralityTier::Good,
            ViralityTier::Normal,
        ]
    }
}

impl fmt::Display for ViralityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Compact display form: `1.2M`, `3.4K`, plain below a thousand
pub fn format_compact(n: u64) -> String {
    if n >= 1_000_000 {
        format!("{:.1}M", n as f64 / 1_000_000.0)
    } else if n >= 1_000 {
        format!("{:.1}K", n as f64 / 1_000.0)
    } else {
        n.to_string()
    }
}
