/// Per-record acceptance predicates
use crate::language::SpanishLexicon;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Caller-supplied thresholds. All predicates are AND-combined.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterThresholds {
    /// Drop content the lexicon does not consider Spanish
    pub spanish_only: bool,

    /// Inclusive duration window in seconds
    pub min_duration_seconds: u64,
    pub max_duration_seconds: u64,

    pub min_views: u64,

    /// Channel size ceiling (0 = no ceiling)
    pub max_subscribers: u64,

    /// Minimum engagement percentage
    pub min_engagement: f64,

    pub min_virality: f64,
}

impl Default for FilterThresholds {
    fn default() -> Self {
        Self {
            spanish_only: true,
            min_duration_seconds: 0,
            max_duration_seconds: 60,
            min_views: 5_000,
            max_subscribers: 50_000,
            min_engagement: 0.0,
            min_virality: 0.0,
        }
    }
}

/// Reason a candidate was dropped, in evaluation order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rejection {
    NotSpanish,
    DurationOutOfRange,
    TooFewViews,
    TooManySubscribers,
    LowEngagement,
    LowVirality,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Rejection::NotSpanish => "not Spanish",
            Rejection::DurationOutOfRange => "duration out of range",
            Rejection::TooFewViews => "too few views",
            Rejection::TooManySubscribers => "channel too large",
            Rejection::LowEngagement => "low engagement",
            Rejection::LowVirality => "low virality",
        };
        f.write_str(text)
    }
}

/// Values a candidate is judged on
#[derive(Debug, Clone, Copy)]
pub struct Candidate<'a> {
    pub title: &'a str,
    pub description: &'a str,
    pub duration_seconds: u64,
    pub views: u64,
    pub subscribers: u64,
    pub engagement_rate: f64,
    pub virality_score: f64,
}

impl FilterThresholds {
    /// Apply the predicates in order; the first failure wins
    pub fn evaluate(&self, candidate: &Candidate<'_>, lexicon: &SpanishLexicon) -> Result<(), Rejection> {
        if self.spanish_only && !lexicon.is_likely_spanish(candidate.title, candidate.description) {
            return Err(Rejection::NotSpanish);
        }
        if candidate.duration_seconds < self.min_duration_seconds
            || candidate.duration_seconds > self.max_duration_seconds
        {
            return Err(Rejection::DurationOutOfRange);
        }
        if candidate.views < self.min_views {
            return Err(Rejection::TooFewViews);
        }
        if self.max_subscribers > 0 && candidate.subscribers > self.max_subscribers {
            return Err(Rejection::TooManySubscribers);
        }
        if candidate.engagement_rate < self.min_engagement {
            return Err(Rejection::LowEngagement);
        }
        if candidate.virality_score < self.min_virality {
            return Err(Rejection::LowVirality);
        }
        Ok(())
    }

    /// Check the thresholds are coherent
    pub fn validate(&self) -> Result<(), String> {
        if self.min_duration_seconds > self.max_duration_seconds {
            return Err(format!(
                "duration window is inverted ({} > {})",
                self.min_duration_seconds, self.max_duration_seconds
            ));
        }
        if self.min_engagement.is_nan() || self.min_engagement < 0.0 {
            return Err("min_engagement must be a non-negative number".to_string());
        }
        if self.min_virality.is_nan() || self.min_virality < 0.0 {
            return Err("min_virality must be a non-negative number".to_string());
        }
        Ok(())
    }
}
