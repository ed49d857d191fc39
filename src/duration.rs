/// Compact ISO-8601 duration handling for short-form videos
///
/// Only the `PT[nM][nS]` subset is understood. Anything else degrades to zero
/// rather than failing, since upstream payloads are not guaranteed complete.
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

/// Parsed minutes/seconds pair of a video duration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShortDuration {
    pub minutes: u64,
    pub seconds: u64,
}

fn minutes_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^(\d+)M").expect("valid minutes pattern"))
}

fn seconds_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^(\d+)S").expect("valid seconds pattern"))
}

impl ShortDuration {
    /// Parse a `PT[nM][nS]` token. Malformed or empty input yields `00:00`.
    pub fn parse(raw: &str) -> Self {
        let Some(body) = raw.strip_prefix("PT") else {
            return Self::default();
        };

        let mut minutes = 0;
        let mut rest = body;
        if let Some(caps) = minutes_pattern().captures(rest) {
            minutes = caps[1].parse().unwrap_or(0);
            rest = &rest[caps[0].len()..];
        }

        let seconds = seconds_pattern()
            .captures(rest)
            .and_then(|caps| caps[1].parse().ok())
            .unwrap_or(0);

        let duration = Self { minutes, seconds };
        if duration.checked_total_seconds().is_none() {
            return Self::default();
        }
        duration
    }

    fn checked_total_seconds(&self) -> Option<u64> {
        self.minutes.checked_mul(60)?.checked_add(self.seconds)
    }

    /// Zero when the value does not fit in `u64`
    pub fn total_seconds(&self) -> u64 {
        self.checked_total_seconds().unwrap_or(0)
    }

    /// Zero-padded `MM:SS`
    pub fn display(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ShortDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.minutes, self.seconds)
    }
}

/// Total seconds of a raw duration token
pub fn parse_seconds(raw: &str) -> u64 {
    ShortDuration::parse(raw).total_seconds()
}

/// `MM:SS` display string of a raw duration token
pub fn parse_display(raw: &str) -> String {
    ShortDuration::parse(raw).display()
}
