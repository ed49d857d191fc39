/// Shorts Finder - Rust Implementation
///
/// Discovers fast-growing Spanish-language motivation Shorts from small channels:
/// search fan-out over regions and keywords, enrichment, scoring, filtering and ranking.

pub mod error;
pub mod duration;
pub mod metrics;
pub mod language;
pub mod catalog;
pub mod youtube;
pub mod clock;
pub mod cache;
pub mod filters;
pub mod record;
pub mod orchestrator;
pub mod ranking;
pub mod config;

// Re-export main types for easy access
pub use crate::cache::{CacheStats, ResultCache};
pub use crate::catalog::{find_region, NicheCategory, Region, REGIONS};
pub use crate::clock::{Clock, ManualClock, SystemClock};
pub use crate::config::{Config, ConfigBuilder};
pub use crate::error::{ApiError, FinderError};
pub use crate::filters::{FilterThresholds, Rejection};
pub use crate::language::SpanishLexicon;
pub use crate::metrics::ViralityTier;
pub use crate::orchestrator::{RunOutcome, RunStats, RunWarning, SearchOrchestrator, SearchPlan, SearchProgress};
pub use crate::ranking::{rank, summarize, RunReport, RunSummary};
pub use crate::record::ScoredRecord;
pub use crate::youtube::{YouTubeApi, YouTubeClient};
