/// Region x keyword search fan-out, enrichment and filtering
///
/// Pairs are processed strictly one after another. A failed search only costs its
/// own pair; a failed detail lookup drops its whole page. Nothing but a
/// configuration problem makes [`SearchOrchestrator::run`] return an error.
use crate::catalog::{NicheCategory, Region};
use crate::clock::Clock;
use crate::error::{ApiError, FinderError, Result};
use crate::filters::{Candidate, FilterThresholds, Rejection};
use crate::language::SpanishLexicon;
use crate::record::{ScoreCard, ScoredRecord, SearchContext};
use crate::youtube::{ChannelDetail, RawSearchHit, SearchRequest, VideoDetail, YouTubeApi};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info, warn};

/// Relevance language sent with every search
pub const DEFAULT_LANGUAGE_HINT: &str = "es";

/// Upper bound the search endpoint accepts for `maxResults`
pub const MAX_PAGE_SIZE: u32 = 50;

/// Pause after each processed page
pub const DEFAULT_PACING: Duration = Duration::from_millis(100);

/// Immutable description of one run
#[derive(Debug, Clone)]
pub struct SearchPlan {
    pub api_key: String,
    pub category: NicheCategory,
    pub keywords: Vec<String>,
    pub regions: Vec<Region>,
    pub published_after: DateTime<Utc>,
    pub page_size: u32,
    pub language_hint: String,
    pub filters: FilterThresholds,
    pub pacing: Duration,
}

impl SearchPlan {
    /// Plan over the category's keywords plus `custom_keywords`
    pub fn new(
        api_key: impl Into<String>,
        category: NicheCategory,
        custom_keywords: &[String],
        regions: Vec<Region>,
        published_after: DateTime<Utc>,
        page_size: u32,
        filters: FilterThresholds,
    ) -> Self {
        Self {
            api_key: api_key.into(),
            category,
            keywords: merge_keywords(category.keywords(), custom_keywords),
            regions,
            published_after,
            page_size,
            language_hint: DEFAULT_LANGUAGE_HINT.to_string(),
            filters,
            pacing: DEFAULT_PACING,
        }
    }

    pub fn with_pacing(mut self, pacing: Duration) -> Self {
        self.pacing = pacing;
        self
    }

    pub fn with_language_hint(mut self, hint: impl Into<String>) -> Self {
        self.language_hint = hint.into();
        self
    }

    /// Number of (region, keyword) pairs, for progress reporting only
    pub fn total_pairs(&self) -> usize {
        self.regions.len() * self.keywords.len()
    }

    /// Everything that must hold before the first fetch
    pub fn validate(&self) -> Result<()> {
        if self.api_key.trim().is_empty() {
            return Err(FinderError::Configuration(
                "no YouTube API key supplied".to_string(),
            ));
        }
        if self.keywords.is_empty() {
            return Err(FinderError::Configuration("keyword list is empty".to_string()));
        }
        if self.regions.is_empty() {
            return Err(FinderError::Configuration("region list is empty".to_string()));
        }
        if self.page_size == 0 || self.page_size > MAX_PAGE_SIZE {
            return Err(FinderError::Configuration(format!(
                "page size must be between 1 and {}, got {}",
                MAX_PAGE_SIZE, self.page_size
            )));
        }
        self.filters.validate().map_err(FinderError::Configuration)
    }
}

/// Category keywords followed by custom ones; blanks and repeats are dropped
pub fn merge_keywords(base: &[&str], custom: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    base.iter()
        .map(|k| k.trim().to_string())
        .chain(custom.iter().map(|k| k.trim().to_string()))
        .filter(|k| !k.is_empty())
        .filter(|k| seen.insert(k.to_lowercase()))
        .collect()
}

/// Upstream operation a warning came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchStage {
    Search,
    Videos,
    Channels,
}

impl fmt::Display for FetchStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            FetchStage::Search => "search",
            FetchStage::Videos => "video details",
            FetchStage::Channels => "channel details",
        };
        f.write_str(text)
    }
}

/// Recorded, non-fatal failure of one (region, keyword) pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunWarning {
    pub region_code: String,
    pub keyword: String,
    pub stage: FetchStage,
    pub error: ApiError,
}

impl fmt::Display for RunWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Error in '{}' [{}] during {}: {}",
            self.keyword, self.region_code, self.stage, self.error
        )
    }
}

/// Counters collected over a run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunStats {
    pub pairs_total: usize,
    pub pairs_processed: usize,
    pub searches_failed: usize,
    pub pages_skipped: usize,
    pub hits_seen: usize,
    pub duplicates_skipped: usize,
    pub missing_details: usize,
    pub rejections: BTreeMap<Rejection, usize>,
}

impl RunStats {
    fn reject(&mut self, rejection: Rejection) {
        *self.rejections.entry(rejection).or_insert(0) += 1;
    }

    pub fn total_rejected(&self) -> usize {
        self.rejections.values().sum()
    }
}

/// What a run produced
#[derive(Debug, Clone)]
pub struct RunOutcome {
    /// Accepted records in discovery order
    pub records: Vec<ScoredRecord>,
    pub warnings: Vec<RunWarning>,
    pub stats: RunStats,
}

/// Progress notification, one per (region, keyword) pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchProgress {
    pub completed: usize,
    pub total: usize,
    pub region_code: String,
    pub keyword: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PageOutcome {
    SearchFailed,
    Empty,
    AllSeen,
    DetailsFailed,
    Processed,
}

/// Run-scoped mutable state, owned by a single `run` call
#[derive(Default)]
struct RunState {
    seen: HashSet<String>,
    records: Vec<ScoredRecord>,
    warnings: Vec<RunWarning>,
    stats: RunStats,
}

/// Drives one run over a plan
pub struct SearchOrchestrator<'a> {
    api: &'a dyn YouTubeApi,
    clock: Arc<dyn Clock>,
    lexicon: SpanishLexicon,
    progress: Option<UnboundedSender<SearchProgress>>,
}

impl<'a> SearchOrchestrator<'a> {
    /// `api` is normally the process-wide [`crate::cache::ResultCache`]
    pub fn new(api: &'a dyn YouTubeApi, clock: Arc<dyn Clock>) -> Self {
        Self {
            api,
            clock,
            lexicon: SpanishLexicon::new(),
            progress: None,
        }
    }

    pub fn with_lexicon(mut self, lexicon: SpanishLexicon) -> Self {
        self.lexicon = lexicon;
        self
    }

    pub fn with_progress(mut self, sender: UnboundedSender<SearchProgress>) -> Self {
        self.progress = Some(sender);
        self
    }

    /// Execute the plan. Only an invalid plan is an error; upstream failures end
    /// up in [`RunOutcome::warnings`].
    pub async fn run(&self, plan: &SearchPlan) -> Result<RunOutcome> {
        plan.validate()?;

        let total = plan.total_pairs();
        info!(
            "🚀 Searching {} keywords x {} regions ({} searches) for '{}'",
            plan.keywords.len(),
            plan.regions.len(),
            total,
            plan.category
        );

        let mut state = RunState::default();
        state.stats.pairs_total = total;
        let mut completed = 0;

        for region in &plan.regions {
            for keyword in &plan.keywords {
                completed += 1;
                self.report_progress(completed, total, region, keyword);

                let outcome = self.process_pair(plan, region, keyword, &mut state).await;
                state.stats.pairs_processed += 1;
                debug!("'{}' [{}] -> {:?}", keyword, region.code, outcome);

                if outcome == PageOutcome::Processed && !plan.pacing.is_zero() {
                    tokio::time::sleep(plan.pacing).await;
                }
            }
        }

        info!(
            "✅ Run finished: {} records, {} warnings, {} rejected",
            state.records.len(),
            state.warnings.len(),
            state.stats.total_rejected()
        );

        Ok(RunOutcome {
            records: state.records,
            warnings: state.warnings,
            stats: state.stats,
        })
    }

    fn report_progress(&self, completed: usize, total: usize, region: &Region, keyword: &str) {
        if let Some(sender) = &self.progress {
            // A dropped receiver only means nobody is watching
            let _ = sender.send(SearchProgress {
                completed,
                total,
                region_code: region.code.to_string(),
                keyword: keyword.to_string(),
            });
        }
    }

    fn record_warning(
        &self,
        state: &mut RunState,
        region: &Region,
        keyword: &str,
        stage: FetchStage,
        error: ApiError,
    ) {
        let warning = RunWarning {
            region_code: region.code.to_string(),
            keyword: keyword.to_string(),
            stage,
            error,
        };
        warn!("⚠️ {}", warning);
        state.warnings.push(warning);
    }

    async fn process_pair(
        &self,
        plan: &SearchPlan,
        region: &Region,
        keyword: &str,
        state: &mut RunState,
    ) -> PageOutcome {
        let request = SearchRequest {
            keyword: keyword.to_string(),
            region_code: region.code.to_string(),
            published_after: plan.published_after,
            page_size: plan.page_size,
            language_hint: plan.language_hint.clone(),
        };

        let hits = match self.api.search(&request, &plan.api_key).await {
            Ok(hits) => hits,
            Err(e) => {
                state.stats.searches_failed += 1;
                self.record_warning(state, region, keyword, FetchStage::Search, e);
                return PageOutcome::SearchFailed;
            }
        };

        if hits.is_empty() {
            return PageOutcome::Empty;
        }
        state.stats.hits_seen += hits.len();

        let new_video_ids = unique_in_order(
            hits.iter()
                .map(|h| h.video_id.as_str())
                .filter(|id| !state.seen.contains(*id)),
        );
        if new_video_ids.is_empty() {
            state.stats.duplicates_skipped += hits.len();
            return PageOutcome::AllSeen;
        }

        // Channel stats are looked up for the whole page, seen or not
        let channel_ids = unique_in_order(hits.iter().map(|h| h.channel_id.as_str()));

        let videos = match self.api.videos(&new_video_ids, &plan.api_key).await {
            Ok(videos) => videos,
            Err(e) => {
                state.stats.pages_skipped += 1;
                self.record_warning(state, region, keyword, FetchStage::Videos, e);
                return PageOutcome::DetailsFailed;
            }
        };
        let channels = match self.api.channels(&channel_ids, &plan.api_key).await {
            Ok(channels) => channels,
            Err(e) => {
                state.stats.pages_skipped += 1;
                self.record_warning(state, region, keyword, FetchStage::Channels, e);
                return PageOutcome::DetailsFailed;
            }
        };

        let context = SearchContext {
            keyword,
            region_code: region.code,
            region_name: region.name,
            category: plan.category.label(),
        };
        self.filter_and_build(plan, &hits, &videos, &channels, &context, state);

        PageOutcome::Processed
    }

    fn filter_and_build(
        &self,
        plan: &SearchPlan,
        hits: &[RawSearchHit],
        videos: &[VideoDetail],
        channels: &[ChannelDetail],
        context: &SearchContext<'_>,
        state: &mut RunState,
    ) {
        let video_map: HashMap<&str, &VideoDetail> =
            videos.iter().map(|v| (v.video_id.as_str(), v)).collect();
        let channel_map: HashMap<&str, &ChannelDetail> =
            channels.iter().map(|c| (c.channel_id.as_str(), c)).collect();
        let now = self.clock.now();

        for hit in hits {
            if state.seen.contains(&hit.video_id) {
                state.stats.duplicates_skipped += 1;
                continue;
            }

            let (Some(video), Some(channel)) = (
                video_map.get(hit.video_id.as_str()),
                channel_map.get(hit.channel_id.as_str()),
            ) else {
                state.stats.missing_details += 1;
                debug!("No details for video {} / channel {}", hit.video_id, hit.channel_id);
                continue;
            };

            let card = ScoreCard::compute(video, channel, now);
            let candidate = Candidate {
                title: &video.title,
                description: &video.description,
                duration_seconds: card.duration.total_seconds(),
                views: video.view_count,
                subscribers: channel.subscriber_count,
                engagement_rate: card.engagement_rate,
                virality_score: card.virality_score,
            };

            if let Err(rejection) = plan.filters.evaluate(&candidate, &self.lexicon) {
                debug!("Rejected {} ({})", hit.video_id, rejection);
                state.stats.reject(rejection);
                continue;
            }

            let record = ScoredRecord::assemble(hit, video, channel, &card, context);
            state.seen.insert(record.video_id.clone());
            state.records.push(record);
        }
    }
}

fn unique_in_order<'s>(ids: impl Iterator<Item = &'s str>) -> Vec<String> {
    let mut seen = HashSet::new();
    ids.filter(|id| seen.insert(*id))
        .map(str::to_string)
        .collect()
}
