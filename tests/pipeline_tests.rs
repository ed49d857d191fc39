use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use shorts_finder::catalog::find_region;
use shorts_finder::orchestrator::FetchStage;
use shorts_finder::youtube::{ApiResult, ChannelDetail, RawSearchHit, SearchRequest, VideoDetail};
use shorts_finder::{
    rank, ApiError, FilterThresholds, FinderError, ManualClock, NicheCategory, Rejection,
    ResultCache, SearchOrchestrator, SearchPlan, ViralityTier, YouTubeApi,
};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 10, 12, 0, 0).unwrap()
}

/// In-memory upstream with call counters
#[derive(Default)]
struct FakeApi {
    pages: HashMap<(String, String), Vec<RawSearchHit>>,
    failing_searches: HashSet<(String, String)>,
    videos: HashMap<String, VideoDetail>,
    channels: HashMap<String, ChannelDetail>,
    fail_videos: bool,
    fail_channels: bool,
    search_calls: AtomicUsize,
    video_calls: AtomicUsize,
    channel_calls: AtomicUsize,
    requested_video_ids: Mutex<Vec<Vec<String>>>,
}

impl FakeApi {
    fn page(mut self, region: &str, keyword: &str, hits: Vec<RawSearchHit>) -> Self {
        self.pages.insert((region.to_string(), keyword.to_string()), hits);
        self
    }

    fn failing(mut self, region: &str, keyword: &str) -> Self {
        self.failing_searches
            .insert((region.to_string(), keyword.to_string()));
        self
    }

    fn video(mut self, video: VideoDetail) -> Self {
        self.videos.insert(video.video_id.clone(), video);
        self
    }

    fn channel(mut self, id: &str, subscribers: u64) -> Self {
        self.channels.insert(
            id.to_string(),
            ChannelDetail {
                channel_id: id.to_string(),
                subscriber_count: subscribers,
                country: Some("ES".to_string()),
            },
        );
        self
    }

    fn calls(&self) -> (usize, usize, usize) {
        (
            self.search_calls.load(Ordering::SeqCst),
            self.video_calls.load(Ordering::SeqCst),
            self.channel_calls.load(Ordering::SeqCst),
        )
    }
}

#[async_trait]
impl YouTubeApi for FakeApi {
    async fn search(&self, request: &SearchRequest, _api_key: &str) -> ApiResult<Vec<RawSearchHit>> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        let key = (request.region_code.clone(), request.keyword.clone());
        if self.failing_searches.contains(&key) {
            return Err(ApiError::Transport("connection reset".to_string()));
        }
        Ok(self.pages.get(&key).cloned().unwrap_or_default())
    }

    async fn videos(&self, video_ids: &[String], _api_key: &str) -> ApiResult<Vec<VideoDetail>> {
        self.video_calls.fetch_add(1, Ordering::SeqCst);
        self.requested_video_ids
            .lock()
            .unwrap()
            .push(video_ids.to_vec());
        if self.fail_videos {
            return Err(ApiError::Status {
                status: 403,
                body: "quotaExceeded".to_string(),
            });
        }
        Ok(video_ids
            .iter()
            .filter_map(|id| self.videos.get(id).cloned())
            .collect())
    }

    async fn channels(&self, channel_ids: &[String], _api_key: &str) -> ApiResult<Vec<ChannelDetail>> {
        self.channel_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_channels {
            return Err(ApiError::Transport("operation timed out".to_string()));
        }
        Ok(channel_ids
            .iter()
            .filter_map(|id| self.channels.get(id).cloned())
            .collect())
    }
}

fn hit(video_id: &str, channel_id: &str) -> RawSearchHit {
    RawSearchHit {
        video_id: video_id.to_string(),
        channel_id: channel_id.to_string(),
        title: format!("Video {}", video_id),
        channel_title: format!("Canal {}", channel_id),
    }
}

fn spanish_video(video_id: &str, views: u64) -> VideoDetail {
    VideoDetail {
        video_id: video_id.to_string(),
        title: "El secreto de la disciplina".to_string(),
        description: "Motivación para tu vida".to_string(),
        published_at: "2024-03-08T12:00:00Z".to_string(),
        channel_title: String::new(),
        tags: vec!["motivación".to_string()],
        duration: "PT0M45S".to_string(),
        view_count: views,
        like_count: views / 20,
        comment_count: views / 100,
        thumbnail_url: String::new(),
    }
}

fn plan(regions: &[&str], keywords: &[&str]) -> SearchPlan {
    let mut plan = SearchPlan::new(
        "test-key",
        NicheCategory::General,
        &[],
        regions.iter().map(|code| *find_region(code).unwrap()).collect(),
        now() - Duration::days(7),
        10,
        FilterThresholds::default(),
    )
    .with_pacing(std::time::Duration::ZERO);
    plan.keywords = keywords.iter().map(|k| k.to_string()).collect();
    plan
}

#[tokio::test]
async fn test_scenario_record_values() {
    let api = FakeApi::default()
        .page("ES", "motivación personal", vec![hit("v1", "c1")])
        .video(VideoDetail {
            like_count: 25_000,
            comment_count: 5_000,
            ..spanish_video("v1", 500_000)
        })
        .channel("c1", 10_000);
    let clock = Arc::new(ManualClock::new(now()));

    let orchestrator = SearchOrchestrator::new(&api, clock);
    let outcome = orchestrator
        .run(&plan(&["ES"], &["motivación personal"]))
        .await
        .unwrap();

    assert_eq!(outcome.records.len(), 1);
    let record = &outcome.records[0];
    assert_eq!(record.engagement_rate, 6.0);
    assert_eq!(record.duration_seconds, 45);
    assert_eq!(record.virality_score, 100.0);
    assert_eq!(record.virality_tier, ViralityTier::Viral);
    assert_eq!(record.views_per_day, 250_000.0);
    assert_eq!(record.age_days, 2);
    assert_eq!(record.keyword, "motivación personal");
    assert_eq!(record.region_code, "ES");
    assert_eq!(record.channel_title, "Canal c1");
    assert!(outcome.warnings.is_empty());
}

#[tokio::test]
async fn test_duplicates_across_keywords_and_regions_emitted_once() {
    let api = FakeApi::default()
        .page("ES", "metas", vec![hit("v1", "c1"), hit("v2", "c1")])
        .page("ES", "éxito", vec![hit("v1", "c1")])
        .page("MX", "metas", vec![hit("v2", "c1"), hit("v1", "c1")])
        .video(spanish_video("v1", 20_000))
        .video(spanish_video("v2", 30_000))
        .channel("c1", 1_000);
    let clock = Arc::new(ManualClock::new(now()));

    let outcome = SearchOrchestrator::new(&api, clock)
        .run(&plan(&["ES", "MX"], &["metas", "éxito"]))
        .await
        .unwrap();

    let ids: Vec<&str> = outcome.records.iter().map(|r| r.video_id.as_str()).collect();
    assert_eq!(ids, vec!["v1", "v2"]);
    assert_eq!(outcome.records[0].keyword, "metas");
    assert_eq!(outcome.stats.duplicates_skipped, 3);

    // Pages whose ids were all seen never reach the detail endpoints
    let (searches, video_calls, _) = api.calls();
    assert_eq!(searches, 4);
    assert_eq!(video_calls, 1);
}

#[tokio::test]
async fn test_search_failure_is_recorded_and_run_continues() {
    let api = FakeApi::default()
        .failing("ES", "metas")
        .page("ES", "éxito", vec![hit("v1", "c1")])
        .video(spanish_video("v1", 20_000))
        .channel("c1", 1_000);
    let clock = Arc::new(ManualClock::new(now()));

    let outcome = SearchOrchestrator::new(&api, clock)
        .run(&plan(&["ES"], &["metas", "éxito"]))
        .await
        .unwrap();

    assert_eq!(outcome.records.len(), 1);
    assert_eq!(outcome.warnings.len(), 1);
    let warning = &outcome.warnings[0];
    assert_eq!(warning.keyword, "metas");
    assert_eq!(warning.region_code, "ES");
    assert_eq!(warning.stage, FetchStage::Search);
    assert!(matches!(warning.error, ApiError::Transport(_)));
    assert_eq!(outcome.stats.searches_failed, 1);
    assert_eq!(outcome.stats.pairs_processed, 2);
}

#[tokio::test]
async fn test_detail_failure_skips_whole_page() {
    let api = FakeApi {
        fail_videos: true,
        ..FakeApi::default()
    }
    .page("ES", "metas", vec![hit("v1", "c1"), hit("v2", "c1")])
    .video(spanish_video("v1", 20_000))
    .channel("c1", 1_000);
    let clock = Arc::new(ManualClock::new(now()));

    let outcome = SearchOrchestrator::new(&api, clock)
        .run(&plan(&["ES"], &["metas"]))
        .await
        .unwrap();

    assert!(outcome.records.is_empty());
    assert_eq!(outcome.stats.pages_skipped, 1);
    assert_eq!(outcome.warnings[0].stage, FetchStage::Videos);
    assert_eq!(
        outcome.warnings[0].error,
        ApiError::Status {
            status: 403,
            body: "quotaExceeded".to_string()
        }
    );
}

#[tokio::test]
async fn test_channel_detail_failure_skips_whole_page() {
    let api = FakeApi {
        fail_channels: true,
        ..FakeApi::default()
    }
    .page("ES", "metas", vec![hit("v1", "c1"), hit("v2", "c2")])
    .video(spanish_video("v1", 20_000))
    .video(spanish_video("v2", 20_000))
    .channel("c1", 1_000)
    .channel("c2", 1_000);
    let clock = Arc::new(ManualClock::new(now()));

    let outcome = SearchOrchestrator::new(&api, clock)
        .run(&plan(&["ES"], &["metas"]))
        .await
        .unwrap();

    assert!(outcome.records.is_empty());
    assert_eq!(outcome.stats.pages_skipped, 1);
    assert_eq!(outcome.warnings.len(), 1);
    assert_eq!(outcome.warnings[0].stage, FetchStage::Channels);
    assert!(matches!(outcome.warnings[0].error, ApiError::Transport(_)));
    assert_eq!(api.calls(), (1, 1, 1));
}

#[tokio::test]
async fn test_min_views_and_subscriber_ceiling() {
    let api = FakeApi::default()
        .page("ES", "metas", vec![hit("low", "small"), hit("ok", "huge")])
        .video(spanish_video("low", 4_999))
        .video(spanish_video("ok", 5_000))
        .channel("small", 100)
        .channel("huge", 10_000_000);
    let clock: Arc<ManualClock> = Arc::new(ManualClock::new(now()));

    let outcome = SearchOrchestrator::new(&api, clock.clone())
        .run(&plan(&["ES"], &["metas"]))
        .await
        .unwrap();
    assert!(outcome.records.is_empty());
    assert_eq!(outcome.stats.rejections.get(&Rejection::TooFewViews), Some(&1));
    assert_eq!(
        outcome.stats.rejections.get(&Rejection::TooManySubscribers),
        Some(&1)
    );

    let mut no_ceiling = plan(&["ES"], &["metas"]);
    no_ceiling.filters.max_subscribers = 0;
    let outcome = SearchOrchestrator::new(&api, clock)
        .run(&no_ceiling)
        .await
        .unwrap();
    let ids: Vec<&str> = outcome.records.iter().map(|r| r.video_id.as_str()).collect();
    assert_eq!(ids, vec!["ok"]);
    assert_eq!(outcome.records[0].subscribers, 10_000_000);
}

#[tokio::test]
async fn test_missing_channel_detail_drops_record() {
    let api = FakeApi::default()
        .page("ES", "metas", vec![hit("v1", "gone"), hit("v2", "c1")])
        .video(spanish_video("v1", 20_000))
        .video(spanish_video("v2", 20_000))
        .channel("c1", 1_000);
    let clock = Arc::new(ManualClock::new(now()));

    let outcome = SearchOrchestrator::new(&api, clock)
        .run(&plan(&["ES"], &["metas"]))
        .await
        .unwrap();

    assert_eq!(outcome.records.len(), 1);
    assert_eq!(outcome.records[0].video_id, "v2");
    assert_eq!(outcome.stats.missing_details, 1);
}

#[tokio::test]
async fn test_missing_api_key_fails_before_any_fetch() {
    let api = FakeApi::default().page("ES", "metas", vec![hit("v1", "c1")]);
    let clock = Arc::new(ManualClock::new(now()));
    let mut plan = plan(&["ES"], &["metas"]);
    plan.api_key = String::new();

    let result = SearchOrchestrator::new(&api, clock).run(&plan).await;

    assert!(matches!(result, Err(FinderError::Configuration(_))));
    assert_eq!(api.calls(), (0, 0, 0));
}

#[tokio::test]
async fn test_ranking_is_stable_over_discovery_order() {
    let api = FakeApi::default()
        .page(
            "ES",
            "metas",
            vec![hit("a", "c1"), hit("b", "c1"), hit("c", "c2")],
        )
        .video(spanish_video("a", 20_000))
        .video(spanish_video("b", 20_000))
        .video(spanish_video("c", 90_000))
        .channel("c1", 1_000)
        .channel("c2", 1_000);
    let clock = Arc::new(ManualClock::new(now()));

    let mut records = SearchOrchestrator::new(&api, clock)
        .run(&plan(&["ES"], &["metas"]))
        .await
        .unwrap()
        .records;
    rank(&mut records);

    let ids: Vec<&str> = records.iter().map(|r| r.video_id.as_str()).collect();
    assert_eq!(ids, vec!["c", "a", "b"]);
}

#[tokio::test]
async fn test_cache_serves_repeat_run_without_upstream_calls() {
    let api = Arc::new(
        FakeApi::default()
            .page("ES", "metas", vec![hit("v1", "c1")])
            .video(spanish_video("v1", 20_000))
            .channel("c1", 1_000),
    );
    let clock = Arc::new(ManualClock::new(now()));
    let cache = ResultCache::with_default_ttl(api.clone(), clock.clone());
    let plan = plan(&["ES"], &["metas"]);

    let first = SearchOrchestrator::new(&cache, clock.clone())
        .run(&plan)
        .await
        .unwrap();
    let second = SearchOrchestrator::new(&cache, clock.clone())
        .run(&plan)
        .await
        .unwrap();

    assert_eq!(first.records, second.records);
    assert_eq!(api.calls(), (1, 1, 1));

    // Past the TTL everything is fetched again
    clock.advance(Duration::seconds(3600));
    SearchOrchestrator::new(&cache, clock).run(&plan).await.unwrap();
    assert_eq!(api.calls(), (2, 2, 2));
}

#[tokio::test]
async fn test_progress_reported_per_pair() {
    let api = FakeApi::default();
    let clock = Arc::new(ManualClock::new(now()));
    let (tx, mut rx) = mpsc::unbounded_channel();

    let orchestrator = SearchOrchestrator::new(&api, clock).with_progress(tx);
    orchestrator
        .run(&plan(&["ES", "AR"], &["metas", "éxito"]))
        .await
        .unwrap();
    drop(orchestrator);

    let mut seen = Vec::new();
    while let Some(progress) = rx.recv().await {
        seen.push((progress.completed, progress.total, progress.region_code, progress.keyword));
    }
    assert_eq!(seen.len(), 4);
    assert_eq!(seen[0], (1, 4, "ES".to_string(), "metas".to_string()));
    assert_eq!(seen[3], (4, 4, "AR".to_string(), "éxito".to_string()));
}

#[tokio::test]
async fn test_only_unseen_ids_requested_for_details() {
    let api = FakeApi::default()
        .page("ES", "metas", vec![hit("v1", "c1")])
        .page("ES", "éxito", vec![hit("v1", "c1"), hit("v2", "c2")])
        .video(spanish_video("v1", 20_000))
        .video(spanish_video("v2", 20_000))
        .channel("c1", 1_000)
        .channel("c2", 1_000);
    let clock = Arc::new(ManualClock::new(now()));

    SearchOrchestrator::new(&api, clock)
        .run(&plan(&["ES"], &["metas", "éxito"]))
        .await
        .unwrap();

    let requested = api.requested_video_ids.lock().unwrap().clone();
    assert_eq!(requested, vec![vec!["v1".to_string()], vec!["v2".to_string()]]);
}
