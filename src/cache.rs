/// Time-bounded memoization in front of the three upstream lookups
///
/// Failed fetches are cached exactly like successful ones, so a keyword that keeps
/// failing is not retried until its entry expires. There is no in-flight
/// coalescing: two concurrent misses on the same key both fetch and the later
/// write replaces the earlier one.
use crate::clock::Clock;
use crate::youtube::{ApiResult, ChannelDetail, RawSearchHit, SearchRequest, VideoDetail, YouTubeApi};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Default time-to-live of a cache entry, in seconds
pub const DEFAULT_TTL_SECONDS: i64 = 3600;

/// Identity of one upstream call.
///
/// The credential is part of the key (as an MD5 fingerprint) so two keys never
/// share a line. Id sets are sorted and de-duplicated so ordering does not matter.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    Search {
        keyword: String,
        published_after: String,
        region_code: String,
        page_size: u32,
        language_hint: String,
        credential: String,
    },
    Videos {
        ids: Vec<String>,
        credential: String,
    },
    Channels {
        ids: Vec<String>,
        credential: String,
    },
}

impl CacheKey {
    pub fn search(request: &SearchRequest, api_key: &str) -> Self {
        CacheKey::Search {
            keyword: request.keyword.clone(),
            published_after: request.published_after_param(),
            region_code: request.region_code.clone(),
            page_size: request.page_size,
            language_hint: request.language_hint.clone(),
            credential: credential_fingerprint(api_key),
        }
    }

    pub fn videos(ids: &[String], api_key: &str) -> Self {
        CacheKey::Videos {
            ids: normalize_ids(ids),
            credential: credential_fingerprint(api_key),
        }
    }

    pub fn channels(ids: &[String], api_key: &str) -> Self {
        CacheKey::Channels {
            ids: normalize_ids(ids),
            credential: credential_fingerprint(api_key),
        }
    }

    fn describe(&self) -> String {
        match self {
            CacheKey::Search {
                keyword,
                region_code,
                ..
            } => format!("search '{}' [{}]", keyword, region_code),
            CacheKey::Videos { ids, .. } => format!("videos x{}", ids.len()),
            CacheKey::Channels { ids, .. } => format!("channels x{}", ids.len()),
        }
    }
}

fn credential_fingerprint(api_key: &str) -> String {
    format!("{:x}", md5::compute(api_key.as_bytes()))
}

fn normalize_ids(ids: &[String]) -> Vec<String> {
    let mut ids = ids.to_vec();
    ids.sort();
    ids.dedup();
    ids
}

/// One stored response, payload or error alike
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    pub value: ApiResult<V>,
    pub inserted_at: DateTime<Utc>,
}

impl<V> CacheEntry<V> {
    fn is_live(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        now - self.inserted_at < ttl
    }
}

/// Entry counts of one operation's table
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TableStats {
    pub live: usize,
    pub expired: usize,
    pub errors: usize,
}

/// Cache statistics
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub search: TableStats,
    pub videos: TableStats,
    pub channels: TableStats,
    pub hits: u64,
    pub misses: u64,
}

struct TtlTable<V> {
    entries: RwLock<HashMap<CacheKey, CacheEntry<V>>>,
}

impl<V: Clone> TtlTable<V> {
    fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    async fn lookup(&self, key: &CacheKey, now: DateTime<Utc>, ttl: Duration) -> Option<ApiResult<V>> {
        let entries = self.entries.read().await;
        entries
            .get(key)
            .filter(|entry| entry.is_live(now, ttl))
            .map(|entry| entry.value.clone())
    }

    async fn store(&self, key: CacheKey, value: ApiResult<V>, now: DateTime<Utc>) {
        let entry = CacheEntry {
            value,
            inserted_at: now,
        };
        self.entries.write().await.insert(key, entry);
    }

    async fn stats(&self, now: DateTime<Utc>, ttl: Duration) -> TableStats {
        let entries = self.entries.read().await;
        let mut stats = TableStats::default();
        for entry in entries.values() {
            if entry.is_live(now, ttl) {
                stats.live += 1;
                if entry.value.is_err() {
                    stats.errors += 1;
                }
            } else {
                stats.expired += 1;
            }
        }
        stats
    }

    async fn purge_expired(&self, now: DateTime<Utc>, ttl: Duration) -> usize {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| entry.is_live(now, ttl));
        before - entries.len()
    }

    async fn clear(&self) -> usize {
        let mut entries = self.entries.write().await;
        let count = entries.len();
        entries.clear();
        count
    }
}

/// Caching decorator over any [`YouTubeApi`].
///
/// Construct once per process and share by reference; entries outlive runs.
pub struct ResultCache {
    api: Arc<dyn YouTubeApi>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
    search: TtlTable<Vec<RawSearchHit>>,
    videos: TtlTable<Vec<VideoDetail>>,
    channels: TtlTable<Vec<ChannelDetail>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl ResultCache {
    pub fn new(api: Arc<dyn YouTubeApi>, clock: Arc<dyn Clock>, ttl: Duration) -> Self {
        Self {
            api,
            clock,
            ttl,
            search: TtlTable::new(),
            videos: TtlTable::new(),
            channels: TtlTable::new(),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    pub fn with_default_ttl(api: Arc<dyn YouTubeApi>, clock: Arc<dyn Clock>) -> Self {
        Self::new(api, clock, Duration::seconds(DEFAULT_TTL_SECONDS))
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    async fn get_or_fetch<V, F, Fut>(&self, table: &TtlTable<V>, key: CacheKey, fetch: F) -> ApiResult<V>
    where
        V: Clone,
        F: FnOnce() -> Fut,
        Fut: Future<Output = ApiResult<V>>,
    {
        if let Some(cached) = table.lookup(&key, self.clock.now(), self.ttl).await {
            self.hits.fetch_add(1, Ordering::Relaxed);
            debug!("📚 Cache hit: {}", key.describe());
            return cached;
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        debug!("Cache miss: {}", key.describe());

        let value = fetch().await;
        table.store(key, value.clone(), self.clock.now()).await;
        value
    }

    pub async fn stats(&self) -> CacheStats {
        let now = self.clock.now();
        CacheStats {
            search: self.search.stats(now, self.ttl).await,
            videos: self.videos.stats(now, self.ttl).await,
            channels: self.channels.stats(now, self.ttl).await,
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }

    /// Drop expired entries, returning how many were removed
    pub async fn cleanup_expired(&self) -> usize {
        let now = self.clock.now();
        let cleaned = self.search.purge_expired(now, self.ttl).await
            + self.videos.purge_expired(now, self.ttl).await
            + self.channels.purge_expired(now, self.ttl).await;
        if cleaned > 0 {
            info!("🧹 Cleaned up {} expired cache entries", cleaned);
        }
        cleaned
    }

    /// Drop every entry, returning how many were removed
    pub async fn clear(&self) -> usize {
        self.search.clear().await + self.videos.clear().await + self.channels.clear().await
    }
}

#[async_trait]
impl YouTubeApi for ResultCache {
    async fn search(&self, request: &SearchRequest, api_key: &str) -> ApiResult<Vec<RawSearchHit>> {
        let key = CacheKey::search(request, api_key);
        self.get_or_fetch(&self.search, key, || self.api.search(request, api_key))
            .await
    }

    async fn videos(&self, video_ids: &[String], api_key: &str) -> ApiResult<Vec<VideoDetail>> {
        let key = CacheKey::videos(video_ids, api_key);
        self.get_or_fetch(&self.videos, key, || self.api.videos(video_ids, api_key))
            .await
    }

    async fn channels(
        &self,
        channel_ids: &[String],
        api_key: &str,
    ) -> ApiResult<Vec<ChannelDetail>> {
        let key = CacheKey::channels(channel_ids, api_key);
        self.get_or_fetch(&self.channels, key, || self.api.channels(channel_ids, api_key))
            .await
    }
}
