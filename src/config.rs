use crate::cache::DEFAULT_TTL_SECONDS;
use crate::catalog::{find_region, NicheCategory, Region};
use crate::error::FinderError;
use crate::filters::FilterThresholds;
use crate::orchestrator::{SearchPlan, DEFAULT_LANGUAGE_HINT, MAX_PAGE_SIZE};
use crate::youtube::client::DEFAULT_BASE_URL;
use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Longest lookback window accepted, ten years
pub const MAX_LOOKBACK_DAYS: u32 = 3650;

/// Configuration for the Shorts finder
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Upstream API settings
    pub api: ApiConfig,

    /// What to search for and where
    pub search: SearchConfig,

    /// Acceptance thresholds
    pub filters: FilterThresholds,

    /// Response cache settings
    pub cache: CacheConfig,

    /// Output settings
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// YouTube Data API key
    pub api_key: Option<String>,

    /// Base URL of the Data API
    pub base_url: String,

    /// Per-request timeout (seconds)
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub category: NicheCategory,

    /// Extra keywords appended after the category's own
    pub custom_keywords: Vec<String>,

    /// Region codes, searched in order
    pub regions: Vec<String>,

    /// Only videos published within this many days
    pub lookback_days: u32,

    /// Results requested per search (1-50)
    pub page_size: u32,

    /// Relevance language hint
    pub language_hint: String,

    /// Pause after each processed page (milliseconds)
    pub pacing_ms: u64,

    /// Extra lexicon entries for Spanish detection
    pub lexicon_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Entry lifetime (seconds)
    pub ttl_seconds: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// JSON file the ranked records are written to
    pub results_file: PathBuf,

    /// Optional JSON file for the run report
    pub report_file: Option<PathBuf>,

    /// Entries in each report top list
    pub top_n: usize,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_seconds: 10,
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            category: NicheCategory::General,
            custom_keywords: Vec::new(),
            regions: vec!["ES".to_string()],
            lookback_days: 7,
            page_size: 10,
            language_hint: DEFAULT_LANGUAGE_HINT.to_string(),
            pacing_ms: 100,
            lexicon_file: None,
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_seconds: DEFAULT_TTL_SECONDS,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            results_file: PathBuf::from("shorts_results.json"),
            report_file: None,
            top_n: 5,
        }
    }
}

impl Config {
    /// Load configuration from the first readable file, then apply environment overrides
    pub fn load() -> Result<Self> {
        let mut config_paths = vec![
            PathBuf::from("shorts-finder.toml"),
            PathBuf::from("config/shorts-finder.toml"),
        ];
        if let Ok(home) = std::env::var("HOME") {
            config_paths.push(Path::new(&home).join(".config/shorts-finder/config.toml"));
        }

        for path in &config_paths {
            if let Ok(config_str) = std::fs::read_to_string(path) {
                match toml::from_str::<Config>(&config_str) {
                    Ok(mut config) => {
                        tracing::info!("📄 Loaded configuration from: {}", path.display());
                        config.apply_env();
                        return Ok(config);
                    }
                    Err(e) => {
                        tracing::warn!("Failed to parse config file {}: {}", path.display(), e);
                    }
                }
            }
        }

        Self::from_env()
    }

    /// Load one specific file; unlike [`Config::load`] a bad file is an error
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let config_str = std::fs::read_to_string(path)
            .map_err(|e| anyhow!("Cannot read config file {}: {}", path.display(), e))?;
        let mut config: Config = toml::from_str(&config_str)
            .map_err(|e| anyhow!("Invalid config file {}: {}", path.display(), e))?;
        tracing::info!("📄 Loaded configuration from: {}", path.display());
        config.apply_env();
        Ok(config)
    }

    /// Defaults plus environment overrides
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env();
        Ok(config)
    }

    fn apply_env(&mut self) {
        if let Ok(api_key) = std::env::var("YOUTUBE_API_KEY") {
            if !api_key.trim().is_empty() {
                self.api.api_key = Some(api_key);
            }
        }

        if let Ok(regions) = std::env::var("SHORTS_FINDER_REGIONS") {
            let regions: Vec<String> = regions
                .split(',')
                .map(|r| r.trim().to_uppercase())
                .filter(|r| !r.is_empty())
                .collect();
            if !regions.is_empty() {
                self.search.regions = regions;
            }
        }

        if let Ok(days) = std::env::var("SHORTS_FINDER_DAYS") {
            if let Ok(days) = days.parse() {
                self.search.lookback_days = days;
            }
        }

        if let Ok(page_size) = std::env::var("SHORTS_FINDER_PAGE_SIZE") {
            if let Ok(page_size) = page_size.parse() {
                self.search.page_size = page_size;
            }
        }

        if let Ok(base_url) = std::env::var("SHORTS_FINDER_BASE_URL") {
            self.api.base_url = base_url;
        }
    }

    /// Save configuration to a TOML file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let config_str = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, config_str)?;
        tracing::info!("💾 Configuration saved to: {}", path.display());
        Ok(())
    }

    /// Validate configuration. The API key is checked later, when the plan runs.
    pub fn validate(&self) -> Result<()> {
        if self.search.page_size == 0 || self.search.page_size > MAX_PAGE_SIZE {
            return Err(anyhow!(
                "page_size must be between 1 and {}",
                MAX_PAGE_SIZE
            ));
        }

        if self.search.lookback_days == 0 || self.search.lookback_days > MAX_LOOKBACK_DAYS {
            return Err(anyhow!(
                "lookback_days must be between 1 and {}",
                MAX_LOOKBACK_DAYS
            ));
        }

        if self.api.timeout_seconds == 0 {
            return Err(anyhow!("timeout_seconds must be greater than 0"));
        }

        if self.search.regions.is_empty() {
            return Err(anyhow!("at least one region is required"));
        }
        for code in &self.search.regions {
            if find_region(code).is_none() {
                return Err(anyhow!("unknown region code: {}", code));
            }
        }

        self.filters.validate().map_err(|e| anyhow!(e))?;

        if self.cache.ttl_seconds <= 0 {
            return Err(anyhow!("cache ttl_seconds must be greater than 0"));
        }

        url::Url::parse(&self.api.base_url)
            .map_err(|e| anyhow!("invalid base_url '{}': {}", self.api.base_url, e))?;

        tracing::info!("✅ Configuration validation passed");
        Ok(())
    }

    /// Resolve regions and keywords into the immutable plan for one run
    pub fn search_plan(&self, now: DateTime<Utc>) -> std::result::Result<SearchPlan, FinderError> {
        let regions = self
            .search
            .regions
            .iter()
            .map(|code| {
                find_region(code)
                    .copied()
                    .ok_or_else(|| FinderError::Configuration(format!("unknown region code: {}", code)))
            })
            .collect::<std::result::Result<Vec<Region>, FinderError>>()?;

        let published_after = now
            .checked_sub_signed(chrono::Duration::days(i64::from(self.search.lookback_days)))
            .ok_or_else(|| {
                FinderError::Configuration(format!(
                    "lookback of {} days is out of range",
                    self.search.lookback_days
                ))
            })?;

        let plan = SearchPlan::new(
            self.api.api_key.clone().unwrap_or_default(),
            self.search.category,
            &self.search.custom_keywords,
            regions,
            published_after,
            self.search.page_size,
            self.filters.clone(),
        )
        .with_language_hint(self.search.language_hint.clone())
        .with_pacing(Duration::from_millis(self.search.pacing_ms));

        plan.validate()?;
        Ok(plan)
    }

    /// Get configuration summary
    pub fn summary(&self) -> String {
        format!(
            "Shorts Finder Configuration:\n\
            - Category: {}\n\
            - Custom Keywords: {}\n\
            - Regions: {}\n\
            - Lookback: {} days\n\
            - Page Size: {}\n\
            - Min Views: {}\n\
            - Max Subscribers: {}\n\
            - Duration Window: {}-{}s\n\
            - Spanish Only: {}\n\
            - Cache TTL: {}s",
            self.search.category,
            self.search.custom_keywords.len(),
            self.search.regions.join(", "),
            self.search.lookback_days,
            self.search.page_size,
            self.filters.min_views,
            self.filters.max_subscribers,
            self.filters.min_duration_seconds,
            self.filters.max_duration_seconds,
            self.filters.spanish_only,
            self.cache.ttl_seconds
        )
    }
}

/// Read custom keywords, one per line; blank lines and `#` comments are skipped
pub fn read_keywords_file<P: AsRef<Path>>(path: P) -> Result<Vec<String>> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)
        .map_err(|e| anyhow!("Cannot read keywords file {}: {}", path.display(), e))?;
    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect())
}

/// Configuration builder for programmatic setup
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.config.api.api_key = Some(api_key.into());
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.config.api.base_url = base_url.into();
        self
    }

    pub fn with_category(mut self, category: NicheCategory) -> Self {
        self.config.search.category = category;
        self
    }

    pub fn with_custom_keywords(mut self, keywords: Vec<String>) -> Self {
        self.config.search.custom_keywords = keywords;
        self
    }

    pub fn with_regions(mut self, regions: Vec<String>) -> Self {
        self.config.search.regions = regions;
        self
    }

    pub fn with_lookback_days(mut self, days: u32) -> Self {
        self.config.search.lookback_days = days;
        self
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.config.search.page_size = page_size;
        self
    }

    pub fn with_pacing_ms(mut self, pacing_ms: u64) -> Self {
        self.config.search.pacing_ms = pacing_ms;
        self
    }

    pub fn with_filters(mut self, filters: FilterThresholds) -> Self {
        self.config.filters = filters;
        self
    }

    pub fn with_cache_ttl(mut self, ttl_seconds: i64) -> Self {
        self.config.cache.ttl_seconds = ttl_seconds;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
