use anyhow::Result;
use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use shorts_finder::config::read_keywords_file;
use shorts_finder::metrics::format_compact;
use shorts_finder::{
    rank, Config, NicheCategory, ResultCache, RunReport, SearchOrchestrator, SpanishLexicon,
    SystemClock, YouTubeClient, REGIONS,
};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "shorts-finder")]
#[command(version, author = "TigreRoll")]
#[command(about = "Find fast-growing Spanish motivation Shorts from small channels")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (defaults to the usual search locations)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Search, score and rank Shorts
    Search(SearchArgs),
    /// List niche categories and their keywords
    Categories,
    /// List supported region codes
    Regions,
    /// Write a default configuration file
    InitConfig {
        #[arg(default_value = "shorts-finder.toml")]
        path: PathBuf,
    },
}

#[derive(Args)]
struct SearchArgs {
    /// Niche category
    #[arg(short, long, value_enum)]
    category: Option<NicheCategory>,

    /// Extra keyword (repeatable)
    #[arg(short, long = "keyword")]
    keywords: Vec<String>,

    /// File with one extra keyword per line
    #[arg(long)]
    keywords_file: Option<PathBuf>,

    /// Region code (repeatable)
    #[arg(short, long = "region")]
    regions: Vec<String>,

    /// Only videos published in the last N days
    #[arg(short, long)]
    days: Option<u32>,

    /// Results per search (1-50)
    #[arg(long)]
    page_size: Option<u32>,

    #[arg(long)]
    min_views: Option<u64>,

    /// Channel size ceiling, 0 disables it
    #[arg(long)]
    max_subscribers: Option<u64>,

    /// Minimum engagement percentage
    #[arg(long)]
    min_engagement: Option<f64>,

    #[arg(long)]
    min_virality: Option<f64>,

    #[arg(long)]
    min_duration: Option<u64>,

    #[arg(long)]
    max_duration: Option<u64>,

    /// Keep videos the Spanish lexicon does not recognise
    #[arg(long)]
    any_language: bool,

    /// YouTube Data API key (overrides YOUTUBE_API_KEY)
    #[arg(long)]
    api_key: Option<String>,

    /// Output file for ranked results
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output file for the run report
    #[arg(long)]
    report: Option<PathBuf>,
}

impl SearchArgs {
    fn apply(self, config: &mut Config) -> Result<()> {
        if let Some(category) = self.category {
            config.search.category = category;
        }
        if let Some(path) = &self.keywords_file {
            config.search.custom_keywords.extend(read_keywords_file(path)?);
        }
        config.search.custom_keywords.extend(self.keywords);
        if !self.regions.is_empty() {
            config.search.regions = self.regions.iter().map(|r| r.trim().to_uppercase()).collect();
        }
        if let Some(days) = self.days {
            config.search.lookback_days = days;
        }
        if let Some(page_size) = self.page_size {
            config.search.page_size = page_size;
        }

        let filters = &mut config.filters;
        if let Some(v) = self.min_views {
            filters.min_views = v;
        }
        if let Some(v) = self.max_subscribers {
            filters.max_subscribers = v;
        }
        if let Some(v) = self.min_engagement {
            filters.min_engagement = v;
        }
        if let Some(v) = self.min_virality {
            filters.min_virality = v;
        }
        if let Some(v) = self.min_duration {
            filters.min_duration_seconds = v;
        }
        if let Some(v) = self.max_duration {
            filters.max_duration_seconds = v;
        }
        if self.any_language {
            filters.spanish_only = false;
        }

        if let Some(api_key) = self.api_key {
            config.api.api_key = Some(api_key);
        }
        if let Some(output) = self.output {
            config.output.results_file = output;
        }
        if let Some(report) = self.report {
            config.output.report_file = Some(report);
        }
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let default_filter = if cli.verbose {
        "shorts_finder=debug,warn"
    } else {
        "shorts_finder=info,warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .init();

    if cli.verbose {
        info!("Verbose logging enabled");
    }

    let load_config = || match &cli.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    };

    match cli.command {
        Commands::Search(args) => {
            let mut config = load_config()?;
            args.apply(&mut config)?;
            run_search(config).await?;
        }
        Commands::Categories => {
            for category in NicheCategory::all() {
                info!("📂 {} ({:?})", category.label(), category);
                for keyword in category.keywords() {
                    info!("   - {}", keyword);
                }
            }
        }
        Commands::Regions => {
            for region in REGIONS {
                info!("🌎 {}  {}", region.code, region.name);
            }
        }
        Commands::InitConfig { path } => {
            Config::default().save(&path)?;
        }
    }

    Ok(())
}

/// Wait for the progress logger; returns false if it did not finish cleanly
async fn await_progress_reporter(task: JoinHandle<()>) -> bool {
    match task.await {
        Ok(()) => true,
        Err(e) => {
            warn!("Progress reporter stopped abnormally: {}", e);
            false
        }
    }
}

async fn run_search(config: Config) -> Result<()> {
    config.validate()?;
    info!("🚀 Shorts Finder (Rust) starting...");
    info!("{}", config.summary());

    let plan = config.search_plan(Utc::now())?;

    let lexicon = match &config.search.lexicon_file {
        Some(path) => SpanishLexicon::from_file(path).await?,
        None => SpanishLexicon::new(),
    };

    let client = YouTubeClient::new(&config.api.base_url, config.api.timeout_seconds)?;
    let cache = ResultCache::new(
        Arc::new(client),
        Arc::new(SystemClock),
        chrono::Duration::seconds(config.cache.ttl_seconds),
    );

    let (progress_tx, mut progress_rx) = mpsc::unbounded_channel::<shorts_finder::SearchProgress>();
    let progress_task = tokio::spawn(async move {
        while let Some(progress) = progress_rx.recv().await {
            info!(
                "🔍 [{}/{}] '{}' in {}",
                progress.completed, progress.total, progress.keyword, progress.region_code
            );
        }
    });

    let start_time = std::time::Instant::now();
    let orchestrator = SearchOrchestrator::new(&cache, cache.clock().clone())
        .with_lexicon(lexicon)
        .with_progress(progress_tx);
    let outcome = orchestrator.run(&plan).await?;
    drop(orchestrator);
    await_progress_reporter(progress_task).await;
    let duration = start_time.elapsed();

    for warning in &outcome.warnings {
        warn!("{}", warning);
    }

    let mut records = outcome.records;
    rank(&mut records);
    let report = RunReport::build(&records, config.output.top_n);

    info!("🎉 Search completed in {:.2}s", duration.as_secs_f64());
    info!("✅ Records: {}", report.summary.count);
    info!("🔥 Viral (60+): {}", report.summary.viral_count);
    info!("👁️ Mean views: {}", format_compact(report.summary.mean_views as u64));
    info!("💬 Mean engagement: {:.2}%", report.summary.mean_engagement);
    info!(
        "🚫 Rejected: {} | Duplicates: {} | Failed searches: {} | Skipped pages: {}",
        outcome.stats.total_rejected(),
        outcome.stats.duplicates_skipped,
        outcome.stats.searches_failed,
        outcome.stats.pages_skipped
    );

    for keyword in report.keywords.iter().take(config.output.top_n) {
        info!(
            "🔑 '{}': {} videos, mean virality {:.1}",
            keyword.keyword, keyword.videos, keyword.mean_virality
        );
    }

    for record in records.iter().take(config.output.top_n) {
        info!(
            "⭐ {:.1} [{}] {} views | {} subs | {}",
            record.virality_score,
            record.virality_tier,
            format_compact(record.views),
            format_compact(record.subscribers),
            record.title
        );
    }

    let stats = cache.stats().await;
    info!("📚 Cache: {} hits, {} misses", stats.hits, stats.misses);

    let json = serde_json::to_string_pretty(&records)?;
    tokio::fs::write(&config.output.results_file, json).await?;
    info!("💾 Results saved to: {}", config.output.results_file.display());

    if let Some(report_file) = &config.output.report_file {
        tokio::fs::write(report_file, serde_json::to_string_pretty(&report)?).await?;
        info!("💾 Report saved to: {}", report_file.display());
    }

    Ok(())
}
