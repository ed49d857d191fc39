/// Final ordering and run-level aggregates
use crate::metrics::{ViralityTier, VIRAL_THRESHOLD};
use crate::record::ScoredRecord;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;

/// Virality descending, then views descending. Stable, so full ties keep
/// discovery order.
pub fn rank(records: &mut [ScoredRecord]) {
    records.sort_by(compare_for_ranking);
}

fn compare_for_ranking(a: &ScoredRecord, b: &ScoredRecord) -> Ordering {
    b.virality_score
        .total_cmp(&a.virality_score)
        .then_with(|| b.views.cmp(&a.views))
}

/// Aggregates over an accepted record set
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub count: usize,
    pub mean_views: f64,
    pub mean_engagement: f64,
    pub viral_count: usize,
    pub mean_virality: f64,
}

/// Empty input gives an all-zero summary
pub fn summarize(records: &[ScoredRecord]) -> RunSummary {
    if records.is_empty() {
        return RunSummary::default();
    }

    let count = records.len();
    let n = count as f64;
    RunSummary {
        count,
        mean_views: records.iter().map(|r| r.views as f64).sum::<f64>() / n,
        mean_engagement: records.iter().map(|r| r.engagement_rate).sum::<f64>() / n,
        viral_count: records
            .iter()
            .filter(|r| r.virality_score >= VIRAL_THRESHOLD)
            .count(),
        mean_virality: records.iter().map(|r| r.virality_score).sum::<f64>() / n,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordPerformance {
    pub keyword: String,
    pub videos: usize,
    pub mean_views: f64,
    pub mean_virality: f64,
}

/// Per-keyword means, best mean virality first
pub fn keyword_breakdown(records: &[ScoredRecord]) -> Vec<KeywordPerformance> {
    let mut order: Vec<&str> = Vec::new();
    let mut groups: HashMap<&str, Vec<&ScoredRecord>> = HashMap::new();
    for record in records {
        let group = groups.entry(record.keyword.as_str()).or_insert_with(|| {
            order.push(record.keyword.as_str());
            Vec::new()
        });
        group.push(record);
    }

    let mut breakdown: Vec<KeywordPerformance> = order
        .into_iter()
        .map(|keyword| {
            let group = &groups[keyword];
            let n = group.len() as f64;
            KeywordPerformance {
                keyword: keyword.to_string(),
                videos: group.len(),
                mean_views: group.iter().map(|r| r.views as f64).sum::<f64>() / n,
                mean_virality: group.iter().map(|r| r.virality_score).sum::<f64>() / n,
            }
        })
        .collect();

    breakdown.sort_by(|a, b| b.mean_virality.total_cmp(&a.mean_virality));
    breakdown
}

/// Record count per tier, highest tier first, empty tiers omitted
pub fn tier_distribution(records: &[ScoredRecord]) -> Vec<(ViralityTier, usize)> {
    ViralityTier::all()
        .into_iter()
        .map(|tier| (tier, records.iter().filter(|r| r.virality_tier == tier).count()))
        .filter(|(_, count)| *count > 0)
        .collect()
}

/// Record count per channel country, most common first
pub fn country_distribution(records: &[ScoredRecord]) -> Vec<(String, usize)> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for record in records {
        let country = record.channel_country.clone().unwrap_or_else(|| "N/A".to_string());
        *counts.entry(country).or_insert(0) += 1;
    }

    let mut distribution: Vec<(String, usize)> = counts.into_iter().collect();
    distribution.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    distribution
}

pub fn top_by_virality(records: &[ScoredRecord], n: usize) -> Vec<&ScoredRecord> {
    let mut sorted: Vec<&ScoredRecord> = records.iter().collect();
    sorted.sort_by(|a, b| compare_for_ranking(a, b));
    sorted.truncate(n);
    sorted
}

pub fn top_by_engagement(records: &[ScoredRecord], n: usize) -> Vec<&ScoredRecord> {
    let mut sorted: Vec<&ScoredRecord> = records.iter().collect();
    sorted.sort_by(|a, b| b.engagement_rate.total_cmp(&a.engagement_rate));
    sorted.truncate(n);
    sorted
}

/// Records from the smallest channels, the best replication candidates
pub fn smallest_channels(records: &[ScoredRecord], n: usize) -> Vec<&ScoredRecord> {
    let mut sorted: Vec<&ScoredRecord> = records.iter().collect();
    sorted.sort_by_key(|r| r.subscribers);
    sorted.truncate(n);
    sorted
}

/// Serializable end-of-run report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub summary: RunSummary,
    pub keywords: Vec<KeywordPerformance>,
    pub tiers: Vec<(ViralityTier, usize)>,
    pub countries: Vec<(String, usize)>,
    pub top_viral: Vec<String>,
    pub top_engagement: Vec<String>,
    pub small_channels: Vec<String>,
}

impl RunReport {
    pub fn build(records: &[ScoredRecord], top_n: usize) -> Self {
        let ids = |list: Vec<&ScoredRecord>| -> Vec<String> {
            list.into_iter().map(|r| r.video_id.clone()).collect()
        };
        Self {
            summary: summarize(records),
            keywords: keyword_breakdown(records),
            tiers: tier_distribution(records),
            countries: country_distribution(records),
            top_viral: ids(top_by_virality(records, top_n)),
            top_engagement: ids(top_by_engagement(records, top_n)),
            small_channels: ids(smallest_channels(records, top_n)),
        }
    }
}
