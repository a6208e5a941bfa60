//! Corpus curation — turns raw platform exports into the example snapshot.
//!
//! Flow: read CSV export → score engagement → keep the top slice →
//!       clean and filter text → embed (paced) → write snapshot.
//!
//! Curation is fail-soft end to end: a missing or malformed export, or a
//! failed embedding, costs only that platform's rows or that single row.
//! The run itself never fails, so a broken Twitter export cannot stop
//! LinkedIn examples from shipping.

pub mod clean;
pub mod engagement;

use std::cmp::Ordering;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::{info, warn};

use crate::corpus::{Bucket, EmbeddedExample, Platform, SnapshotDocument};
use crate::errors::EngineError;
use crate::model_client::{EmbeddingTask, ModelApi};
use clean::clean_text;
use engagement::{
    linkedin_engagement, top_quota, tweet_engagement, youtube_engagement, LinkedInPostRecord,
    TweetRecord, YouTubeVideoRecord,
};

/// Delay after every embedding attempt. The embedding endpoint rate-limits
/// aggressively on free tiers.
const EMBED_PACING: Duration = Duration::from_millis(500);
/// LinkedIn posts at or under this many chars are too thin to teach style.
const MIN_LINKEDIN_CHARS: usize = 50;
/// YouTube descriptions are truncated to this many chars before embedding.
const MAX_DESCRIPTION_CHARS: usize = 500;
/// Trending topics kept from ranked query columns.
const TREND_LIMIT: usize = 20;

// ────────────────────────────────────────────────────────────────────────────
// Inputs and outputs
// ────────────────────────────────────────────────────────────────────────────

/// Where each export file lives.
#[derive(Debug, Clone)]
pub struct CurationPaths {
    pub linkedin_posts: PathBuf,
    pub youtube_videos: PathBuf,
    pub tweets: PathBuf,
    pub trending_queries: PathBuf,
}

impl CurationPaths {
    /// The conventional export layout under a data directory.
    pub fn from_data_dir(data_dir: &Path) -> Self {
        Self {
            linkedin_posts: data_dir.join("linkedin_posts.csv"),
            youtube_videos: data_dir.join("youtube_videos.csv"),
            tweets: data_dir.join("tweets.csv"),
            trending_queries: data_dir.join("trending_queries.csv"),
        }
    }

    fn for_platform(&self, platform: Platform) -> &Path {
        match platform {
            Platform::LinkedIn => &self.linkedin_posts,
            Platform::YouTube => &self.youtube_videos,
            Platform::Twitter => &self.tweets,
        }
    }
}

/// Row accounting for one platform's run. `curated + embed_failures`
/// always equals `passed_filter`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformReport {
    pub platform: Platform,
    pub rows_read: usize,
    pub selected: usize,
    pub passed_filter: usize,
    pub embed_failures: usize,
    pub curated: usize,
}

/// Everything one curation run produced.
#[derive(Debug, Clone)]
pub struct CurationOutcome {
    pub document: SnapshotDocument,
    pub reports: Vec<PlatformReport>,
}

// ────────────────────────────────────────────────────────────────────────────
// Curation
// ────────────────────────────────────────────────────────────────────────────

/// Runs curation across every platform plus the trending export.
///
/// Infallible: each platform degrades independently and an empty
/// snapshot is a valid outcome.
pub async fn curate(model: &dyn ModelApi, paths: &CurationPaths) -> CurationOutcome {
    info!("Curation started");

    let mut document = SnapshotDocument::default();
    let mut reports = Vec::with_capacity(Platform::ALL.len());

    for platform in Platform::ALL {
        let (bucket, report) =
            curate_platform(model, platform, paths.for_platform(platform)).await;
        info!(
            "{platform}: {} rows read, {} selected, {} passed filters, {} curated ({} embed failures)",
            report.rows_read, report.selected, report.passed_filter, report.curated,
            report.embed_failures
        );
        document.platforms.insert(platform, bucket);
        reports.push(report);
    }

    document.trending_topics = read_trending_topics(&paths.trending_queries);
    info!("Captured {} trending topics", document.trending_topics.len());

    CurationOutcome { document, reports }
}

/// Curates one platform's export into an embedded bucket.
///
/// Selection runs on all parsed rows; the text filters run only on the
/// selected slice, so a thin post costs quota instead of pulling a
/// lower-ranked post up.
async fn curate_platform(
    model: &dyn ModelApi,
    platform: Platform,
    path: &Path,
) -> (Bucket, PlatformReport) {
    let rows = if path.exists() {
        match read_rows(platform, path) {
            Ok(rows) => rows,
            Err(err) => {
                warn!("{platform}: unreadable export at {} ({err})", path.display());
                Vec::new()
            }
        }
    } else {
        warn!("{platform}: no export at {}, skipping", path.display());
        Vec::new()
    };
    let rows_read = rows.len();

    // Rank by engagement, best first. Ties keep export order.
    let mut ranked = rows;
    ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
    ranked.truncate(top_quota(rows_read));
    let selected = ranked.len();

    let texts: Vec<String> = ranked
        .into_iter()
        .map(|(text, _)| text)
        .filter(|text| !text.is_empty())
        .filter(|text| {
            platform != Platform::LinkedIn || text.chars().count() > MIN_LINKEDIN_CHARS
        })
        .collect();
    let passed_filter = texts.len();

    let mut examples = Vec::with_capacity(texts.len());
    let mut embed_failures = 0;
    for text in texts {
        match model.embed(&text, EmbeddingTask::RetrievalDocument).await {
            Ok(embedding) => examples.push(EmbeddedExample { text, embedding }),
            Err(err) => {
                embed_failures += 1;
                warn!("{platform}: embedding failed, dropping example ({err})");
            }
        }
        tokio::time::sleep(EMBED_PACING).await;
    }
    let curated = examples.len();

    (
        Bucket::Semantic(examples),
        PlatformReport {
            platform,
            rows_read,
            selected,
            passed_filter,
            embed_failures,
            curated,
        },
    )
}

// ────────────────────────────────────────────────────────────────────────────
// Export readers
// ────────────────────────────────────────────────────────────────────────────

/// Parses an export into `(cleaned text, engagement)` rows. Any record
/// error rejects the whole file; in practice that means a structural
/// problem like a missing column, which poisons every record anyway.
fn read_rows(platform: Platform, path: &Path) -> Result<Vec<(String, f64)>, EngineError> {
    match platform {
        Platform::LinkedIn => read_linkedin(path),
        Platform::YouTube => read_youtube(path),
        Platform::Twitter => read_tweets(path),
    }
}

fn read_linkedin(path: &Path) -> Result<Vec<(String, f64)>, EngineError> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut rows = Vec::new();
    for result in reader.deserialize() {
        let record: LinkedInPostRecord = result?;
        rows.push((clean_text(&record.post_text), linkedin_engagement(&record)));
    }
    Ok(rows)
}

fn read_youtube(path: &Path) -> Result<Vec<(String, f64)>, EngineError> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut rows = Vec::new();
    for result in reader.deserialize() {
        let record: YouTubeVideoRecord = result?;
        // Title and description are cleaned separately so the joining
        // newline survives whitespace collapsing.
        let title = clean_text(&record.title);
        let description: String = clean_text(&record.description)
            .chars()
            .take(MAX_DESCRIPTION_CHARS)
            .collect();
        let text = format!("Title: {title}\nDescription: {description}...");
        rows.push((text, youtube_engagement(&record)));
    }
    Ok(rows)
}

fn read_tweets(path: &Path) -> Result<Vec<(String, f64)>, EngineError> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut rows = Vec::new();
    for result in reader.deserialize() {
        let record: TweetRecord = result?;
        rows.push((clean_text(&record.text), tweet_engagement(&record)));
    }
    Ok(rows)
}

// ────────────────────────────────────────────────────────────────────────────
// Trending topics
// ────────────────────────────────────────────────────────────────────────────

/// Reads trending topics from whichever recognized column the export has.
///
/// Ranked exports (`query`, `top_query`) are already ordered, so the
/// first [`TREND_LIMIT`] rows win. Raw search logs (`keyword_searched`)
/// are deduplicated in order instead, with no limit.
fn read_trending_topics(path: &Path) -> Vec<String> {
    if !path.exists() {
        warn!("No trending export at {}, skipping", path.display());
        return Vec::new();
    }
    let mut reader = match csv::Reader::from_path(path) {
        Ok(reader) => reader,
        Err(err) => {
            warn!("Unreadable trending export at {} ({err})", path.display());
            return Vec::new();
        }
    };
    let headers = match reader.headers() {
        Ok(headers) => headers.clone(),
        Err(err) => {
            warn!("Unreadable trending headers ({err})");
            return Vec::new();
        }
    };

    let ranked = ["query", "top_query"]
        .iter()
        .find_map(|name| headers.iter().position(|header| header == *name));
    if let Some(index) = ranked {
        return reader
            .records()
            .filter_map(Result::ok)
            .filter_map(|record| record.get(index).map(|cell| cell.trim().to_string()))
            .filter(|topic| !topic.is_empty())
            .take(TREND_LIMIT)
            .collect();
    }

    if let Some(index) = headers.iter().position(|header| header == "keyword_searched") {
        let mut seen = HashSet::new();
        let mut topics = Vec::new();
        for record in reader.records().filter_map(Result::ok) {
            let Some(topic) = record.get(index).map(str::trim) else {
                continue;
            };
            if !topic.is_empty() && seen.insert(topic.to_string()) {
                topics.push(topic.to_string());
            }
        }
        return topics;
    }

    warn!("Trending export has no recognized query column, skipping");
    Vec::new()
}

// ────────────────────────────────────────────────────────────────────────────
// Persistence
// ────────────────────────────────────────────────────────────────────────────

/// Writes the snapshot as pretty JSON, creating parent directories as
/// needed.
pub fn write_snapshot(path: &Path, document: &SnapshotDocument) -> Result<(), EngineError> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(document)?;
    fs::write(path, json)?;
    info!("Snapshot written to {}", path.display());
    Ok(())
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
