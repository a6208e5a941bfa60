//! CSV row shapes and engagement scoring per platform.
//!
//! Export files come from third-party scrapers, so numeric cells arrive
//! as strings with commas, blanks, or junk like "N/A". Every numeric
//! field parses leniently: unparseable values score 0 instead of
//! rejecting the row.

use serde::{Deserialize, Deserializer};

/// Selection floor: every platform keeps at least this many rows.
const TOP_FLOOR: usize = 10;
/// Fraction of rows kept above the floor.
const TOP_FRACTION: f64 = 0.1;

/// Deserializes a numeric CSV cell, tolerating thousands separators and
/// garbage. CSV cells always arrive as strings. Non-finite parses (a literal
/// `NaN` or `inf` cell) count as garbage too: every score must stay finite
/// so the engagement sort comparator is total.
fn lenient_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    Ok(raw
        .trim()
        .replace(',', "")
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .unwrap_or(0.0))
}

/// One row of a LinkedIn post export.
#[derive(Debug, Deserialize)]
pub struct LinkedInPostRecord {
    pub post_text: String,
    #[serde(deserialize_with = "lenient_f64")]
    pub total_engagement: f64,
}

/// One row of a YouTube video export.
#[derive(Debug, Deserialize)]
pub struct YouTubeVideoRecord {
    pub title: String,
    pub description: String,
    #[serde(deserialize_with = "lenient_f64")]
    pub view_count: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub like_count: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub comment_count: f64,
}

/// One row of a tweet export. Retweets are optional; some exports
/// only carry favorites.
#[derive(Debug, Deserialize)]
pub struct TweetRecord {
    pub text: String,
    #[serde(alias = "likes", deserialize_with = "lenient_f64")]
    pub favorite_count: f64,
    #[serde(default, alias = "retweets", deserialize_with = "lenient_f64")]
    pub retweet_count: f64,
}

// ────────────────────────────────────────────────────────────────────────────
// Scoring
// ────────────────────────────────────────────────────────────────────────────

/// LinkedIn exports pre-aggregate reactions, comments, and shares.
pub fn linkedin_engagement(record: &LinkedInPostRecord) -> f64 {
    record.total_engagement
}

/// Views are cheap; likes and especially comments signal content that
/// made people act.
pub fn youtube_engagement(record: &YouTubeVideoRecord) -> f64 {
    0.1 * record.view_count + 10.0 * record.like_count + 20.0 * record.comment_count
}

/// A retweet is an endorsement in front of the retweeter's audience,
/// so it counts double.
pub fn tweet_engagement(record: &TweetRecord) -> f64 {
    record.favorite_count + 2.0 * record.retweet_count
}

/// How many of `n` ranked rows survive selection: the top 10%, but
/// never fewer than [`TOP_FLOOR`].
pub fn top_quota(n: usize) -> usize {
    TOP_FLOOR.max((n as f64 * TOP_FRACTION).ceil() as usize)
}
