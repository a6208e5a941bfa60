//! Corpus types shared by the example store, the retriever, and the curator.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub mod store;

pub use store::ExampleStore;

/// Target platform for generated content. Serializes to the lowercase keys
/// used in the snapshot document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    LinkedIn,
    YouTube,
    Twitter,
}

impl Platform {
    pub const ALL: [Platform; 3] = [Platform::LinkedIn, Platform::YouTube, Platform::Twitter];
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Platform::LinkedIn => "LinkedIn",
            Platform::YouTube => "YouTube",
            Platform::Twitter => "Twitter",
        };
        write!(f, "{name}")
    }
}

impl FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "linkedin" => Ok(Platform::LinkedIn),
            "youtube" => Ok(Platform::YouTube),
            "twitter" => Ok(Platform::Twitter),
            other => Err(format!("Unknown platform '{other}'")),
        }
    }
}

/// One curated example carrying its precomputed document embedding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddedExample {
    pub text: String,
    pub embedding: Vec<f32>,
}

/// A per-platform example bucket. The retrieval mode is fixed when the
/// bucket is written, never inferred from its contents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", content = "examples", rename_all = "lowercase")]
pub enum Bucket {
    /// Examples with embeddings; retrieval ranks by cosine similarity.
    Semantic(Vec<EmbeddedExample>),
    /// Bare texts; retrieval samples uniformly.
    Plain(Vec<String>),
}

impl Bucket {
    pub fn len(&self) -> usize {
        match self {
            Bucket::Semantic(examples) => examples.len(),
            Bucket::Plain(examples) => examples.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// The snapshot file: written by the curator, loaded by [`ExampleStore`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SnapshotDocument {
    #[serde(default)]
    pub platforms: HashMap<Platform, Bucket>,
    #[serde(default)]
    pub trending_topics: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_platform_parses_case_insensitively() {
        assert_eq!("LinkedIn".parse::<Platform>().unwrap(), Platform::LinkedIn);
        assert_eq!("YOUTUBE".parse::<Platform>().unwrap(), Platform::YouTube);
        assert_eq!(" twitter ".parse::<Platform>().unwrap(), Platform::Twitter);
        assert!("myspace".parse::<Platform>().is_err());
    }

    #[test]
    fn test_platform_serializes_to_lowercase_key() {
        assert_eq!(
            serde_json::to_string(&Platform::LinkedIn).unwrap(),
            "\"linkedin\""
        );
    }

    #[test]
    fn test_bucket_mode_tag_is_explicit() {
        let semantic = Bucket::Semantic(vec![EmbeddedExample {
            text: "a post".to_string(),
            embedding: vec![0.1, 0.2],
        }]);
        let json = serde_json::to_string(&semantic).unwrap();
        assert!(json.contains("\"mode\":\"semantic\""));

        let plain = Bucket::Plain(vec!["a post".to_string()]);
        let json = serde_json::to_string(&plain).unwrap();
        assert!(json.contains("\"mode\":\"plain\""));
    }

    #[test]
    fn test_bucket_without_mode_tag_is_rejected() {
        // Bare example arrays (no mode tag) are not a recognized layout.
        let raw = r#"{"examples": [{"text": "a", "embedding": [0.1]}]}"#;
        assert!(serde_json::from_str::<Bucket>(raw).is_err());
    }

    #[test]
    fn test_snapshot_document_defaults_missing_sections() {
        let document: SnapshotDocument = serde_json::from_str("{}").unwrap();
        assert!(document.platforms.is_empty());
        assert!(document.trending_topics.is_empty());
    }

    #[test]
    fn test_snapshot_document_roundtrip() {
        let mut platforms = HashMap::new();
        platforms.insert(
            Platform::Twitter,
            Bucket::Plain(vec!["short and sharp".to_string()]),
        );
        let document = SnapshotDocument {
            platforms,
            trending_topics: vec!["ai agents".to_string()],
        };

        let json = serde_json::to_string_pretty(&document).unwrap();
        let recovered: SnapshotDocument = serde_json::from_str(&json).unwrap();
        assert_eq!(recovered, document);
    }
}
