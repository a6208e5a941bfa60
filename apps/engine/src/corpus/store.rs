//! Example Store — read-only snapshot of curated examples, loaded once at
//! startup.
//!
//! A missing snapshot file is a valid degraded state (empty store). A file
//! that exists but cannot be parsed, or whose semantic buckets carry empty
//! or inconsistent embeddings, is an error.

use std::collections::HashMap;
use std::path::Path;

use tracing::{info, warn};

use crate::corpus::{Bucket, Platform, SnapshotDocument};
use crate::errors::EngineError;

/// Read-only handle over the curated snapshot. Cheap to share via `Arc`;
/// there is no mutation API.
#[derive(Debug, Clone, Default)]
pub struct ExampleStore {
    platforms: HashMap<Platform, Bucket>,
    trending_topics: Vec<String>,
}

impl ExampleStore {
    /// Loads the snapshot at `path`. Loading the same unchanged file twice
    /// yields the same store.
    pub fn load(path: &Path) -> Result<Self, EngineError> {
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!(
                    "Snapshot {} not found; starting with an empty example store",
                    path.display()
                );
                return Ok(Self::default());
            }
            Err(e) => return Err(EngineError::Io(e)),
        };

        let document: SnapshotDocument = serde_json::from_str(&raw)?;
        Self::from_document(document)
    }

    /// Builds a store from an in-memory document, validating every semantic
    /// bucket.
    pub fn from_document(document: SnapshotDocument) -> Result<Self, EngineError> {
        for (platform, bucket) in &document.platforms {
            validate_bucket(*platform, bucket)?;
        }

        let total: usize = document.platforms.values().map(Bucket::len).sum();
        info!(
            "Example store loaded: {} examples across {} platforms, {} trending topics",
            total,
            document.platforms.len(),
            document.trending_topics.len()
        );

        Ok(Self {
            platforms: document.platforms,
            trending_topics: document.trending_topics,
        })
    }

    /// The bucket for `platform`, if the snapshot carried one.
    pub fn bucket(&self, platform: Platform) -> Option<&Bucket> {
        self.platforms.get(&platform)
    }

    /// Number of examples available for `platform`.
    pub fn example_count(&self, platform: Platform) -> usize {
        self.bucket(platform).map_or(0, Bucket::len)
    }

    pub fn trending_topics(&self) -> &[String] {
        &self.trending_topics
    }

    /// True when no platform has any examples.
    pub fn is_empty(&self) -> bool {
        self.platforms.values().all(Bucket::is_empty)
    }
}

/// A semantic bucket must carry a non-empty embedding of one consistent
/// dimension per example.
fn validate_bucket(platform: Platform, bucket: &Bucket) -> Result<(), EngineError> {
    let Bucket::Semantic(examples) = bucket else {
        return Ok(());
    };

    let mut expected_dim: Option<usize> = None;
    for (index, example) in examples.iter().enumerate() {
        if example.embedding.is_empty() {
            return Err(EngineError::CorruptSnapshot(format!(
                "{platform} example {index} has an empty embedding"
            )));
        }
        match expected_dim {
            None => expected_dim = Some(example.embedding.len()),
            Some(dim) if dim != example.embedding.len() => {
                return Err(EngineError::CorruptSnapshot(format!(
                    "{platform} example {index} has embedding dimension {} (expected {dim})",
                    example.embedding.len()
                )));
            }
            Some(_) => {}
        }
    }

    Ok(())
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
