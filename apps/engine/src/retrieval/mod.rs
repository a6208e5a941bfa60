//! Similarity Retriever — selects style examples for a platform and topic.
//!
//! Flow: bucket lookup → (semantic: embed query, rank by cosine) or
//!       (plain: uniform sample) → top-k texts.
//!
//! Retrieval never fails: a missing bucket yields no examples and an
//! embedding failure degrades to random sampling.

use rand::seq::SliceRandom;
use rand::thread_rng;
use tracing::{debug, warn};

use crate::corpus::{Bucket, ExampleStore, Platform};
use crate::model_client::{EmbeddingTask, ModelApi};

pub mod similarity;

use similarity::rank_by_similarity;

/// Retrieves up to `k` style examples for the request, most relevant first.
///
/// Semantic buckets are ranked against an embedding of the topic and product
/// info; plain buckets (and any embedding failure) fall back to uniform
/// sampling without replacement. Length is min(k, bucket size).
pub async fn retrieve_style_examples(
    store: &ExampleStore,
    model: &dyn ModelApi,
    platform: Platform,
    topic: &str,
    product_info: &str,
    k: usize,
) -> Vec<String> {
    let Some(bucket) = store.bucket(platform) else {
        debug!("No example bucket for {platform}; proceeding without style guidance");
        return Vec::new();
    };

    if bucket.is_empty() || k == 0 {
        return Vec::new();
    }

    match bucket {
        Bucket::Semantic(examples) => {
            let query = format!("{topic} {product_info}");
            match model.embed(&query, EmbeddingTask::RetrievalQuery).await {
                Ok(query_embedding) => {
                    let ranked = rank_by_similarity(examples, &query_embedding);
                    if let Some((_, best)) = ranked.first() {
                        debug!("Top {platform} example similarity: {best:.3}");
                    }
                    ranked
                        .into_iter()
                        .take(k)
                        .map(|(index, _)| examples[index].text.clone())
                        .collect()
                }
                Err(e) => {
                    warn!("Query embedding failed ({e}); sampling {platform} examples instead");
                    sample_texts(examples.iter().map(|example| example.text.as_str()), k)
                }
            }
        }
        Bucket::Plain(examples) => sample_texts(examples.iter().map(String::as_str), k),
    }
}

/// Uniform sample of up to `k` texts without replacement.
fn sample_texts<'a>(texts: impl Iterator<Item = &'a str>, k: usize) -> Vec<String> {
    let texts: Vec<&str> = texts.collect();
    let mut rng = thread_rng();
    texts
        .choose_multiple(&mut rng, k.min(texts.len()))
        .map(|text| text.to_string())
        .collect()
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
