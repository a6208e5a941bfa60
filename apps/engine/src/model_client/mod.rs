//! Model client — the single point of entry for all Gemini API calls in
//! Hookline.
//!
//! ARCHITECTURAL RULE: No other module may call the Gemini API directly.
//! The pipeline, the retriever, and the curator all depend on [`ModelApi`],
//! so tests and alternative backends can swap the transport out.

use async_trait::async_trait;
use thiserror::Error;

mod gemini;

pub use gemini::{GeminiClient, EMBEDDING_MODEL, GENERATION_MODEL};

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Rate limited after {retries} retries")]
    RateLimited { retries: u32 },

    #[error("Model returned empty content")]
    EmptyContent,
}

/// Embedding task type forwarded to the embedding endpoint.
/// Queries and corpus documents are embedded asymmetrically.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbeddingTask {
    RetrievalQuery,
    RetrievalDocument,
}

impl EmbeddingTask {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            EmbeddingTask::RetrievalQuery => "RETRIEVAL_QUERY",
            EmbeddingTask::RetrievalDocument => "RETRIEVAL_DOCUMENT",
        }
    }
}

/// The two model capabilities the engine depends on.
///
/// Carried as `Arc<dyn ModelApi>` so callers stay independent of the
/// concrete backend.
#[async_trait]
pub trait ModelApi: Send + Sync {
    /// Generates text from a prompt. `structured` asks the backend for a
    /// JSON-typed response body.
    async fn generate(&self, prompt: &str, structured: bool) -> Result<String, ModelError>;

    /// Embeds `text` into a dense vector for the given task.
    async fn embed(&self, text: &str, task: EmbeddingTask) -> Result<Vec<f32>, ModelError>;
}
