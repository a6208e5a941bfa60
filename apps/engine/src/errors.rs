use thiserror::Error;

use crate::model_client::ModelError;

/// Application-level error type.
///
/// Most degradations (critique parse failures, embedding failures, missing
/// exports) are absorbed where they happen and logged; only conditions the
/// pipeline cannot continue past surface here.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    #[error("Model returned an empty draft")]
    EmptyDraft,

    #[error("Corrupt snapshot: {0}")]
    CorruptSnapshot(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}
