//! Pipeline orchestrator — drives one request through the content stages.
//!
//! Flow: retrieve style examples → draft → critique → accept, or
//!       optimize → re-critique → assemble PipelineResult.
//!
//! Stage transitions are the fixed table in [`advance`]. The quality gate
//! is [`ACCEPT_THRESHOLD`]; it is a policy constant, not per-request
//! configuration.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::corpus::{ExampleStore, Platform};
use crate::errors::EngineError;
use crate::generation::stages::{self, CritiqueScore};
use crate::model_client::ModelApi;
use crate::retrieval::retrieve_style_examples;

/// Minimum average critique score for a draft to ship unmodified.
pub const ACCEPT_THRESHOLD: f64 = 8.5;
/// Style examples requested per draft.
const STYLE_EXAMPLE_COUNT: usize = 3;
/// Optimization passes per run unless overridden at construction.
const DEFAULT_OPTIMIZE_ROUNDS: u32 = 1;

// ────────────────────────────────────────────────────────────────────────────
// Data models
// ────────────────────────────────────────────────────────────────────────────

/// One content generation request.
#[derive(Debug, Clone, Deserialize)]
pub struct GenerationRequest {
    pub topic: String,
    pub platform: Platform,
    pub product_info: String,
}

/// How the final content earned its place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultStatus {
    /// The first draft met the quality gate unchanged.
    DraftAccepted,
    /// At least one optimization pass ran.
    Optimized,
}

/// Immutable record of one pipeline run. A regeneration produces a new
/// result, never an update to an old one.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineResult {
    pub platform: Platform,
    pub topic: String,
    pub final_content: String,
    pub original_draft: String,
    pub quality_score: f64,
    pub critique_notes: String,
    pub status: ResultStatus,
    pub timestamp: DateTime<Utc>,
}

// ────────────────────────────────────────────────────────────────────────────
// State machine
// ────────────────────────────────────────────────────────────────────────────

/// Pipeline stages. `Done` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Drafting,
    Critiquing,
    Accepted,
    Optimizing,
    ReCritiquing,
    Done,
}

/// The fixed transition table.
///
/// `accepted` is the current score's verdict against the gate;
/// `rounds_remaining` counts optimization passes still allowed.
pub fn advance(stage: Stage, accepted: bool, rounds_remaining: u32) -> Stage {
    match stage {
        Stage::Drafting => Stage::Critiquing,
        Stage::Critiquing => {
            if accepted {
                Stage::Accepted
            } else if rounds_remaining > 0 {
                Stage::Optimizing
            } else {
                Stage::Done
            }
        }
        Stage::Accepted => Stage::Done,
        Stage::Optimizing => Stage::ReCritiquing,
        Stage::ReCritiquing => {
            if !accepted && rounds_remaining > 0 {
                Stage::Optimizing
            } else {
                Stage::Done
            }
        }
        Stage::Done => Stage::Done,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Engine
// ────────────────────────────────────────────────────────────────────────────

/// The content engine. Cheap to clone; safe to share across concurrent
/// pipeline runs (the store is read-only and each run owns its state).
#[derive(Clone)]
pub struct ContentEngine {
    model: Arc<dyn ModelApi>,
    store: Arc<ExampleStore>,
    optimize_rounds: u32,
}

impl ContentEngine {
    pub fn new(model: Arc<dyn ModelApi>, store: Arc<ExampleStore>) -> Self {
        Self {
            model,
            store,
            optimize_rounds: DEFAULT_OPTIMIZE_ROUNDS,
        }
    }

    /// Overrides how many optimization passes a single run may spend.
    pub fn with_optimize_rounds(mut self, rounds: u32) -> Self {
        self.optimize_rounds = rounds;
        self
    }

    /// Runs one request through the full pipeline.
    ///
    /// Steps:
    /// 1. Retrieve up to 3 style examples for the platform
    /// 2. Draft (the only step whose failure fails the run)
    /// 3. Critique the draft
    /// 4. Below the gate: optimize, then re-critique; the re-score replaces
    ///    the original
    /// 5. Assemble the immutable result
    pub async fn run_pipeline(
        &self,
        request: &GenerationRequest,
    ) -> Result<PipelineResult, EngineError> {
        info!("Pipeline start: {} / '{}'", request.platform, request.topic);

        // Step 1: style retrieval
        let style_examples = retrieve_style_examples(
            &self.store,
            &*self.model,
            request.platform,
            &request.topic,
            &request.product_info,
            STYLE_EXAMPLE_COUNT,
        )
        .await;
        info!("Retrieved {} style examples", style_examples.len());

        // Step 2: draft
        let original_draft = stages::draft(
            &*self.model,
            &request.topic,
            request.platform,
            &request.product_info,
            &style_examples,
        )
        .await?;

        // Steps 3-4: critique loop driven by the transition table
        let mut rounds_remaining = self.optimize_rounds;
        let mut stage = advance(Stage::Drafting, false, rounds_remaining);
        let mut content = original_draft.clone();
        let mut score = CritiqueScore::fallback();
        let mut optimized = false;

        while stage != Stage::Done {
            stage = match stage {
                Stage::Critiquing | Stage::ReCritiquing => {
                    score = stages::critique(&*self.model, &content, request.platform).await;
                    let accepted = score.average_score >= ACCEPT_THRESHOLD;
                    info!(
                        "Critique: {:.1}/10 ({}) - {}",
                        score.average_score,
                        if accepted { "accepted" } else { "below gate" },
                        score.critique
                    );
                    advance(stage, accepted, rounds_remaining)
                }
                Stage::Optimizing => {
                    info!("Optimizing draft ({rounds_remaining} round(s) remaining)");
                    content =
                        stages::optimize(&*self.model, &content, &score.critique, request.platform)
                            .await;
                    optimized = true;
                    rounds_remaining -= 1;
                    advance(stage, false, rounds_remaining)
                }
                Stage::Accepted => advance(stage, true, rounds_remaining),
                Stage::Drafting => advance(stage, false, rounds_remaining),
                Stage::Done => Stage::Done,
            };
        }

        let status = if optimized {
            ResultStatus::Optimized
        } else {
            ResultStatus::DraftAccepted
        };

        info!(
            "Pipeline done: {} scored {:.1}/10 ({:?})",
            request.platform, score.average_score, status
        );

        Ok(PipelineResult {
            platform: request.platform,
            topic: request.topic.clone(),
            final_content: content,
            original_draft,
            quality_score: score.average_score,
            critique_notes: score.critique,
            status,
            timestamp: Utc::now(),
        })
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
