//! Generation stages — single-shot model calls with per-stage degradation.
//!
//! draft: fatal on failure or an empty response.
//! critique: falls back to a neutral score on model or parse failure.
//! optimize: returns the draft unchanged on failure.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::corpus::Platform;
use crate::errors::EngineError;
use crate::generation::prompts::{
    CRITIQUE_PROMPT_TEMPLATE, DRAFT_PROMPT_TEMPLATE, OPTIMIZE_PROMPT_TEMPLATE,
    STYLE_EXAMPLES_HEADER,
};
use crate::model_client::ModelApi;

const SCORE_MIN: f64 = 1.0;
const SCORE_MAX: f64 = 10.0;
/// Neutral sub-score used when the critique stage cannot produce a verdict.
const FALLBACK_SCORE: f64 = 5.0;
/// Substitute critique for responses that carry scores but no critique
/// sentence. The optimize prompt quotes the critique, so it must never be
/// empty.
const MISSING_CRITIQUE_TEXT: &str =
    "No specific critique returned; tighten the hook and add concrete value.";

// ────────────────────────────────────────────────────────────────────────────
// Data models
// ────────────────────────────────────────────────────────────────────────────

/// Critique verdict for one draft.
#[derive(Debug, Clone, Serialize)]
pub struct CritiqueScore {
    pub hook_score: f64,
    pub value_score: f64,
    pub viral_score: f64,
    /// Always the arithmetic mean of the three sub-scores.
    pub average_score: f64,
    pub critique: String,
}

impl CritiqueScore {
    /// Builds a verdict from raw sub-scores, clamping each into [1, 10] and
    /// recomputing the average.
    pub fn from_subscores(hook: f64, value: f64, viral: f64, critique: String) -> Self {
        let hook_score = hook.clamp(SCORE_MIN, SCORE_MAX);
        let value_score = value.clamp(SCORE_MIN, SCORE_MAX);
        let viral_score = viral.clamp(SCORE_MIN, SCORE_MAX);
        Self {
            hook_score,
            value_score,
            viral_score,
            average_score: (hook_score + value_score + viral_score) / 3.0,
            critique,
        }
    }

    /// Neutral verdict for when critique could not run.
    pub fn fallback() -> Self {
        Self::from_subscores(
            FALLBACK_SCORE,
            FALLBACK_SCORE,
            FALLBACK_SCORE,
            "Critique unavailable; neutral score assigned.".to_string(),
        )
    }
}

/// Wire shape of the critique response. The model is asked for an
/// `average_score` too, but that field is ignored and the mean recomputed
/// from the sub-scores.
#[derive(Debug, Deserialize)]
struct RawCritique {
    hook_score: f64,
    value_score: f64,
    viral_score: f64,
    #[serde(default)]
    critique: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Stages
// ────────────────────────────────────────────────────────────────────────────

/// Drafts platform content conditioned on the retrieved style examples.
/// The only stage whose failure aborts a pipeline run.
pub async fn draft(
    model: &dyn ModelApi,
    topic: &str,
    platform: Platform,
    product_info: &str,
    style_examples: &[String],
) -> Result<String, EngineError> {
    let prompt = DRAFT_PROMPT_TEMPLATE
        .replace("{platform}", &platform.to_string())
        .replace("{topic}", topic)
        .replace("{product_info}", product_info)
        .replace(
            "{style_examples}",
            &format_style_examples(platform, style_examples),
        );

    let text = model.generate(&prompt, false).await?;

    if text.trim().is_empty() {
        return Err(EngineError::EmptyDraft);
    }

    Ok(text.trim().to_string())
}

/// Critiques a draft. Never fails: model or parse failures yield the
/// neutral fallback verdict.
pub async fn critique(model: &dyn ModelApi, draft: &str, platform: Platform) -> CritiqueScore {
    let prompt = CRITIQUE_PROMPT_TEMPLATE
        .replace("{platform}", &platform.to_string())
        .replace("{draft}", draft);

    let response = match model.generate(&prompt, true).await {
        Ok(response) => response,
        Err(e) => {
            warn!("Critique call failed ({e}); using fallback score");
            return CritiqueScore::fallback();
        }
    };

    match parse_critique(&response) {
        Some(score) => score,
        None => {
            warn!(
                "Critique response was not parseable JSON; using fallback score: {}",
                response.chars().take(120).collect::<String>()
            );
            CritiqueScore::fallback()
        }
    }
}

/// Rewrites a draft against its critique. Never fails: model failure or an
/// empty rewrite returns the draft unchanged.
pub async fn optimize(
    model: &dyn ModelApi,
    draft: &str,
    critique_text: &str,
    platform: Platform,
) -> String {
    let prompt = OPTIMIZE_PROMPT_TEMPLATE
        .replace("{platform}", &platform.to_string())
        .replace("{draft}", draft)
        .replace("{critique}", critique_text);

    match model.generate(&prompt, false).await {
        Ok(text) if !text.trim().is_empty() => text.trim().to_string(),
        Ok(_) => {
            warn!("Optimize returned empty content; keeping the original draft");
            draft.to_string()
        }
        Err(e) => {
            warn!("Optimize call failed ({e}); keeping the original draft");
            draft.to_string()
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Helpers
// ────────────────────────────────────────────────────────────────────────────

/// Formats retrieved examples as a numbered few-shot block, or an empty
/// string when there are none.
fn format_style_examples(platform: Platform, style_examples: &[String]) -> String {
    if style_examples.is_empty() {
        return String::new();
    }

    let numbered = style_examples
        .iter()
        .enumerate()
        .map(|(i, example)| format!("Example {}:\n{}", i + 1, example))
        .collect::<Vec<_>>()
        .join("\n\n");

    let header = STYLE_EXAMPLES_HEADER
        .replace("{count}", &style_examples.len().to_string())
        .replace("{platform}", &platform.to_string());

    format!("{header}{numbered}\n")
}

/// Parses the critique JSON out of a response that may be wrapped in prose
/// or markdown fences.
fn parse_critique(response: &str) -> Option<CritiqueScore> {
    let json = extract_json_object(response)?;
    let raw: RawCritique = serde_json::from_str(json).ok()?;
    let critique = if raw.critique.trim().is_empty() {
        MISSING_CRITIQUE_TEXT.to_string()
    } else {
        raw.critique
    };
    Some(CritiqueScore::from_subscores(
        raw.hook_score,
        raw.value_score,
        raw.viral_score,
        critique,
    ))
}

/// Returns the slice from the first `{` to the last `}` inclusive.
fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&text[start..=end])
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use async_trait::async_trait;

    use crate::model_client::{EmbeddingTask, ModelError};

    /// Test backend that replays scripted generate responses in call order
    /// and records every prompt it receives.
    struct ScriptedModel {
        responses: Mutex<VecDeque<Result<String, ModelError>>>,
        prompts: Mutex<Vec<String>>,
    }

    impl ScriptedModel {
        fn new(responses: Vec<Result<String, ModelError>>) -> Self {
            Self {
                responses: Mutex::new(responses.into_iter().collect()),
                prompts: Mutex::new(Vec::new()),
            }
        }

        fn recorded_prompts(&self) -> Vec<String> {
            self.prompts.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ModelApi for ScriptedModel {
        async fn generate(&self, prompt: &str, _structured: bool) -> Result<String, ModelError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Err(ModelError::EmptyContent))
        }

        async fn embed(&self, _text: &str, _task: EmbeddingTask) -> Result<Vec<f32>, ModelError> {
            Err(ModelError::EmptyContent)
        }
    }

    // ── draft ──

    #[tokio::test]
    async fn test_draft_embeds_examples_and_topic_in_prompt() {
        let model = ScriptedModel::new(vec![Ok("a fresh post".to_string())]);
        let examples = vec!["viral example one".to_string(), "viral example two".to_string()];

        let text = draft(&model, "remote work", Platform::LinkedIn, "Hookline", &examples)
            .await
            .unwrap();
        assert_eq!(text, "a fresh post");

        let prompts = model.recorded_prompts();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("remote work"));
        assert!(prompts[0].contains("LinkedIn"));
        assert!(prompts[0].contains("Example 1:\nviral example one"));
        assert!(prompts[0].contains("Example 2:\nviral example two"));
        assert!(!prompts[0].contains("{topic}"), "placeholder left unfilled");
    }

    #[tokio::test]
    async fn test_draft_without_examples_omits_example_block() {
        let model = ScriptedModel::new(vec![Ok("post".to_string())]);

        draft(&model, "topic", Platform::Twitter, "info", &[])
            .await
            .unwrap();

        let prompts = model.recorded_prompts();
        assert!(!prompts[0].contains("Example 1:"));
        assert!(!prompts[0].contains("examples of highly successful"));
    }

    #[tokio::test]
    async fn test_draft_model_failure_is_fatal() {
        let model = ScriptedModel::new(vec![Err(ModelError::RateLimited { retries: 3 })]);

        let result = draft(&model, "topic", Platform::LinkedIn, "info", &[]).await;
        assert!(matches!(result, Err(EngineError::Model(_))));
    }

    #[tokio::test]
    async fn test_draft_whitespace_response_is_empty_draft() {
        let model = ScriptedModel::new(vec![Ok("  \n\t ".to_string())]);

        let result = draft(&model, "topic", Platform::LinkedIn, "info", &[]).await;
        assert!(matches!(result, Err(EngineError::EmptyDraft)));
    }

    // ── critique ──

    #[tokio::test]
    async fn test_critique_parses_clean_json() {
        let model = ScriptedModel::new(vec![Ok(r#"{
            "hook_score": 7,
            "value_score": 8,
            "viral_score": 6,
            "average_score": 7.0,
            "critique": "Hook is flat."
        }"#
        .to_string())]);

        let score = critique(&model, "draft", Platform::LinkedIn).await;
        assert_eq!(score.hook_score, 7.0);
        assert_eq!(score.value_score, 8.0);
        assert_eq!(score.viral_score, 6.0);
        assert_eq!(score.average_score, 7.0);
        assert_eq!(score.critique, "Hook is flat.");
    }

    #[tokio::test]
    async fn test_critique_parses_fenced_json() {
        let model = ScriptedModel::new(vec![Ok(
            "```json\n{\"hook_score\": 9, \"value_score\": 9, \"viral_score\": 9, \"critique\": \"Ship it.\"}\n```"
                .to_string(),
        )]);

        let score = critique(&model, "draft", Platform::YouTube).await;
        assert_eq!(score.average_score, 9.0);
    }

    #[tokio::test]
    async fn test_critique_ignores_model_average() {
        let model = ScriptedModel::new(vec![Ok(r#"{
            "hook_score": 2,
            "value_score": 2,
            "viral_score": 2,
            "average_score": 9.9,
            "critique": "Weak."
        }"#
        .to_string())]);

        let score = critique(&model, "draft", Platform::LinkedIn).await;
        assert_eq!(
            score.average_score, 2.0,
            "the model's own average must be discarded"
        );
    }

    #[tokio::test]
    async fn test_critique_clamps_out_of_range_subscores() {
        let model = ScriptedModel::new(vec![Ok(r#"{
            "hook_score": 15,
            "value_score": 0,
            "viral_score": -3,
            "critique": "Confused scoring."
        }"#
        .to_string())]);

        let score = critique(&model, "draft", Platform::LinkedIn).await;
        assert_eq!(score.hook_score, 10.0);
        assert_eq!(score.value_score, 1.0);
        assert_eq!(score.viral_score, 1.0);
        assert_eq!(score.average_score, 4.0);
    }

    #[tokio::test]
    async fn test_critique_model_failure_falls_back() {
        let model = ScriptedModel::new(vec![Err(ModelError::EmptyContent)]);

        let score = critique(&model, "draft", Platform::LinkedIn).await;
        assert_eq!(score.average_score, 5.0);
        assert!(!score.critique.is_empty());
    }

    #[tokio::test]
    async fn test_critique_unparseable_response_falls_back() {
        let model = ScriptedModel::new(vec![Ok("I would rate this post quite highly".to_string())]);

        let score = critique(&model, "draft", Platform::LinkedIn).await;
        assert_eq!(score.average_score, 5.0);
    }

    #[tokio::test]
    async fn test_critique_missing_subscore_falls_back() {
        let model = ScriptedModel::new(vec![Ok(
            r#"{"hook_score": 8, "critique": "partial"}"#.to_string()
        )]);

        let score = critique(&model, "draft", Platform::LinkedIn).await;
        assert_eq!(score.average_score, 5.0);
    }

    #[tokio::test]
    async fn test_critique_missing_notes_get_substitute_text() {
        let model = ScriptedModel::new(vec![Ok(
            r#"{"hook_score": 6, "value_score": 6, "viral_score": 6}"#.to_string(),
        )]);

        let score = critique(&model, "draft", Platform::LinkedIn).await;
        assert_eq!(score.average_score, 6.0, "real sub-scores must survive");
        assert_eq!(score.critique, MISSING_CRITIQUE_TEXT);
    }

    #[tokio::test]
    async fn test_critique_blank_notes_get_substitute_text() {
        let model = ScriptedModel::new(vec![Ok(
            r#"{"hook_score": 4, "value_score": 4, "viral_score": 4, "critique": "   "}"#
                .to_string(),
        )]);

        let score = critique(&model, "draft", Platform::LinkedIn).await;
        assert_eq!(score.average_score, 4.0);
        assert_eq!(
            score.critique, MISSING_CRITIQUE_TEXT,
            "whitespace-only notes must be replaced"
        );
    }

    // ── optimize ──

    #[tokio::test]
    async fn test_optimize_returns_rewrite() {
        let model = ScriptedModel::new(vec![Ok("  punchier post  ".to_string())]);

        let text = optimize(&model, "original", "hook is weak", Platform::LinkedIn).await;
        assert_eq!(text, "punchier post");

        let prompts = model.recorded_prompts();
        assert!(prompts[0].contains("original"));
        assert!(prompts[0].contains("hook is weak"));
    }

    #[tokio::test]
    async fn test_optimize_failure_returns_draft_unchanged() {
        let model = ScriptedModel::new(vec![Err(ModelError::EmptyContent)]);

        let text = optimize(&model, "original draft", "feedback", Platform::YouTube).await;
        assert_eq!(text, "original draft");
    }

    #[tokio::test]
    async fn test_optimize_empty_response_returns_draft_unchanged() {
        let model = ScriptedModel::new(vec![Ok("   ".to_string())]);

        let text = optimize(&model, "original draft", "feedback", Platform::YouTube).await;
        assert_eq!(text, "original draft");
    }

    // ── scores and parsing helpers ──

    #[test]
    fn test_fallback_average_is_mean_of_subscores() {
        let score = CritiqueScore::fallback();
        let mean = (score.hook_score + score.value_score + score.viral_score) / 3.0;
        assert!((score.average_score - mean).abs() < 1e-12);
        assert_eq!(score.average_score, 5.0);
    }

    #[test]
    fn test_from_subscores_average_is_mean() {
        let score = CritiqueScore::from_subscores(6.0, 7.0, 9.5, String::new());
        let mean = (6.0 + 7.0 + 9.5) / 3.0;
        assert!((score.average_score - mean).abs() < 1e-12);
    }

    #[test]
    fn test_extract_json_object_from_prose() {
        let text = "Sure! Here is the verdict: {\"hook_score\": 1} Hope that helps.";
        assert_eq!(extract_json_object(text), Some("{\"hook_score\": 1}"));
    }

    #[test]
    fn test_extract_json_object_none_without_braces() {
        assert_eq!(extract_json_object("no json here"), None);
        assert_eq!(extract_json_object("} reversed {"), None);
    }
}
