use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use engine::config::Config;
use engine::corpus::{ExampleStore, Platform};
use engine::generation::pipeline::{ContentEngine, GenerationRequest, PipelineResult};
use engine::model_client::{GeminiClient, ModelApi, GENERATION_MODEL};

/// Topic used when neither `TOPIC` nor the snapshot's trending list has one.
const DEFAULT_TOPIC: &str = "Remote Work Trends";
/// Product blurb injected into every prompt unless `PRODUCT_INFO` is set.
const DEFAULT_PRODUCT_INFO: &str =
    "Hookline, an AI tool that predicts marketing trends and auto-generates platform-native content.";

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails fast on a missing API key)
    let config = Config::from_env()?;

    // Initialize structured logging. Logs go to stderr: stdout carries the
    // final JSON results, so it must stay pipeable.
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!("Starting Hookline engine v{}", env!("CARGO_PKG_VERSION"));

    // Load the curated snapshot (a missing snapshot is a valid degraded start)
    let store = Arc::new(ExampleStore::load(&config.snapshot_path())?);

    // Initialize the model client
    let model: Arc<dyn ModelApi> = Arc::new(GeminiClient::new(config.gemini_api_key.clone()));
    info!("Gemini client initialized (model: {GENERATION_MODEL})");

    let engine = ContentEngine::new(model, store.clone());

    // Run parameters: env overrides, then the snapshot's top trending topic,
    // then the built-in defaults
    let topic = std::env::var("TOPIC").unwrap_or_else(|_| {
        store
            .trending_topics()
            .first()
            .cloned()
            .unwrap_or_else(|| DEFAULT_TOPIC.to_string())
    });
    let product_info =
        std::env::var("PRODUCT_INFO").unwrap_or_else(|_| DEFAULT_PRODUCT_INFO.to_string());
    let platforms = parse_platforms(
        &std::env::var("PLATFORMS").unwrap_or_else(|_| "linkedin,youtube".to_string()),
    )?;
    let variations: u32 = std::env::var("VARIATIONS")
        .unwrap_or_else(|_| "3".to_string())
        .parse()
        .context("VARIATIONS must be a number")?;

    info!(
        "Generating {variations} variation(s) per platform for '{topic}' across {:?}",
        platforms
    );

    let mut results: Vec<PipelineResult> = Vec::new();
    for platform in &platforms {
        for variation in 1..=variations {
            let request = GenerationRequest {
                topic: topic.clone(),
                platform: *platform,
                product_info: product_info.clone(),
            };
            match engine.run_pipeline(&request).await {
                Ok(result) => {
                    info!(
                        "{platform} variation {variation}/{variations}: {:.1}/10 ({:?})",
                        result.quality_score, result.status
                    );
                    results.push(result);
                }
                Err(e) => {
                    error!("{platform} variation {variation}/{variations} failed: {e}");
                }
            }
        }
    }

    info!(
        "Generated {} of {} requested pieces",
        results.len(),
        platforms.len() as u32 * variations
    );

    println!("{}", serde_json::to_string_pretty(&results)?);

    Ok(())
}

/// Parses a comma-separated platform list, e.g. `linkedin,youtube`.
fn parse_platforms(raw: &str) -> Result<Vec<Platform>> {
    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| part.parse::<Platform>().map_err(|e| anyhow!(e)))
        .collect()
}
