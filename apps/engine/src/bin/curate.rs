use anyhow::Result;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use engine::config::Config;
use engine::curator::{self, CurationPaths};
use engine::model_client::{GeminiClient, EMBEDDING_MODEL};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails fast on a missing API key)
    let config = Config::from_env()?;

    // Initialize structured logging. This binary compiles as its own
    // crate, so the filter names both the library target and `curate`.
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{lib}={level},curate={level}",
                lib = env!("CARGO_PKG_NAME"),
                level = &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Hookline curator v{}", env!("CARGO_PKG_VERSION"));

    let model = GeminiClient::new(config.gemini_api_key.clone());
    info!("Gemini client initialized (embeddings: {EMBEDDING_MODEL})");

    let paths = CurationPaths::from_data_dir(&config.data_dir);
    let outcome = curator::curate(&model, &paths).await;

    let snapshot_path = config.snapshot_path();
    curator::write_snapshot(&snapshot_path, &outcome.document)?;

    for report in &outcome.reports {
        info!(
            "{}: curated {} examples ({} embed failures)",
            report.platform, report.curated, report.embed_failures
        );
    }
    info!(
        "Snapshot complete: {} trending topics, written to {}",
        outcome.document.trending_topics.len(),
        snapshot_path.display()
    );

    Ok(())
}
