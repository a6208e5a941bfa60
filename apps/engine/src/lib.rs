//! Hookline — retrieval-augmented marketing content engine.
//!
//! Flow: curator (offline batch) → snapshot → ExampleStore → style retrieval →
//!       draft → critique → (optimize → re-critique) → PipelineResult.
//!
//! All model calls go through `model_client` — no other module talks to the
//! Gemini API directly.

pub mod config;
pub mod corpus;
pub mod curator;
pub mod errors;
pub mod generation;
pub mod model_client;
pub mod retrieval;
