// Content generation: style-conditioned drafting, structured critique,
// feedback-driven optimization, and the quality-gated pipeline that runs them.
// All model calls go through model_client — no direct API calls here.

pub mod pipeline;
pub mod prompts;
pub mod stages;
