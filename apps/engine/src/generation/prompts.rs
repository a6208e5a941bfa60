// All model prompt constants for the generation stages. Gemini takes a
// single prompt string per call, so each template carries its own role
// preamble. Placeholders are filled with `.replace()` before sending.

/// Draft prompt template.
/// Replace: {platform}, {topic}, {product_info}, {style_examples}
pub const DRAFT_PROMPT_TEMPLATE: &str = r#"You are an expert content marketing writer specialized in {platform}.

Task: Write a high-engagement {platform} post.
Topic/Angle: {topic}
Product Info: {product_info}
{style_examples}
Instructions:
1. Study the style examples (tone, structure, hooks, emoji usage) and write a NEW post that mimics what made them perform
2. The first line MUST be a powerful hook — it decides whether anyone reads on
3. Deliver concrete value; no filler, no generic advice
4. Mention the product naturally — never as an ad
5. Return ONLY the post text — no preamble, no commentary"#;

/// Critique prompt template — enforces a JSON verdict.
/// Replace: {platform}, {draft}
pub const CRITIQUE_PROMPT_TEMPLATE: &str = r#"Act as a strict editor-in-chief. Critique the following {platform} post draft.

Draft:
{draft}

Return a JSON object with this EXACT schema (no extra fields):
{
  "hook_score": 7,
  "value_score": 8,
  "viral_score": 6,
  "average_score": 7.0,
  "critique": "One sentence on the single biggest weakness."
}

Scoring (1-10 each):
- hook_score: does the first line stop the scroll?
- value_score: does the reader walk away with something useful?
- viral_score: would people share or reply to this?"#;

/// Optimization prompt template.
/// Replace: {platform}, {draft}, {critique}
pub const OPTIMIZE_PROMPT_TEMPLATE: &str = r#"You are an expert copywriter. Improve this {platform} draft based on the editor's feedback.

Original Draft:
{draft}

Editor's Feedback: "{critique}"

Task: Rewrite the post to address the feedback and maximize engagement. Keep the original core message but make it punchier. Return ONLY the rewritten post text — no preamble, no commentary."#;

/// Header for the style-example block injected into the draft prompt.
/// Replace: {count}, {platform}
pub const STYLE_EXAMPLES_HEADER: &str =
    "\nHere are {count} examples of highly successful {platform} content to mimic:\n";
