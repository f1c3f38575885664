//! Prompt template for candidate re-ranking via chat completions

/// System prompt for product-relevance scoring via an LLM.
///
/// Instructs the model to output `N: score` lines for each numbered
/// candidate.
pub const SYSTEM_PROMPT: &str = "\
You are a product recommendation scorer. Given a source product and numbered \
candidate products, score how well each candidate fits as a recommendation \
for the source product, from 0 to 10.

Output format (one per line, no other text):
1: <score>
2: <score>
...

Rules:
- Score 0 = a poor recommendation, 10 = an excellent recommendation
- Output ONLY numbered score lines
- Score every candidate listed";

/// Build the messages array for a reranking chat completions request.
///
/// The user message contains the source product and numbered candidate
/// summaries.
pub fn build_rerank_messages(subject: &str, summaries: &[(usize, &str)]) -> serde_json::Value {
    let mut user_content = format!("Source product: {}\n\nCandidates:", subject);
    for (i, (_orig_idx, text)) in summaries.iter().enumerate() {
        user_content.push_str(&format!("\n{}. {}", i + 1, text));
    }

    serde_json::json!([
        {"role": "system", "content": SYSTEM_PROMPT},
        {"role": "user", "content": user_content}
    ])
}
