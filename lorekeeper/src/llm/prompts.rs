//! Prompt templates for answer generation
//!
//! These templates use basic `format!()` interpolation for type safety.
//! Missing variables will cause compile-time errors.

use crate::models::HistoryEntry;

/// Fixed message returned whenever retrieval finds nothing relevant.
pub const NO_RESULTS_MESSAGE: &str =
    "Sorry, no information about that could be found in the game specification.";

/// System instructions for the plain (history-free) generation path.
pub fn answer_system_prompt() -> String {
    r#"You are an assistant with deep knowledge of this game's design specification.
Answer the user's question accurately and concisely, based on the provided context.

Follow these rules:
1. Use only information contained in the context
2. Avoid guesses and speculation; state only what the specification supports
3. If the context does not cover the question, say so clearly
4. Answer in natural, plain prose"#
        .to_string()
}

/// System instructions for the history-aware generation path.
///
/// Renders at most `render_limit` of the most recent history entries as
/// `ROLE: content` lines inside a dedicated block, so the model keeps its
/// answers consistent with earlier turns.
///
/// # Example
/// ```
/// use lorekeeper::llm::prompts::answer_system_prompt_with_history;
/// use lorekeeper::models::{HistoryEntry, Role};
///
/// let history = vec![HistoryEntry {
///     role: Role::User,
///     content: "How does crafting work?".to_string(),
/// }];
/// let prompt = answer_system_prompt_with_history(&history, 10);
/// assert!(prompt.contains("USER: How does crafting work?"));
/// ```
pub fn answer_system_prompt_with_history(history: &[HistoryEntry], render_limit: usize) -> String {
    let rendered = render_history(history, render_limit);

    format!(
        r#"{}

Conversation so far (most recent turns):
{}

Keep your answer consistent with the conversation above; resolve follow-up
questions and pronouns against it."#,
        answer_system_prompt(),
        rendered
    )
}

/// Render the last `limit` history entries as `ROLE: content` lines.
pub fn render_history(history: &[HistoryEntry], limit: usize) -> String {
    let start = history.len().saturating_sub(limit);
    history[start..]
        .iter()
        .map(|entry| format!("{}: {}", entry.role.as_str().to_uppercase(), entry.content))
        .collect::<Vec<_>>()
        .join("\n")
}

/// The user-facing prompt: retrieved context plus the question.
pub fn answer_prompt(context: &str, question: &str) -> String {
    format!(
        r#"Context:
{context}

Question: {question}

Answer:"#
    )
}
