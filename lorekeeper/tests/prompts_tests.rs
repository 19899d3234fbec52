use lorekeeper::llm::prompts::{
    answer_prompt, answer_system_prompt, answer_system_prompt_with_history, render_history,
    NO_RESULTS_MESSAGE,
};
use lorekeeper::models::{HistoryEntry, Role};

fn entry(role: Role, content: &str) -> HistoryEntry {
    HistoryEntry {
        role,
        content: content.to_string(),
    }
}

#[test]
fn test_system_prompt_grounding_rules() {
    let prompt = answer_system_prompt();

    assert!(prompt.contains("context"));
    assert!(prompt.contains("specification"));
}

#[test]
fn test_answer_prompt_substitution() {
    let prompt = answer_prompt("[unknown]\nsome passage", "What is the level cap?");

    assert!(prompt.contains("some passage"));
    assert!(prompt.contains("What is the level cap?"));
}

#[test]
fn test_history_prompt_renders_at_most_ten_entries() {
    let history: Vec<HistoryEntry> = (0..40)
        .map(|i| entry(Role::User, &format!("turn {i}")))
        .collect();

    let prompt = answer_system_prompt_with_history(&history, 10);

    assert!(prompt.contains("turn 39"));
    assert!(prompt.contains("turn 30"));
    assert!(!prompt.contains("turn 29"));
}

#[test]
fn test_render_history_preserves_chronological_order() {
    let history = vec![
        entry(Role::User, "older"),
        entry(Role::Assistant, "newer"),
    ];
    let rendered = render_history(&history, 10);

    let older_pos = rendered.find("older").unwrap();
    let newer_pos = rendered.find("newer").unwrap();
    assert!(older_pos < newer_pos);
}

#[test]
fn test_no_results_message_mentions_the_specification() {
    assert!(NO_RESULTS_MESSAGE.contains("specification"));
}
