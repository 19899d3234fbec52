use crate::llm::prompts;
use crate::models::ScoredChunk;

/// Formats retrieved chunks into the bounded-length context block fed to
/// answer generation.
pub struct ContextAssembler;

impl ContextAssembler {
    /// Render each chunk as `[section]\ncontent`, join with blank lines, and
    /// truncate to `max_length` characters plus a literal `...` when the
    /// rendering runs over. The result is therefore at most `max_length + 3`
    /// characters long and ends with `...` exactly when truncation happened.
    pub fn assemble(chunks: &[ScoredChunk], max_length: usize) -> String {
        let joined = chunks
            .iter()
            .map(|chunk| {
                let section = if chunk.section.is_empty() {
                    "unknown"
                } else {
                    chunk.section.as_str()
                };
                format!("[{section}]\n{}", chunk.content)
            })
            .collect::<Vec<_>>()
            .join("\n\n");

        match joined.char_indices().nth(max_length) {
            None => joined,
            Some((byte_idx, _)) => format!("{}...", &joined[..byte_idx]),
        }
    }

    /// Fixed message used whenever retrieval yields zero results.
    pub fn format_no_results() -> &'static str {
        prompts::NO_RESULTS_MESSAGE
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn chunk(section: &str, content: &str) -> ScoredChunk {
        ScoredChunk {
            chunk_id: "c1".to_string(),
            content: content.to_string(),
            section: section.to_string(),
            subsection: String::new(),
            source: "spec.md".to_string(),
            score: 0.8,
        }
    }

    #[test]
    fn test_assemble_renders_section_template() {
        let chunks = vec![
            chunk("## **1. Combat**", "Attack rolls use a d20."),
            chunk("## **2. Magic**", "Spells cost mana."),
        ];
        let context = ContextAssembler::assemble(&chunks, 1000);

        assert_eq!(
            context,
            "[## **1. Combat**]\nAttack rolls use a d20.\n\n[## **2. Magic**]\nSpells cost mana."
        );
    }

    #[test]
    fn test_assemble_uses_placeholder_for_missing_section() {
        let chunks = vec![chunk("", "Preface text.")];
        let context = ContextAssembler::assemble(&chunks, 1000);
        assert_eq!(context, "[unknown]\nPreface text.");
    }

    #[test]
    fn test_assemble_truncates_with_ellipsis() {
        let chunks = vec![chunk("## **1. A**", &"x".repeat(500))];
        let context = ContextAssembler::assemble(&chunks, 100);

        assert_eq!(context.chars().count(), 103);
        assert!(context.ends_with("..."));
    }

    #[test]
    fn test_assemble_under_budget_is_untouched() {
        let chunks = vec![chunk("## **1. A**", "short")];
        let context = ContextAssembler::assemble(&chunks, 100);

        assert!(!context.ends_with("..."));
        assert!(context.chars().count() <= 100);
    }

    #[test]
    fn test_assemble_exactly_at_budget_is_untouched() {
        let content = "y".repeat(88); // "[## **1. A**]\n" is 14 chars
        let chunks = vec![chunk("## **1. A**", &content)];
        let context = ContextAssembler::assemble(&chunks, 102);

        assert_eq!(context.chars().count(), 102);
        assert!(!context.ends_with("..."));
    }

    #[test]
    fn test_assemble_zero_budget_yields_bare_ellipsis() {
        let chunks = vec![chunk("## **1. A**", "anything")];
        let context = ContextAssembler::assemble(&chunks, 0);
        assert_eq!(context, "...");
    }

    #[test]
    fn test_no_results_message_is_fixed() {
        assert!(!ContextAssembler::format_no_results().is_empty());
    }
}
