use regex::Regex;

/// A section-tagged slice of the source document, before it is assigned an
/// id and position by the loader.
#[derive(Debug, Clone, PartialEq)]
pub struct SectionChunk {
    pub content: String,
    pub section: String,
    pub subsection: String,
}

/// Splits a hierarchical markdown document into retrieval-sized chunks,
/// tagging each with the section and subsection headers active at its
/// position.
///
/// Only bold-numbered level-1/level-2 headers count as section boundaries:
/// `## **3. Combat**` starts a section, `### **3.1 Damage**` a subsection.
/// A plain `# Title`, an unnumbered `## Heading`, or a level-4 header never
/// match.
pub struct SectionChunker {
    chunk_size: usize,
    chunk_overlap: usize,
    section_re: Regex,
    subsection_re: Regex,
}

impl SectionChunker {
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        Self {
            chunk_size,
            chunk_overlap,
            section_re: Regex::new(r"^## \*\*\d+").expect("valid section header pattern"),
            subsection_re: Regex::new(r"^### \*\*\d+").expect("valid subsection header pattern"),
        }
    }

    /// Scan line by line, accumulating a buffer. Once appending a line pushes
    /// the buffer past `chunk_size`, everything before that line becomes a
    /// chunk tagged with the headers that were active before the line was
    /// processed; the line itself seeds the next buffer.
    pub fn chunk(&self, text: &str) -> Vec<SectionChunk> {
        let mut section = String::new();
        let mut subsection = String::new();
        let mut chunks = Vec::new();
        let mut buffer: Vec<&str> = Vec::new();

        for line in text.lines() {
            let (prev_section, prev_subsection) = (section.clone(), subsection.clone());

            if self.section_re.is_match(line) {
                section = line.trim().to_string();
                subsection.clear();
            } else if self.subsection_re.is_match(line) {
                subsection = line.trim().to_string();
            }

            buffer.push(line);

            if buffer.join("\n").len() > self.chunk_size {
                let content = buffer[..buffer.len() - 1].join("\n");
                push_non_blank(&mut chunks, content, &prev_section, &prev_subsection);
                buffer = vec![line];
            }
        }

        if !buffer.is_empty() {
            let content = buffer.join("\n");
            push_non_blank(&mut chunks, content, &section, &subsection);
        }

        chunks
    }

    /// Fixed-window re-split for chunks that are still larger than
    /// `chunk_size` after the header-aware pass, with `chunk_overlap` bytes
    /// shared between adjacent windows. Slices are widened to UTF-8 char
    /// boundaries.
    pub fn split_fixed(&self, content: &str) -> Vec<String> {
        if content.len() <= self.chunk_size {
            return vec![content.to_string()];
        }

        let stride = self
            .chunk_size
            .saturating_sub(self.chunk_overlap)
            .max(1);

        let mut pieces = Vec::new();
        let mut start = 0;
        while start < content.len() {
            let end = ceil_char_boundary(content, start + self.chunk_size);
            pieces.push(content[start..end].to_string());
            if end == content.len() {
                break;
            }
            let next = floor_char_boundary(content, start + stride);
            // A floored boundary must still advance, or tiny strides over
            // multibyte chars would loop forever.
            start = if next > start {
                next
            } else {
                ceil_char_boundary(content, start + stride)
            };
        }
        pieces
    }
}

fn push_non_blank(
    chunks: &mut Vec<SectionChunk>,
    content: String,
    section: &str,
    subsection: &str,
) {
    if content.trim().is_empty() {
        return;
    }
    chunks.push(SectionChunk {
        content,
        section: section.to_string(),
        subsection: subsection.to_string(),
    });
}

fn floor_char_boundary(s: &str, mut idx: usize) -> usize {
    if idx >= s.len() {
        return s.len();
    }
    while !s.is_char_boundary(idx) {
        idx -= 1;
    }
    idx
}

fn ceil_char_boundary(s: &str, mut idx: usize) -> usize {
    if idx >= s.len() {
        return s.len();
    }
    while !s.is_char_boundary(idx) {
        idx += 1;
    }
    idx
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn chunker(size: usize) -> SectionChunker {
        SectionChunker::new(size, 0)
    }

    #[test]
    fn test_single_chunk_when_text_fits() {
        let text = "## **1. Combat**\nAttack rolls use a d20.\n## **2. Magic**\nSpells cost mana.";
        let chunks = chunker(10_000).chunk(text);

        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].content, text);
    }

    #[test]
    fn test_two_sections_split_at_header_keep_their_tags() {
        let text = "## **1. Combat**\nAttack rolls use a d20.\n## **2. Magic**\nSpells cost mana.";
        // Overflow triggers exactly when the second header is appended
        let chunks = chunker(45).chunk(text);

        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].section, "## **1. Combat**");
        assert!(chunks[0].content.contains("Attack rolls"));
        assert_eq!(chunks[1].section, "## **2. Magic**");
        assert!(chunks[1].content.contains("Spells cost mana"));
    }

    #[test]
    fn test_closed_chunk_tagged_with_pre_line_section() {
        // The overflowing line is itself a new section header: the closed
        // chunk must keep the section that was active before it.
        let line1 = "## **1. Combat**";
        let line2 = "Some combat rules here.";
        let line3 = "## **2. Magic**";
        let text = format!("{line1}\n{line2}\n{line3}\nMana pools regenerate.");
        let size = line1.len() + 1 + line2.len(); // overflow on line3

        let chunks = SectionChunker::new(size, 0).chunk(&text);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].section, "## **1. Combat**");
        assert_eq!(chunks[1].section, "## **2. Magic**");
    }

    #[test]
    fn test_subsection_resets_on_new_section() {
        let text = "## **1. Combat**\n### **1.1 Damage**\naaaa\n## **2. Magic**\nbbbb";
        let chunks = chunker(40).chunk(text);

        let last = chunks.last().unwrap();
        assert_eq!(last.section, "## **2. Magic**");
        assert_eq!(last.subsection, "");
    }

    #[test]
    fn test_subsection_updates_without_clearing_section() {
        let text = "## **3. World**\n### **3.2 Biomes**\nForests and deserts.";
        let chunks = chunker(10_000).chunk(text);

        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].section, "## **3. World**");
        assert_eq!(chunks[0].subsection, "### **3.2 Biomes**");
    }

    #[test]
    fn test_non_matching_headers_are_plain_lines() {
        let text = "# Game Spec\n## Overview\n#### **4.1 Deep**\n## **1. Rules**\ntext";
        let chunks = chunker(10_000).chunk(text);

        assert_eq!(chunks.len(), 1);
        // Only the bold-numbered level-1 header counts
        assert_eq!(chunks[0].section, "## **1. Rules**");
        assert_eq!(chunks[0].subsection, "");
    }

    #[test]
    fn test_lines_before_any_header_carry_empty_tags() {
        let text = "Intro paragraph with no headers yet.";
        let chunks = chunker(10_000).chunk(text);

        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].section, "");
        assert_eq!(chunks[0].subsection, "");
    }

    #[test]
    fn test_blank_text_produces_no_chunks() {
        assert!(chunker(100).chunk("").is_empty());
        assert!(chunker(100).chunk("   \n\n  \n").is_empty());
    }

    #[test]
    fn test_every_line_covered_exactly_once() {
        let mut text = String::from("## **1. Alpha**\n");
        for i in 0..50 {
            text.push_str(&format!("Line number {i} with some filler content.\n"));
            if i == 25 {
                text.push_str("## **2. Beta**\n");
            }
        }

        let chunks = chunker(200).chunk(&text);
        assert!(chunks.len() > 1);

        let rejoined: Vec<&str> = chunks
            .iter()
            .flat_map(|c| c.content.lines())
            .collect();
        let original: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();
        assert_eq!(rejoined, original);
    }

    #[test]
    fn test_final_short_chunk_still_emitted() {
        let text = "## **1. A**\n0123456789\nx";
        let chunks = chunker(22).chunk(text);

        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[1].content, "x");
    }

    #[test]
    fn test_split_fixed_respects_overlap() {
        let chunker = SectionChunker::new(10, 5);
        let content = "0123456789abcdefghij";
        let pieces = chunker.split_fixed(content);

        assert_eq!(pieces[0], "0123456789");
        assert_eq!(pieces[1], "56789abcde");
        assert!(pieces.last().unwrap().ends_with("j"));
    }

    #[test]
    fn test_split_fixed_leaves_small_content_alone() {
        let chunker = SectionChunker::new(100, 20);
        let pieces = chunker.split_fixed("short");
        assert_eq!(pieces, vec!["short".to_string()]);
    }

    #[test]
    fn test_split_fixed_survives_multibyte_boundaries() {
        let chunker = SectionChunker::new(5, 0);
        let content = "héllo wörld with ümlauts";
        let pieces = chunker.split_fixed(content);
        assert!(!pieces.is_empty());
        assert!(pieces.concat().len() >= content.len());
    }
}
