use std::path::Path;

use uuid::Uuid;

use crate::config::DocumentConfig;
use crate::error::{LorekeeperError, Result};
use crate::models::Chunk;

use super::chunker::SectionChunker;

/// Loads the source specification document and turns it into section-tagged,
/// retrieval-sized chunks ready for embedding.
pub struct DocumentLoader {
    file_path: String,
    chunker: SectionChunker,
}

impl DocumentLoader {
    pub fn new(config: &DocumentConfig) -> Self {
        Self {
            file_path: config.spec_file_path.clone(),
            chunker: SectionChunker::new(config.chunk_size, config.chunk_overlap),
        }
    }

    /// Read the document from disk and chunk it. Fails with `NotFound`
    /// before producing any chunk when the file is absent.
    pub fn load(&self) -> Result<Vec<Chunk>> {
        if !Path::new(&self.file_path).exists() {
            return Err(LorekeeperError::NotFound(format!(
                "Specification document not found: {}",
                self.file_path
            )));
        }

        let text = std::fs::read_to_string(&self.file_path)?;
        Ok(self.chunks_from_text(&text))
    }

    /// Section-aware pass, then a fixed-window re-split of any chunk still
    /// larger than the configured size, keeping section metadata.
    pub fn chunks_from_text(&self, text: &str) -> Vec<Chunk> {
        let mut chunks = Vec::new();
        let mut position = 0;

        for section_chunk in self.chunker.chunk(text) {
            for piece in self.chunker.split_fixed(&section_chunk.content) {
                chunks.push(Chunk::new(
                    Uuid::new_v4().to_string(),
                    piece,
                    section_chunk.section.clone(),
                    section_chunk.subsection.clone(),
                    self.file_path.clone(),
                    position,
                ));
                position += 1;
            }
        }

        chunks
    }

    pub fn file_path(&self) -> &str {
        &self.file_path
    }
}
