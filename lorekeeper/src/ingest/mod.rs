mod chunker;
mod loader;

pub use chunker::{SectionChunk, SectionChunker};
pub use loader::DocumentLoader;
