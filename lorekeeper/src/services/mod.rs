mod chat;
mod context;
mod retrieval;
mod sessions;

pub use chat::ChatService;
pub use context::ContextAssembler;
pub use retrieval::{ChunkIndex, NearestNeighborProvider, RetrievalEngine};
pub use sessions::SessionService;
