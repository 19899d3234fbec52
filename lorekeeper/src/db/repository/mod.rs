mod chunks;
mod messages;
mod sessions;

pub use chunks::ChunkRepository;
pub use messages::MessageRepository;
pub use sessions::SessionRepository;
