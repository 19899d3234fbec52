mod chat;
mod chunk;
mod common;
mod session;

pub use chat::*;
pub use chunk::*;
pub use common::*;
pub use session::*;
