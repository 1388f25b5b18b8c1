//! MongoLens Connection - Connection lifecycle and persisted state
//!
//! This crate owns the connection state machine that decides which saved
//! connection is active, and the key/value storage that remembers saved
//! connections and flags across restarts.

mod controller;
mod status;
mod storage;

pub use controller::ConnectionController;
pub use status::{ConnectionEvent, ConnectionStatus};
pub use storage::{JsonFileStorage, MemoryStorage, StorageController};
