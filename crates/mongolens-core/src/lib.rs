//! MongoLens Core - Core abstractions shared by every MongoLens crate
//!
//! This crate provides the identifiers, value types and collaborator traits
//! that the rest of the workspace is written against. It defines:
//!
//! - `ConnectionId` / `SavedConnection` - Identity of a saved connection
//! - `ConnectionDriver` / `DataService` - The external database driver
//! - `TelemetrySink` - Fire-and-forget usage telemetry
//! - `Notifier`, `Clipboard`, `Prompt` - The host's user-facing surface
//! - `PlaygroundController`, `EditorController`, `WebviewController`,
//!   `ShellLauncher` - Host controllers that commands delegate to
//!
//! Nothing in here performs I/O; implementations live in the driver and
//! app crates, or in test mocks.

mod connection;
mod controllers;
mod driver;
mod error;
mod host;
mod telemetry;
mod types;

pub use connection::*;
pub use controllers::*;
pub use driver::*;
pub use error::*;
pub use host::*;
pub use telemetry::*;
pub use types::*;
