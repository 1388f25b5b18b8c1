//! MongoLens Services Layer
//!
//! This crate binds the host's command surface to the connection state
//! machine and the explorer tree.
//!
//! # Architecture
//!
//! ```text
//! Host (mongolens-app, or an editor)
//!     ↓  execute(command id, untyped args)
//! CommandDispatcher ← telemetry → payload validation → handler
//!     ↓
//! ConnectionController / ExplorerTree (mongolens-connection, mongolens-explorer)
//!     ↓
//! Collaborator traits (mongolens-core), implemented by the driver and the host
//! ```
//!
//! # Modules
//!
//! - [`command`] - Stable command identifiers and the typed command payloads
//! - [`CommandDispatcher`] - Binds identifiers to wrapped handlers
//! - [`AppContext`] - Everything a handler needs, built once at startup
//! - [`FirstRunGate`] - One-shot onboarding flag
//! - [`Extension`] - Activation and deactivation

mod activation;
pub mod command;
mod context;
mod dispatcher;
mod error;
mod first_run;
mod handlers;
mod headless;
mod middleware;
mod settings;
mod telemetry;

pub use activation::Extension;
pub use command::{Command, CommandRegistry, UntypedCommandInvocation};
pub use context::{AppContext, AppContextBuilder};
pub use dispatcher::{CommandDispatcher, CommandRegistration};
pub use error::{ServiceError, ServiceResult};
pub use first_run::{FirstRunGate, GateState, HAS_BEEN_SHOWN_INITIAL_VIEW_KEY};
pub use headless::{DismissPrompt, HeadlessSurface, TracingNotifier};
pub use middleware::{
    CommandFuture, CommandHandler, TypedHandler, handler_fn, typed_handler_fn,
    with_payload_validation, with_telemetry,
};
pub use settings::{ExtensionSettings, config_dir, data_dir, logs_dir};
pub use telemetry::TracingTelemetry;
