//! Handler types and the middleware that wraps them
//!
//! A bound handler is composed as
//! `with_telemetry(id, sink, with_payload_validation(definition, handler))`,
//! so the telemetry event is recorded before the payload is even looked at.

use futures::future::BoxFuture;
use mongolens_core::TelemetrySink;
use serde_json::Value;
use std::future::Future;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use crate::command::CommandDefinition;
use crate::{Command, ServiceResult};

pub type CommandFuture = BoxFuture<'static, ServiceResult<bool>>;

/// Handler bound in the dispatcher; receives the host's raw arguments
pub type CommandHandler = Arc<dyn Fn(Option<Value>) -> CommandFuture + Send + Sync>;

/// Handler that receives a validated payload
pub type TypedHandler = Arc<dyn Fn(Command) -> CommandFuture + Send + Sync>;

pub fn handler_fn<F, Fut>(f: F) -> CommandHandler
where
    F: Fn(Option<Value>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ServiceResult<bool>> + Send + 'static,
{
    Arc::new(move |args| Box::pin(f(args)))
}

pub fn typed_handler_fn<F, Fut>(f: F) -> TypedHandler
where
    F: Fn(Command) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ServiceResult<bool>> + Send + 'static,
{
    Arc::new(move |command| Box::pin(f(command)))
}

/// Parse the raw arguments before the handler runs
///
/// Rejected payloads never reach `handler`; the parse error is returned to
/// the dispatcher boundary instead.
pub fn with_payload_validation(definition: &CommandDefinition, handler: TypedHandler) -> CommandHandler {
    let definition = definition.clone();
    Arc::new(move |args| match definition.parse(args.as_ref()) {
        Ok(command) => handler(command),
        Err(e) => {
            tracing::warn!(command_id = definition.metadata().id, error = %e, "rejected command payload");
            Box::pin(futures::future::ready(Err(e)))
        }
    })
}

/// Record a "command ran" event, then run the handler
///
/// The event is emitted for every invocation, whatever the handler does
/// afterwards. Sink failures and panics are swallowed.
pub fn with_telemetry(
    command_id: &str,
    sink: Arc<dyn TelemetrySink>,
    handler: CommandHandler,
) -> CommandHandler {
    let command_id: Arc<str> = Arc::from(command_id);
    Arc::new(move |args| {
        match panic::catch_unwind(AssertUnwindSafe(|| sink.track_command_run(&command_id))) {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                tracing::trace!(command_id = %command_id, error = %e, "telemetry event dropped");
            }
            Err(_) => {
                tracing::warn!(command_id = %command_id, "telemetry sink panicked");
            }
        }
        handler(args)
    })
}
