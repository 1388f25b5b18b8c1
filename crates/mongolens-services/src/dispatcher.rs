//! Command dispatcher
//!
//! Binds command identifiers to wrapped handlers. Each binding is owned by
//! the [`CommandRegistration`] returned when it is made; dropping the
//! registration unbinds the identifier.

use futures::FutureExt;
use parking_lot::RwLock;
use serde_json::Value;
use std::any::Any;
use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Weak};

use crate::{CommandHandler, ServiceError, ServiceResult};

type Bindings = RwLock<HashMap<String, CommandHandler>>;

#[derive(Clone, Default)]
pub struct CommandDispatcher {
    bindings: Arc<Bindings>,
}

impl CommandDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `command_id` to `handler`
    ///
    /// Binding an identifier that is already bound fails; the existing
    /// binding is left untouched.
    pub fn register_command(
        &self,
        command_id: &str,
        handler: CommandHandler,
    ) -> ServiceResult<CommandRegistration> {
        let mut bindings = self.bindings.write();
        if bindings.contains_key(command_id) {
            return Err(ServiceError::DuplicateCommand {
                command_id: command_id.to_owned(),
            });
        }
        bindings.insert(command_id.to_owned(), handler);
        tracing::trace!(command_id, "command registered");

        Ok(CommandRegistration {
            command_id: command_id.to_owned(),
            bindings: Arc::downgrade(&self.bindings),
        })
    }

    pub fn is_registered(&self, command_id: &str) -> bool {
        self.bindings.read().contains_key(command_id)
    }

    pub fn registered_commands(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.bindings.read().keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Run a command and report whether it succeeded
    ///
    /// Errors and panics raised by the handler stop here: they are logged
    /// and reported to the host as `false`.
    #[tracing::instrument(skip(self, args))]
    pub async fn execute(&self, command_id: &str, args: Option<Value>) -> bool {
        let handler = self.bindings.read().get(command_id).cloned();
        let Some(handler) = handler else {
            tracing::warn!("no handler bound for command");
            return false;
        };

        let run = async move { handler(args).await };
        match AssertUnwindSafe(run).catch_unwind().await {
            Ok(Ok(success)) => {
                tracing::debug!(success, "command finished");
                success
            }
            Ok(Err(e)) if e.is_payload_error() => {
                tracing::warn!(error = %e, "command rejected its arguments");
                false
            }
            Ok(Err(ServiceError::Core(e))) if e.is_conflict() => {
                tracing::info!(error = %e, "command refused while a connection change is in flight");
                false
            }
            Ok(Err(e)) => {
                tracing::error!(error = %e, "command failed");
                false
            }
            Err(panic) => {
                tracing::error!(panic = %panic_message(panic.as_ref()), "command handler panicked");
                false
            }
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    if let Some(message) = panic.downcast_ref::<&str>() {
        *message
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.as_str()
    } else {
        "non-string panic payload"
    }
}

/// Keeps a command bound; dropping it unbinds the command
#[derive(Debug)]
#[must_use = "dropping the registration unbinds the command"]
pub struct CommandRegistration {
    command_id: String,
    bindings: Weak<Bindings>,
}

impl CommandRegistration {
    pub fn command_id(&self) -> &str {
        &self.command_id
    }
}

impl Drop for CommandRegistration {
    fn drop(&mut self) {
        if let Some(bindings) = self.bindings.upgrade() {
            bindings.write().remove(&self.command_id);
            tracing::trace!(command_id = %self.command_id, "command unregistered");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::handler_fn;
    use mongolens_core::MongolensError;

    fn explode() -> ServiceResult<bool> {
        panic!("handler exploded")
    }

    fn ok_handler() -> CommandHandler {
        handler_fn(|_| async { Ok(true) })
    }

    #[tokio::test]
    async fn test_execute_returns_handler_result() {
        let dispatcher = CommandDispatcher::new();
        let _yes = dispatcher.register_command("mdb.yes", ok_handler()).unwrap();
        let _no = dispatcher
            .register_command("mdb.no", handler_fn(|_| async { Ok(false) }))
            .unwrap();

        assert!(dispatcher.execute("mdb.yes", None).await);
        assert!(!dispatcher.execute("mdb.no", None).await);
    }

    #[tokio::test]
    async fn test_unknown_command_is_failure() {
        let dispatcher = CommandDispatcher::new();
        assert!(!dispatcher.execute("mdb.missing", None).await);
    }

    #[tokio::test]
    async fn test_duplicate_registration_is_rejected() {
        let dispatcher = CommandDispatcher::new();
        let _first = dispatcher.register_command("mdb.x", ok_handler()).unwrap();

        let err = dispatcher.register_command("mdb.x", ok_handler()).unwrap_err();

        assert!(matches!(err, ServiceError::DuplicateCommand { .. }));
        assert!(dispatcher.execute("mdb.x", None).await);
    }

    #[tokio::test]
    async fn test_dropping_registration_unbinds() {
        let dispatcher = CommandDispatcher::new();
        let registration = dispatcher.register_command("mdb.x", ok_handler()).unwrap();
        assert_eq!(registration.command_id(), "mdb.x");

        drop(registration);

        assert!(!dispatcher.is_registered("mdb.x"));
        assert!(!dispatcher.execute("mdb.x", None).await);
        let _again = dispatcher.register_command("mdb.x", ok_handler()).unwrap();
    }

    #[tokio::test]
    async fn test_errors_and_panics_become_failure() {
        let dispatcher = CommandDispatcher::new();
        let _err = dispatcher
            .register_command(
                "mdb.err",
                handler_fn(|_| async {
                    Err(ServiceError::from(MongolensError::Other("boom".into())))
                }),
            )
            .unwrap();
        let _panic = dispatcher
            .register_command(
                "mdb.panic",
                handler_fn(|_| async { explode() }),
            )
            .unwrap();

        assert!(!dispatcher.execute("mdb.err", None).await);
        assert!(!dispatcher.execute("mdb.panic", None).await);
        // The dispatcher is still usable afterwards
        assert!(dispatcher.is_registered("mdb.panic"));
    }

    #[test]
    fn test_registration_outliving_dispatcher() {
        let dispatcher = CommandDispatcher::new();
        let registration = dispatcher.register_command("mdb.x", ok_handler()).unwrap();
        drop(dispatcher);
        drop(registration);
    }
}
