//! Extension activation and deactivation

use serde_json::Value;
use std::sync::Arc;

use crate::command::ids;
use crate::middleware::typed_handler_fn;
use crate::{
    AppContext, CommandRegistration, CommandRegistry, FirstRunGate, ServiceResult, handlers,
    with_payload_validation, with_telemetry,
};

/// An activated extension
///
/// Holds the registration of every command. Dropping it, or calling
/// [`deactivate`](Self::deactivate), unbinds them all.
pub struct Extension {
    ctx: Arc<AppContext>,
    registrations: Vec<CommandRegistration>,
}

impl Extension {
    /// Register every command, then run the first-run gate
    #[tracing::instrument(skip_all)]
    pub async fn activate(ctx: Arc<AppContext>) -> ServiceResult<Self> {
        let registry = CommandRegistry::new()?;
        let mut registrations = Vec::with_capacity(registry.len());

        for command_id in registry.ids() {
            let definition = registry.lookup(command_id)?;
            let handler = typed_handler_fn({
                let ctx = ctx.clone();
                move |command| {
                    let ctx = ctx.clone();
                    async move { handlers::handle(&ctx, command).await }
                }
            });
            let wrapped = with_telemetry(
                command_id,
                ctx.telemetry.clone(),
                with_payload_validation(definition, handler),
            );
            registrations.push(ctx.dispatcher.register_command(command_id, wrapped)?);
        }
        tracing::info!(count = registrations.len(), "commands registered");

        let extension = Self { ctx, registrations };
        extension.run_first_run_gate().await;
        Ok(extension)
    }

    async fn run_first_run_gate(&self) {
        let gate = FirstRunGate::new(self.ctx.storage.clone());
        let result = gate
            .run(self.ctx.settings.show_overview_on_first_run, || {
                self.ctx.dispatcher.execute(ids::OPEN_OVERVIEW_PAGE, None)
            })
            .await;
        if let Err(e) = result {
            tracing::warn!(error = %e, "first-run gate failed");
        }
    }

    pub fn context(&self) -> &Arc<AppContext> {
        &self.ctx
    }

    pub fn registered_commands(&self) -> impl Iterator<Item = &str> {
        self.registrations.iter().map(CommandRegistration::command_id)
    }

    /// Run a command through the dispatcher
    pub async fn execute(&self, command_id: &str, args: Option<Value>) -> bool {
        self.ctx.dispatcher.execute(command_id, args).await
    }

    /// Force the connection back to idle and unbind every command
    #[tracing::instrument(skip_all)]
    pub async fn deactivate(self) {
        self.ctx.connections.shutdown().await;
        let count = self.registrations.len();
        drop(self.registrations);
        tracing::info!(count, "commands unregistered");
    }
}
