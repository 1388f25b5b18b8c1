//! The JSON-lines command loop

use mongolens_explorer::TreeEvent;
use mongolens_services::{Extension, UntypedCommandInvocation};
use serde_json::json;
use std::sync::Arc;
use tokio::sync::broadcast::{self, error::TryRecvError};

use crate::host::{ConsoleInput, ConsoleOutput};

/// Execute one invocation per input line until the input ends, then deactivate
///
/// Each line is `{"command": "<id>", "args": <json>}`; the result is written
/// as `{"command": "<id>", "success": <bool>}`. Tree refreshes are forwarded
/// as `{"event": "refreshed", "generation": <n>}`.
pub async fn run(extension: Extension, input: Arc<ConsoleInput>, output: Arc<ConsoleOutput>) {
    let mut tree_events = extension.context().tree.subscribe();

    while let Some(line) = input.next_line().await {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let invocation: UntypedCommandInvocation = match serde_json::from_str(line) {
            Ok(invocation) => invocation,
            Err(e) => {
                tracing::warn!(error = %e, "unreadable invocation");
                output.emit(&json!({ "error": format!("invalid invocation: {e}") }));
                continue;
            }
        };

        let success = extension
            .execute(&invocation.command_id, invocation.args)
            .await;
        forward_tree_events(&mut tree_events, &output);
        output.emit(&json!({ "command": invocation.command_id, "success": success }));
    }

    tracing::info!("input closed, deactivating");
    extension.deactivate().await;
    forward_tree_events(&mut tree_events, &output);
}

/// Write every tree event published since the last call
fn forward_tree_events(events: &mut broadcast::Receiver<TreeEvent>, output: &ConsoleOutput) {
    loop {
        match events.try_recv() {
            Ok(TreeEvent::Refreshed { generation }) => {
                output.emit(&json!({ "event": "refreshed", "generation": generation }));
            }
            Err(TryRecvError::Lagged(skipped)) => {
                tracing::debug!(skipped, "tree events skipped");
            }
            Err(TryRecvError::Empty | TryRecvError::Closed) => break,
        }
    }
}
