//! Command handlers
//!
//! Every handler returns `Ok(true)` when it carried the action out and
//! `Ok(false)` when it declined: a precondition was not met (reported as an
//! advisory), the user cancelled, or an external operation failed (reported
//! as an error message). `Err` is reserved for faults the dispatcher
//! boundary should log.

mod connection;
mod explorer;
mod playground;
mod utilities;

use mongolens_core::{ConnectionId, DocumentSource};
use mongolens_explorer::TreeNode;
use std::fmt::Display;

use crate::{AppContext, Command, ServiceResult};

pub(crate) async fn handle(ctx: &AppContext, command: Command) -> ServiceResult<bool> {
    match command {
        Command::Connect | Command::AddConnection => connection::open_connect_form(ctx).await,
        Command::ConnectWithUri(args) | Command::AddConnectionWithUri(args) => {
            connection::connect_with_uri(ctx, args.uri).await
        }
        Command::Disconnect => connection::disconnect(ctx).await,
        Command::RemoveConnection(args) => connection::remove_connection(ctx, args).await,
        Command::ChangeActiveConnection => connection::change_active_connection(ctx).await,
        Command::OpenOverviewPage => Ok(ctx.webview.open_overview_page().await?),

        Command::OpenShell => playground::open_shell(ctx).await,
        Command::OpenShellFromTreeView(node) => playground::open_shell_from_tree(ctx, node).await,
        Command::CreatePlayground => Ok(ctx.playground.create_playground().await?),
        Command::RunSelectedPlaygroundBlocks => playground::run_selected_blocks(ctx).await,
        Command::RunAllPlaygroundBlocks => playground::run_all_blocks(ctx).await,
        Command::ExportToLanguage(language) => playground::export_to_language(ctx, language).await,

        Command::ConnectToConnectionTreeItem(node) => connection::connect_tree_item(ctx, node).await,
        Command::DisconnectFromConnectionTreeItem(node) => {
            connection::disconnect_tree_item(ctx, node).await
        }
        Command::RefreshConnection(node) => refresh_node(ctx, node, "connection"),
        Command::CopyConnectionString(node) => connection::copy_connection_string(ctx, node).await,
        Command::TreeItemRemoveConnection(node) => {
            connection::remove_tree_item_connection(ctx, node).await
        }
        Command::RenameConnection(args) => connection::rename_connection(ctx, args).await,
        Command::EditConnection(node) => connection::edit_connection(ctx, node).await,
        Command::AddDatabase(node) => explorer::add_database(ctx, node).await,

        Command::RefreshDatabase(node) => refresh_node(ctx, node, "database"),
        Command::CopyDatabaseName(node) => explorer::copy_database_name(ctx, node).await,
        Command::DropDatabase(node) => explorer::drop_database(ctx, node).await,
        Command::AddCollection(node) => explorer::add_collection(ctx, node).await,

        Command::ViewCollectionDocuments(node) => explorer::view_collection_documents(ctx, node).await,
        Command::RefreshDocumentList(node) => refresh_node(ctx, node, "document list"),
        Command::CopyCollectionName(node) => explorer::copy_collection_name(ctx, node).await,
        Command::DropCollection(node) => explorer::drop_collection(ctx, node).await,
        Command::RefreshCollection(node) => refresh_node(ctx, node, "collection"),
        Command::RefreshSchema(node) => refresh_node(ctx, node, "schema"),
        Command::SearchForDocuments(node) => playground::search_for_documents(ctx, node).await,
        Command::InsertDocumentFromTreeView(node) => playground::insert_document(ctx, node).await,
        Command::CreateIndexFromTreeView(args) => explorer::create_index(ctx, args).await,

        Command::OpenDocumentFromTree(node) => explorer::open_document(ctx, node).await,
        Command::CopyDocumentContentsFromTreeView(node) => {
            explorer::copy_document_contents(ctx, node).await
        }
        Command::CloneDocumentFromTreeView(node) => playground::clone_document(ctx, node).await,
        Command::DeleteDocumentFromTreeView(node) => explorer::delete_document(ctx, node).await,

        Command::OpenDocumentFromCodeLens(args) => utilities::open_code_lens_document(ctx, args).await,
        Command::SaveDocument => Ok(ctx.editor.save_active_document().await?),
        Command::InsertObjectIdToEditor => utilities::insert_object_id(ctx).await,
        Command::GenerateObjectIdToClipboard => utilities::copy_object_id(ctx).await,
    }
}

/// Report an unmet precondition and decline
fn advise(ctx: &AppContext, message: &str) -> ServiceResult<bool> {
    tracing::info!(advisory = message, "command precondition not met");
    ctx.notifier.show_warning(message);
    Ok(false)
}

/// Advisory for tree commands invoked without a tree item
fn missing_node(ctx: &AppContext, kind: &str) -> ServiceResult<bool> {
    advise(
        ctx,
        &format!("Please select a {kind} in the tree view to run this command."),
    )
}

/// Report a failed external operation and decline
fn report_failure(ctx: &AppContext, action: &str, error: impl Display) -> ServiceResult<bool> {
    tracing::warn!(action, error = %error, "operation failed");
    ctx.notifier.show_error(&format!("{action} failed: {error}"));
    Ok(false)
}

/// Check that `connection_id` is the active connection and is not changing
fn ensure_connection_ready(
    ctx: &AppContext,
    connection_id: &ConnectionId,
    action: &str,
) -> Result<(), String> {
    if ctx.connections.is_disconnecting() {
        return Err(format!("Unable to {action} while disconnecting."));
    }
    if ctx.connections.is_connecting() {
        return Err(format!("Unable to {action} while connecting."));
    }
    if !ctx.connections.is_active(connection_id) {
        return Err(format!("Please connect to this connection before you {action}."));
    }
    Ok(())
}

/// Check that some connection is active and is not changing
fn ensure_any_connection_ready(ctx: &AppContext, action: &str) -> Result<ConnectionId, String> {
    if ctx.connections.is_connecting() || ctx.connections.is_disconnecting() {
        return Err(format!(
            "Unable to {action} while a connection is being changed."
        ));
    }
    ctx.connections
        .active_connection_id()
        .ok_or_else(|| format!("Please connect to a database before you {action}."))
}

/// Invalidate `reset` after a successful mutation and refresh the view once
fn mutation_succeeded(ctx: &AppContext, reset: &TreeNode, message: &str) -> ServiceResult<bool> {
    ctx.notifier.show_information(message);
    ctx.tree.reset_cache(reset);
    ctx.tree.refresh();
    Ok(true)
}

fn refresh_node(ctx: &AppContext, node: Option<TreeNode>, kind: &str) -> ServiceResult<bool> {
    let Some(node) = node else {
        return missing_node(ctx, kind);
    };
    ctx.tree.reset_cache(&node);
    ctx.tree.refresh();
    Ok(true)
}

async fn copy_to_clipboard(ctx: &AppContext, text: &str, what: &str) -> ServiceResult<bool> {
    if let Err(e) = ctx.clipboard.write_text(text).await {
        return report_failure(ctx, &format!("Copying the {what}"), e);
    }
    ctx.notifier.show_information("Copied to clipboard.");
    Ok(true)
}

/// Telemetry for a document opened in an editor; failures are discarded
fn track_document_opened(ctx: &AppContext, source: DocumentSource) {
    let tracked = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        ctx.telemetry.track_document_opened_in_editor(source)
    }));
    match tracked {
        Ok(Ok(())) => {}
        Ok(Err(e)) => tracing::debug!(error = %e, "telemetry event dropped"),
        Err(_) => tracing::warn!("telemetry sink panicked"),
    }
}
