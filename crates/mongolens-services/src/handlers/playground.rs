//! Shell and playground commands

use mongolens_core::{Language, PlaygroundTemplate};
use mongolens_explorer::TreeNode;

use super::{advise, ensure_any_connection_ready, missing_node, report_failure};
use crate::{AppContext, ServiceResult};

/// Launch a shell for the active connection
#[tracing::instrument(skip_all)]
pub(super) async fn open_shell(ctx: &AppContext) -> ServiceResult<bool> {
    if let Err(message) = ensure_any_connection_ready(ctx, "launch a shell") {
        return advise(ctx, &message);
    }
    launch_active_shell(ctx).await
}

/// Connect to the selected connection if needed, then launch a shell for it
#[tracing::instrument(skip_all)]
pub(super) async fn open_shell_from_tree(
    ctx: &AppContext,
    node: Option<TreeNode>,
) -> ServiceResult<bool> {
    let Some(node) = node else {
        return missing_node(ctx, "connection");
    };
    if !ctx.connections.is_active(&node.connection_id)
        && !super::connection::connect_to(ctx, &node.connection_id).await?
    {
        return Ok(false);
    }
    launch_active_shell(ctx).await
}

async fn launch_active_shell(ctx: &AppContext) -> ServiceResult<bool> {
    let Some(active) = ctx.connections.active_connection().await? else {
        return advise(ctx, "Please connect to a database before you launch a shell.");
    };
    match ctx.shell.launch(&active.connection_string).await {
        Ok(launched) => Ok(launched),
        Err(e) => report_failure(ctx, "Launching the shell", e),
    }
}

pub(super) async fn run_selected_blocks(ctx: &AppContext) -> ServiceResult<bool> {
    if let Err(message) = ensure_any_connection_ready(ctx, "run a playground") {
        return advise(ctx, &message);
    }
    Ok(ctx.playground.run_selected_blocks().await?)
}

pub(super) async fn run_all_blocks(ctx: &AppContext) -> ServiceResult<bool> {
    if let Err(message) = ensure_any_connection_ready(ctx, "run a playground") {
        return advise(ctx, &message);
    }
    Ok(ctx.playground.run_all_blocks().await?)
}

pub(super) async fn export_to_language(
    ctx: &AppContext,
    language: Language,
) -> ServiceResult<bool> {
    if let Err(message) = ensure_any_connection_ready(ctx, "export to a language") {
        return advise(ctx, &message);
    }
    tracing::debug!(%language, "exporting playground");
    Ok(ctx.playground.export_to_language(language).await?)
}

pub(super) async fn search_for_documents(
    ctx: &AppContext,
    node: Option<TreeNode>,
) -> ServiceResult<bool> {
    let Some(node) = node else {
        return missing_node(ctx, "collection");
    };
    let namespace = node.namespace()?;
    Ok(ctx
        .playground
        .open_template(PlaygroundTemplate::SearchDocuments { namespace })
        .await?)
}

pub(super) async fn insert_document(
    ctx: &AppContext,
    node: Option<TreeNode>,
) -> ServiceResult<bool> {
    let Some(node) = node else {
        return missing_node(ctx, "collection");
    };
    let namespace = node.namespace()?;
    Ok(ctx
        .playground
        .open_template(PlaygroundTemplate::InsertDocument { namespace })
        .await?)
}

pub(super) async fn create_index_template(ctx: &AppContext, node: &TreeNode) -> ServiceResult<bool> {
    let namespace = node.namespace()?;
    Ok(ctx
        .playground
        .open_template(PlaygroundTemplate::CreateIndex { namespace })
        .await?)
}

/// Open an insert playground pre-filled with a copy of the document, minus `_id`
pub(super) async fn clone_document(
    ctx: &AppContext,
    node: Option<TreeNode>,
) -> ServiceResult<bool> {
    let Some(node) = node else {
        return missing_node(ctx, "document");
    };
    let namespace = node.namespace()?;
    let mut document = match ctx
        .data
        .find_document(&node.connection_id, &namespace, node.item()?)
        .await
    {
        Ok(Some(document)) => document,
        Ok(None) => return advise(ctx, "Unable to find the document; it may have been deleted."),
        Err(e) => return report_failure(ctx, "Fetching the document", e),
    };
    if let Some(fields) = document.as_object_mut() {
        fields.remove("_id");
    }
    Ok(ctx
        .playground
        .open_template(PlaygroundTemplate::CloneDocument {
            namespace,
            document,
        })
        .await?)
}
