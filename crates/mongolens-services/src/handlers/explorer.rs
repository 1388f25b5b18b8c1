//! Tree commands on databases, collections and documents

use mongolens_core::{
    DocumentSource, MongolensError, Namespace, validate_collection_name, validate_database_name,
};
use mongolens_explorer::TreeNode;

use super::{
    advise, copy_to_clipboard, ensure_connection_ready, missing_node, mutation_succeeded,
    report_failure,
};
use crate::command::CreateIndexArgs;
use crate::{AppContext, ServiceResult};

pub(super) async fn copy_database_name(
    ctx: &AppContext,
    node: Option<TreeNode>,
) -> ServiceResult<bool> {
    let Some(node) = node else {
        return missing_node(ctx, "database");
    };
    copy_to_clipboard(ctx, node.database_name()?, "database name").await
}

pub(super) async fn copy_collection_name(
    ctx: &AppContext,
    node: Option<TreeNode>,
) -> ServiceResult<bool> {
    let Some(node) = node else {
        return missing_node(ctx, "collection");
    };
    let namespace = node.namespace()?;
    copy_to_clipboard(ctx, &namespace.collection, "collection name").await
}

/// Ask for a name, validating it; `None` when cancelled or invalid
async fn ask_name(
    ctx: &AppContext,
    prompt: &str,
    placeholder: &str,
    validate: fn(&str) -> mongolens_core::Result<()>,
) -> Option<String> {
    let name = ctx.prompt.input_box(prompt, Some(placeholder)).await?;
    let name = name.trim().to_string();
    if let Err(e) = validate(&name) {
        ctx.notifier.show_warning(&e.to_string());
        return None;
    }
    Some(name)
}

/// Ask the user to type `expected` back before a drop
async fn confirm_drop(ctx: &AppContext, kind: &str, expected: &str) -> bool {
    if !ctx.settings.confirm_drop {
        return true;
    }
    let question = format!(
        "Are you sure you wish to drop this {kind}? Enter the {kind} name '{expected}' to confirm."
    );
    match ctx.prompt.input_box(&question, Some(expected)).await {
        Some(answer) if answer.trim() == expected => true,
        Some(_) => {
            ctx.notifier.show_warning(&format!(
                "The name entered did not match the {kind} name."
            ));
            false
        }
        None => false,
    }
}

#[tracing::instrument(skip_all)]
pub(super) async fn add_database(ctx: &AppContext, node: Option<TreeNode>) -> ServiceResult<bool> {
    let Some(node) = node else {
        return missing_node(ctx, "connection");
    };
    if let Err(message) = ensure_connection_ready(ctx, &node.connection_id, "add a database") {
        return advise(ctx, &message);
    }

    let Some(database) = ask_name(
        ctx,
        "Database name (a database is created with its first collection)",
        "e.g. myNewDB",
        validate_database_name,
    )
    .await
    else {
        return Ok(false);
    };
    let Some(collection) = ask_name(
        ctx,
        "Collection name",
        "e.g. myNewCollection",
        validate_collection_name,
    )
    .await
    else {
        return Ok(false);
    };

    let namespace = Namespace::new(database, collection);
    if let Err(e) = ctx.data.create_collection(&node.connection_id, &namespace).await {
        return report_failure(ctx, "Create database", e);
    }
    mutation_succeeded(
        ctx,
        &node,
        &format!(
            "Database {} and collection {} created.",
            namespace.database, namespace.collection
        ),
    )
}

#[tracing::instrument(skip_all)]
pub(super) async fn add_collection(ctx: &AppContext, node: Option<TreeNode>) -> ServiceResult<bool> {
    let Some(node) = node else {
        return missing_node(ctx, "database");
    };
    if let Err(message) = ensure_connection_ready(ctx, &node.connection_id, "add a collection") {
        return advise(ctx, &message);
    }
    let database = node.database_name()?;

    let Some(collection) = ask_name(
        ctx,
        "Collection name",
        "e.g. myNewCollection",
        validate_collection_name,
    )
    .await
    else {
        return Ok(false);
    };

    let namespace = Namespace::new(database, collection);
    if let Err(e) = ctx.data.create_collection(&node.connection_id, &namespace).await {
        return report_failure(ctx, "Create collection", e);
    }
    mutation_succeeded(
        ctx,
        &node,
        &format!("Collection {} created.", namespace),
    )
}

#[tracing::instrument(skip_all)]
pub(super) async fn drop_database(ctx: &AppContext, node: Option<TreeNode>) -> ServiceResult<bool> {
    let Some(node) = node else {
        return missing_node(ctx, "database");
    };
    if let Err(message) = ensure_connection_ready(ctx, &node.connection_id, "drop a database") {
        return advise(ctx, &message);
    }
    let database = node.database_name()?;
    if !confirm_drop(ctx, "database", database).await {
        return Ok(false);
    }

    if let Err(e) = ctx.data.drop_database(&node.connection_id, database).await {
        return report_failure(ctx, "Drop database", e);
    }
    let parent = TreeNode::connection(node.connection_id.clone(), "");
    mutation_succeeded(ctx, &parent, &format!("Database {database} dropped."))
}

#[tracing::instrument(skip_all)]
pub(super) async fn drop_collection(
    ctx: &AppContext,
    node: Option<TreeNode>,
) -> ServiceResult<bool> {
    let Some(node) = node else {
        return missing_node(ctx, "collection");
    };
    if let Err(message) = ensure_connection_ready(ctx, &node.connection_id, "drop a collection") {
        return advise(ctx, &message);
    }
    let namespace = node.namespace()?;
    if !confirm_drop(ctx, "collection", &namespace.collection).await {
        return Ok(false);
    }

    if let Err(e) = ctx.data.drop_collection(&node.connection_id, &namespace).await {
        return report_failure(ctx, "Drop collection", e);
    }
    let parent = TreeNode::database(node.connection_id.clone(), namespace.database.clone());
    mutation_succeeded(
        ctx,
        &parent,
        &format!("Collection {} dropped.", namespace.collection),
    )
}

pub(super) async fn view_collection_documents(
    ctx: &AppContext,
    node: Option<TreeNode>,
) -> ServiceResult<bool> {
    let Some(node) = node else {
        return missing_node(ctx, "collection");
    };
    let namespace = node.namespace()?;
    Ok(ctx
        .editor
        .open_collection_documents(&node.connection_id, &namespace)
        .await?)
}

/// Create an index from explicit keys, or open the index template without them
#[tracing::instrument(skip_all)]
pub(super) async fn create_index(ctx: &AppContext, args: CreateIndexArgs) -> ServiceResult<bool> {
    let Some(node) = args.node else {
        return missing_node(ctx, "collection");
    };
    let Some(keys) = args.keys else {
        return super::playground::create_index_template(ctx, &node).await;
    };
    if let Err(message) = ensure_connection_ready(ctx, &node.connection_id, "create an index") {
        return advise(ctx, &message);
    }

    let namespace = node.namespace()?;
    let name = match ctx
        .data
        .create_index(&node.connection_id, &namespace, &keys)
        .await
    {
        Ok(name) => name,
        Err(e) => return report_failure(ctx, "Create index", e),
    };
    let indexes = TreeNode::index_list(node.connection_id.clone(), &namespace);
    mutation_succeeded(ctx, &indexes, &format!("Index {name} created."))
}

pub(super) async fn open_document(ctx: &AppContext, node: Option<TreeNode>) -> ServiceResult<bool> {
    let Some(node) = node else {
        return missing_node(ctx, "document");
    };
    let namespace = node.namespace()?;
    let opened = ctx
        .editor
        .open_document(
            &node.connection_id,
            &namespace,
            node.item()?,
            DocumentSource::TreeView,
        )
        .await?;
    if opened {
        super::track_document_opened(ctx, DocumentSource::TreeView);
    }
    Ok(opened)
}

pub(super) async fn copy_document_contents(
    ctx: &AppContext,
    node: Option<TreeNode>,
) -> ServiceResult<bool> {
    let Some(node) = node else {
        return missing_node(ctx, "document");
    };
    let namespace = node.namespace()?;
    let document = match ctx
        .data
        .find_document(&node.connection_id, &namespace, node.item()?)
        .await
    {
        Ok(Some(document)) => document,
        Ok(None) => return advise(ctx, "Unable to find the document; it may have been deleted."),
        Err(e) => return report_failure(ctx, "Fetching the document", e),
    };
    let text = serde_json::to_string_pretty(&document).map_err(MongolensError::from)?;
    copy_to_clipboard(ctx, &text, "document").await
}

#[tracing::instrument(skip_all)]
pub(super) async fn delete_document(
    ctx: &AppContext,
    node: Option<TreeNode>,
) -> ServiceResult<bool> {
    let Some(node) = node else {
        return missing_node(ctx, "document");
    };
    if let Err(message) = ensure_connection_ready(ctx, &node.connection_id, "delete a document") {
        return advise(ctx, &message);
    }
    let namespace = node.namespace()?;
    let document_id = node.item()?;

    if ctx.settings.confirm_delete_document {
        let question = format!("Are you sure you wish to delete this document ({document_id})?");
        if !ctx.prompt.confirm(&question).await {
            return Ok(false);
        }
    }

    match ctx
        .data
        .delete_document(&node.connection_id, &namespace, document_id)
        .await
    {
        Ok(true) => {}
        Ok(false) => {
            return report_failure(ctx, "Delete document", "the document no longer exists");
        }
        Err(e) => return report_failure(ctx, "Delete document", e),
    }
    let documents = TreeNode::document_list(node.connection_id.clone(), &namespace);
    mutation_succeeded(ctx, &documents, "Document successfully deleted.")
}
