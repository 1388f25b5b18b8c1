//! Editor utilities: code lens documents and ObjectId generation

use bson::oid::ObjectId;
use mongolens_core::DocumentSource;

use super::{advise, copy_to_clipboard, report_failure};
use crate::command::CodeLensDocumentArgs;
use crate::{AppContext, ServiceResult};

pub(super) async fn open_code_lens_document(
    ctx: &AppContext,
    args: CodeLensDocumentArgs,
) -> ServiceResult<bool> {
    let connection_id = match args.connection_id.or_else(|| ctx.connections.active_connection_id()) {
        Some(id) => id,
        None => {
            return advise(ctx, "Please connect to a database before you open a document.");
        }
    };
    let opened = ctx
        .editor
        .open_document(
            &connection_id,
            &args.namespace,
            &args.document_id,
            DocumentSource::CodeLens,
        )
        .await?;
    if opened {
        super::track_document_opened(ctx, DocumentSource::CodeLens);
    }
    Ok(opened)
}

pub(super) async fn insert_object_id(ctx: &AppContext) -> ServiceResult<bool> {
    let id = ObjectId::new().to_hex();
    match ctx.editor.insert_text_at_cursor(&id).await {
        Ok(inserted) => Ok(inserted),
        Err(e) => report_failure(ctx, "Inserting an ObjectId", e),
    }
}

pub(super) async fn copy_object_id(ctx: &AppContext) -> ServiceResult<bool> {
    let id = ObjectId::new().to_hex();
    copy_to_clipboard(ctx, &id, "ObjectId").await
}
