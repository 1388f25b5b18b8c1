//! Host controllers that commands delegate to
//!
//! Playground execution, editors, webviews and shells are implemented by the
//! host. Each method reports whether the host carried the action out.

use async_trait::async_trait;

use crate::{ConnectionId, DocumentSource, Language, Namespace, Result};

/// Pre-filled playground content opened from the tree
#[derive(Clone, Debug, PartialEq)]
pub enum PlaygroundTemplate {
    /// `db.getCollection(..).find({})`
    SearchDocuments { namespace: Namespace },
    /// `db.getCollection(..).insertOne({})`
    InsertDocument { namespace: Namespace },
    /// `insertOne` pre-filled with an existing document minus its `_id`
    CloneDocument {
        namespace: Namespace,
        document: serde_json::Value,
    },
    /// `db.getCollection(..).createIndex({})`
    CreateIndex { namespace: Namespace },
}

#[async_trait]
pub trait PlaygroundController: Send + Sync {
    async fn create_playground(&self) -> Result<bool>;

    async fn run_selected_blocks(&self) -> Result<bool>;

    async fn run_all_blocks(&self) -> Result<bool>;

    async fn open_template(&self, template: PlaygroundTemplate) -> Result<bool>;

    async fn export_to_language(&self, language: Language) -> Result<bool>;
}

#[async_trait]
pub trait EditorController: Send + Sync {
    async fn open_collection_documents(
        &self,
        connection_id: &ConnectionId,
        namespace: &Namespace,
    ) -> Result<bool>;

    async fn open_document(
        &self,
        connection_id: &ConnectionId,
        namespace: &Namespace,
        document_id: &str,
        source: DocumentSource,
    ) -> Result<bool>;

    async fn save_active_document(&self) -> Result<bool>;

    async fn insert_text_at_cursor(&self, text: &str) -> Result<bool>;
}

#[async_trait]
pub trait WebviewController: Send + Sync {
    async fn open_overview_page(&self) -> Result<bool>;

    async fn open_connect_form(&self) -> Result<bool>;

    async fn open_edit_connection_form(&self, connection_id: &ConnectionId) -> Result<bool>;
}

#[async_trait]
pub trait ShellLauncher: Send + Sync {
    async fn launch(&self, connection_string: &str) -> Result<bool>;
}
