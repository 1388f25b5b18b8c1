//! Database driver traits
//!
//! The driver is an external collaborator: MongoLens only decides *when* to
//! talk to the server, never *how*. Every data call names the connection it
//! targets so that a driver can keep one client per saved connection.

use async_trait::async_trait;

use crate::{
    CollectionInfo, ConnectionId, DocumentSummary, FieldInfo, IndexInfo, IndexKeys, Namespace,
    Result, SavedConnection,
};

/// Opens and closes server sessions
#[async_trait]
pub trait ConnectionDriver: Send + Sync {
    /// Establish a session for a saved connection
    async fn connect(&self, connection: &SavedConnection) -> Result<()>;

    /// Tear down the session of a connection
    ///
    /// Tearing down a connection that has no session is not an error.
    async fn disconnect(&self, connection_id: &ConnectionId) -> Result<()>;
}

/// Reads and mutates server objects on behalf of the explorer and commands
#[async_trait]
pub trait DataService: Send + Sync {
    async fn list_databases(&self, connection_id: &ConnectionId) -> Result<Vec<String>>;

    async fn list_collections(
        &self,
        connection_id: &ConnectionId,
        database: &str,
    ) -> Result<Vec<CollectionInfo>>;

    async fn list_documents(
        &self,
        connection_id: &ConnectionId,
        namespace: &Namespace,
        limit: usize,
    ) -> Result<Vec<DocumentSummary>>;

    /// Fetch one document as relaxed Extended JSON
    ///
    /// `document_id` is the `_id` in the same Extended JSON form that
    /// `list_documents` returns.
    async fn find_document(
        &self,
        connection_id: &ConnectionId,
        namespace: &Namespace,
        document_id: &str,
    ) -> Result<Option<serde_json::Value>>;

    async fn sample_fields(
        &self,
        connection_id: &ConnectionId,
        namespace: &Namespace,
        sample_size: usize,
    ) -> Result<Vec<FieldInfo>>;

    async fn list_indexes(
        &self,
        connection_id: &ConnectionId,
        namespace: &Namespace,
    ) -> Result<Vec<IndexInfo>>;

    async fn create_collection(
        &self,
        connection_id: &ConnectionId,
        namespace: &Namespace,
    ) -> Result<()>;

    async fn drop_database(&self, connection_id: &ConnectionId, database: &str) -> Result<()>;

    async fn drop_collection(
        &self,
        connection_id: &ConnectionId,
        namespace: &Namespace,
    ) -> Result<()>;

    /// Delete one document; returns whether a document was removed
    async fn delete_document(
        &self,
        connection_id: &ConnectionId,
        namespace: &Namespace,
        document_id: &str,
    ) -> Result<bool>;

    /// Create an index and return its name
    async fn create_index(
        &self,
        connection_id: &ConnectionId,
        namespace: &Namespace,
        keys: &IndexKeys,
    ) -> Result<String>;
}
