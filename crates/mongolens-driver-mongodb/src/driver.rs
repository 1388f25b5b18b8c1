//! MongoDB driver implementation

use async_trait::async_trait;
use bson::{Bson, Document, doc};
use futures::TryStreamExt;
use mongodb::{Client, IndexModel, results::CollectionType};
use mongolens_core::{
    CollectionInfo, CollectionKind, ConnectionDriver, ConnectionId, DataService, DocumentSummary,
    FieldInfo, IndexInfo, IndexKeys, MongolensError, Namespace, Result, SavedConnection,
};
use parking_lot::RwLock;
use std::collections::HashMap;

use crate::schema::infer_fields;

/// MongoDB database driver
///
/// Keeps one `Client` per connected saved connection. Clients are cheap to
/// clone, so calls take a clone out of the map and never hold the lock
/// across an await.
pub struct MongoDbDriver {
    clients: RwLock<HashMap<ConnectionId, Client>>,
}

impl MongoDbDriver {
    pub fn new() -> Self {
        tracing::debug!("MongoDB driver initialized");
        Self {
            clients: RwLock::new(HashMap::new()),
        }
    }

    pub fn is_connected(&self, connection_id: &ConnectionId) -> bool {
        self.clients.read().contains_key(connection_id)
    }

    fn client(&self, connection_id: &ConnectionId) -> Result<Client> {
        self.clients
            .read()
            .get(connection_id)
            .cloned()
            .ok_or_else(|| {
                MongolensError::Connection(format!("connection {connection_id} is not connected"))
            })
    }

    fn collection(
        &self,
        connection_id: &ConnectionId,
        namespace: &Namespace,
    ) -> Result<mongodb::Collection<Document>> {
        Ok(self
            .client(connection_id)?
            .database(&namespace.database)
            .collection(&namespace.collection))
    }
}

impl Default for MongoDbDriver {
    fn default() -> Self {
        Self::new()
    }
}

/// Wrap a driver error with what was being attempted
fn driver_error(action: &'static str) -> impl Fn(mongodb::error::Error) -> MongolensError {
    move |e| MongolensError::Driver(format!("Failed to {action}: {e}"))
}

/// Render an `_id` as relaxed Extended JSON text
pub fn document_id_to_string(id: &Bson) -> String {
    id.clone().into_relaxed_extjson().to_string()
}

/// Parse an `_id` rendered by [`document_id_to_string`] back into a filter
pub fn id_filter(document_id: &str) -> Result<Document> {
    let json: serde_json::Value = serde_json::from_str(document_id).map_err(|e| {
        MongolensError::InvalidArgument(format!("document id is not Extended JSON: {e}"))
    })?;
    let id = Bson::try_from(json).map_err(|e| {
        MongolensError::InvalidArgument(format!("document id is not a BSON value: {e}"))
    })?;
    Ok(doc! { "_id": id })
}

pub fn keys_to_document(keys: &IndexKeys) -> Result<Document> {
    if keys.is_empty() {
        return Err(MongolensError::InvalidArgument(
            "an index needs at least one key".to_string(),
        ));
    }
    let mut document = Document::new();
    for (field, direction) in keys {
        let direction = Bson::try_from(direction.clone()).map_err(|e| {
            MongolensError::InvalidArgument(format!("invalid direction for {field}: {e}"))
        })?;
        document.insert(field.clone(), direction);
    }
    Ok(document)
}

pub fn document_to_keys(document: &Document) -> IndexKeys {
    document
        .iter()
        .map(|(field, value)| (field.clone(), value.clone().into_relaxed_extjson()))
        .collect()
}

fn collection_kind(kind: &CollectionType) -> CollectionKind {
    match kind {
        CollectionType::View => CollectionKind::View,
        CollectionType::Timeseries => CollectionKind::Timeseries,
        _ => CollectionKind::Collection,
    }
}

#[async_trait]
impl ConnectionDriver for MongoDbDriver {
    #[tracing::instrument(skip(self, connection), fields(connection_id = %connection.id))]
    async fn connect(&self, connection: &SavedConnection) -> Result<()> {
        tracing::debug!(uri = %connection.redacted_connection_string(), "connecting to MongoDB");

        let client = Client::with_uri_str(&connection.connection_string)
            .await
            .map_err(driver_error("parse MongoDB options"))?;

        // Test the connection before keeping the client
        client
            .database("admin")
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(driver_error("connect to MongoDB"))?;

        let previous = self.clients.write().insert(connection.id.clone(), client);
        if let Some(previous) = previous {
            previous.shutdown().await;
        }
        tracing::info!("connected to MongoDB");
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn disconnect(&self, connection_id: &ConnectionId) -> Result<()> {
        let client = self.clients.write().remove(connection_id);
        match client {
            Some(client) => {
                client.shutdown().await;
                tracing::info!("disconnected from MongoDB");
            }
            None => tracing::debug!("no session to tear down"),
        }
        Ok(())
    }
}

#[async_trait]
impl DataService for MongoDbDriver {
    async fn list_databases(&self, connection_id: &ConnectionId) -> Result<Vec<String>> {
        let mut names = self
            .client(connection_id)?
            .list_database_names()
            .await
            .map_err(driver_error("list databases"))?;
        names.sort();
        Ok(names)
    }

    async fn list_collections(
        &self,
        connection_id: &ConnectionId,
        database: &str,
    ) -> Result<Vec<CollectionInfo>> {
        let specifications: Vec<_> = self
            .client(connection_id)?
            .database(database)
            .list_collections()
            .await
            .map_err(driver_error("list collections"))?
            .try_collect()
            .await
            .map_err(driver_error("list collections"))?;

        let mut collections: Vec<CollectionInfo> = specifications
            .into_iter()
            .map(|spec| CollectionInfo {
                kind: collection_kind(&spec.collection_type),
                name: spec.name,
            })
            .collect();
        collections.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(collections)
    }

    #[tracing::instrument(skip(self), fields(namespace = %namespace))]
    async fn list_documents(
        &self,
        connection_id: &ConnectionId,
        namespace: &Namespace,
        limit: usize,
    ) -> Result<Vec<DocumentSummary>> {
        let documents: Vec<Document> = self
            .collection(connection_id, namespace)?
            .find(doc! {})
            .projection(doc! { "_id": 1 })
            .limit(i64::try_from(limit).unwrap_or(i64::MAX))
            .await
            .map_err(driver_error("list documents"))?
            .try_collect()
            .await
            .map_err(driver_error("list documents"))?;

        Ok(documents
            .iter()
            .filter_map(|document| document.get("_id"))
            .map(|id| DocumentSummary {
                id: document_id_to_string(id),
            })
            .collect())
    }

    async fn find_document(
        &self,
        connection_id: &ConnectionId,
        namespace: &Namespace,
        document_id: &str,
    ) -> Result<Option<serde_json::Value>> {
        let filter = id_filter(document_id)?;
        let document = self
            .collection(connection_id, namespace)?
            .find_one(filter)
            .await
            .map_err(driver_error("fetch document"))?;
        Ok(document.map(|document| Bson::Document(document).into_relaxed_extjson()))
    }

    #[tracing::instrument(skip(self), fields(namespace = %namespace))]
    async fn sample_fields(
        &self,
        connection_id: &ConnectionId,
        namespace: &Namespace,
        sample_size: usize,
    ) -> Result<Vec<FieldInfo>> {
        let size = i64::try_from(sample_size).unwrap_or(i64::MAX);
        let samples: Vec<Document> = self
            .collection(connection_id, namespace)?
            .aggregate(vec![doc! { "$sample": { "size": size } }])
            .await
            .map_err(driver_error("sample documents"))?
            .try_collect()
            .await
            .map_err(driver_error("sample documents"))?;

        tracing::debug!(sampled = samples.len(), "inferring schema");
        Ok(infer_fields(samples.iter()))
    }

    async fn list_indexes(
        &self,
        connection_id: &ConnectionId,
        namespace: &Namespace,
    ) -> Result<Vec<IndexInfo>> {
        let models: Vec<IndexModel> = self
            .collection(connection_id, namespace)?
            .list_indexes()
            .await
            .map_err(driver_error("list indexes"))?
            .try_collect()
            .await
            .map_err(driver_error("list indexes"))?;

        Ok(models
            .iter()
            .map(|model| IndexInfo {
                name: model
                    .options
                    .as_ref()
                    .and_then(|options| options.name.clone())
                    .unwrap_or_default(),
                keys: document_to_keys(&model.keys),
            })
            .collect())
    }

    #[tracing::instrument(skip(self), fields(namespace = %namespace))]
    async fn create_collection(
        &self,
        connection_id: &ConnectionId,
        namespace: &Namespace,
    ) -> Result<()> {
        namespace.validate()?;
        self.client(connection_id)?
            .database(&namespace.database)
            .create_collection(&namespace.collection)
            .await
            .map_err(driver_error("create collection"))
    }

    #[tracing::instrument(skip(self))]
    async fn drop_database(&self, connection_id: &ConnectionId, database: &str) -> Result<()> {
        self.client(connection_id)?
            .database(database)
            .drop()
            .await
            .map_err(driver_error("drop database"))
    }

    #[tracing::instrument(skip(self), fields(namespace = %namespace))]
    async fn drop_collection(
        &self,
        connection_id: &ConnectionId,
        namespace: &Namespace,
    ) -> Result<()> {
        self.collection(connection_id, namespace)?
            .drop()
            .await
            .map_err(driver_error("drop collection"))
    }

    #[tracing::instrument(skip(self), fields(namespace = %namespace))]
    async fn delete_document(
        &self,
        connection_id: &ConnectionId,
        namespace: &Namespace,
        document_id: &str,
    ) -> Result<bool> {
        let filter = id_filter(document_id)?;
        let result = self
            .collection(connection_id, namespace)?
            .delete_one(filter)
            .await
            .map_err(driver_error("delete document"))?;
        Ok(result.deleted_count == 1)
    }

    #[tracing::instrument(skip(self, keys), fields(namespace = %namespace))]
    async fn create_index(
        &self,
        connection_id: &ConnectionId,
        namespace: &Namespace,
        keys: &IndexKeys,
    ) -> Result<String> {
        let model = IndexModel::builder().keys(keys_to_document(keys)?).build();
        let result = self
            .collection(connection_id, namespace)?
            .create_index(model)
            .await
            .map_err(driver_error("create index"))?;
        Ok(result.index_name)
    }
}
