//! Tests for the explorer tree

use super::*;
use async_trait::async_trait;
use mongolens_core::{
    CollectionInfo, DocumentSummary, FieldInfo, IndexInfo, IndexKeys, MongolensError,
};
use parking_lot::Mutex;
use pretty_assertions::assert_eq;
use std::collections::HashMap;

/// Data service over fixed collections that counts list calls
#[derive(Default)]
struct MockData {
    databases: Mutex<Vec<String>>,
    documents: Mutex<Vec<String>>,
    calls: Mutex<HashMap<&'static str, usize>>,
    last_limit: Mutex<Option<usize>>,
    fail: Mutex<bool>,
}

impl MockData {
    fn count(&self, call: &'static str) -> usize {
        self.calls.lock().get(call).copied().unwrap_or(0)
    }

    fn record(&self, call: &'static str) -> Result<()> {
        *self.calls.lock().entry(call).or_default() += 1;
        if *self.fail.lock() {
            return Err(MongolensError::Driver("connection reset".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl DataService for MockData {
    async fn list_databases(&self, _: &ConnectionId) -> Result<Vec<String>> {
        self.record("list_databases")?;
        Ok(self.databases.lock().clone())
    }

    async fn list_collections(&self, _: &ConnectionId, _: &str) -> Result<Vec<CollectionInfo>> {
        self.record("list_collections")?;
        Ok(vec![CollectionInfo::collection("orders")])
    }

    async fn list_documents(
        &self,
        _: &ConnectionId,
        _: &Namespace,
        limit: usize,
    ) -> Result<Vec<DocumentSummary>> {
        self.record("list_documents")?;
        *self.last_limit.lock() = Some(limit);
        Ok(self
            .documents
            .lock()
            .iter()
            .map(|id| DocumentSummary { id: id.clone() })
            .collect())
    }

    async fn find_document(
        &self,
        _: &ConnectionId,
        _: &Namespace,
        _: &str,
    ) -> Result<Option<serde_json::Value>> {
        Ok(None)
    }

    async fn sample_fields(
        &self,
        _: &ConnectionId,
        _: &Namespace,
        _: usize,
    ) -> Result<Vec<FieldInfo>> {
        self.record("sample_fields")?;
        Ok(vec![FieldInfo {
            path: "total".into(),
            types: vec!["int".into(), "double".into()],
        }])
    }

    async fn list_indexes(&self, _: &ConnectionId, _: &Namespace) -> Result<Vec<IndexInfo>> {
        self.record("list_indexes")?;
        Ok(vec![IndexInfo {
            name: "_id_".into(),
            keys: IndexKeys::from([("_id".to_string(), serde_json::json!(1))]),
        }])
    }

    async fn create_collection(&self, _: &ConnectionId, _: &Namespace) -> Result<()> {
        Ok(())
    }

    async fn drop_database(&self, _: &ConnectionId, _: &str) -> Result<()> {
        Ok(())
    }

    async fn drop_collection(&self, _: &ConnectionId, _: &Namespace) -> Result<()> {
        Ok(())
    }

    async fn delete_document(&self, _: &ConnectionId, _: &Namespace, _: &str) -> Result<bool> {
        Ok(true)
    }

    async fn create_index(&self, _: &ConnectionId, _: &Namespace, _: &IndexKeys) -> Result<String> {
        Ok("index_1".into())
    }
}

fn setup() -> (ExplorerTree, Arc<MockData>) {
    let data = Arc::new(MockData::default());
    *data.databases.lock() = vec!["shop".into(), "crm".into()];
    *data.documents.lock() = vec!["1".into(), "2".into()];
    let tree = ExplorerTree::new(data.clone(), TreeLimits::default());
    (tree, data)
}

fn connection() -> TreeNode {
    TreeNode::connection(ConnectionId::from("c1"), "local")
}

fn orders() -> Namespace {
    Namespace::new("shop", "orders")
}

#[tokio::test]
async fn test_children_are_cached() {
    let (tree, data) = setup();

    let first = tree.children(&connection()).await.unwrap();
    let second = tree.children(&connection()).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(
        first.iter().map(|n| n.label.as_str()).collect::<Vec<_>>(),
        vec!["shop", "crm"]
    );
    assert_eq!(data.count("list_databases"), 1);
}

#[tokio::test]
async fn test_reset_cache_then_expand_fetches_fresh_children() {
    let (tree, data) = setup();
    tree.children(&connection()).await.unwrap();

    *data.databases.lock() = vec!["shop".into()];
    tree.reset_cache(&connection());
    let children = tree.children(&connection()).await.unwrap();

    assert_eq!(data.count("list_databases"), 2);
    assert_eq!(children, vec![TreeNode::database(ConnectionId::from("c1"), "shop")]);
}

#[tokio::test]
async fn test_reset_cache_clears_descendants() {
    let (tree, data) = setup();
    let id = ConnectionId::from("c1");
    let documents = TreeNode::document_list(id.clone(), &orders());
    tree.children(&TreeNode::database(id.clone(), "shop")).await.unwrap();
    tree.children(&documents).await.unwrap();

    tree.reset_cache(&TreeNode::database(id.clone(), "shop"));
    tree.children(&documents).await.unwrap();

    assert_eq!(data.count("list_documents"), 2);
}

#[tokio::test]
async fn test_collection_children_are_fixed() {
    let (tree, data) = setup();
    let id = ConnectionId::from("c1");

    let children = tree
        .children(&TreeNode::collection(id.clone(), &orders()))
        .await
        .unwrap();

    assert_eq!(
        children.iter().map(|n| n.kind).collect::<Vec<_>>(),
        vec![NodeKind::DocumentList, NodeKind::Schema, NodeKind::IndexList]
    );
    assert!(data.calls.lock().is_empty());
}

#[tokio::test]
async fn test_leaf_nodes_have_no_children() {
    let (tree, _) = setup();
    let node = TreeNode::document(ConnectionId::from("c1"), &orders(), "1");
    assert!(tree.children(&node).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_document_list_uses_limit() {
    let data = Arc::new(MockData::default());
    let tree = ExplorerTree::new(
        data.clone(),
        TreeLimits {
            document_limit: 3,
            schema_sample_size: 50,
        },
    );

    tree.children(&TreeNode::document_list(ConnectionId::from("c1"), &orders()))
        .await
        .unwrap();

    assert_eq!(*data.last_limit.lock(), Some(3));
}

#[tokio::test]
async fn test_schema_and_index_children() {
    let (tree, _) = setup();
    let id = ConnectionId::from("c1");

    let fields = tree.children(&TreeNode::schema(id.clone(), &orders())).await.unwrap();
    assert_eq!(fields[0].label, "total: int | double");
    assert_eq!(fields[0].item.as_deref(), Some("total"));

    let indexes = tree
        .children(&TreeNode::index_list(id, &orders()))
        .await
        .unwrap();
    assert_eq!(indexes[0].item.as_deref(), Some("_id_"));
}

#[tokio::test]
async fn test_failed_fetch_is_not_cached() {
    let (tree, data) = setup();
    *data.fail.lock() = true;

    assert!(tree.children(&connection()).await.is_err());
    assert!(tree.cache().is_empty());

    *data.fail.lock() = false;
    assert_eq!(tree.children(&connection()).await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_reset_connection_only_touches_that_connection() {
    let (tree, _) = setup();
    let other = TreeNode::connection(ConnectionId::from("c2"), "remote");
    tree.children(&connection()).await.unwrap();
    tree.children(&other).await.unwrap();

    assert_eq!(tree.reset_connection(&ConnectionId::from("c1")), 1);
    assert!(tree.cache().get(&other.key()).is_some());
}

#[tokio::test]
async fn test_refresh_is_counted_and_broadcast() {
    let (tree, _) = setup();
    let mut events = tree.subscribe();

    tree.refresh();

    assert_eq!(tree.refresh_count(), 1);
    assert_eq!(events.recv().await.unwrap(), TreeEvent::Refreshed { generation: 1 });
}
