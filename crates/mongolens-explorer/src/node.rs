//! Tree nodes

use mongolens_core::{ConnectionId, MongolensError, Namespace, Result};
use serde::{Deserialize, Serialize};
use strum::Display;

/// What a tree node represents
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[strum(serialize_all = "camelCase")]
#[serde(rename_all = "camelCase")]
pub enum NodeKind {
    Connection,
    Database,
    Collection,
    DocumentList,
    Document,
    Schema,
    Field,
    IndexList,
    Index,
}

impl NodeKind {
    /// Whether the kind sits below a collection
    fn is_under_collection(self) -> bool {
        matches!(
            self,
            Self::DocumentList
                | Self::Document
                | Self::Schema
                | Self::Field
                | Self::IndexList
                | Self::Index
        )
    }

    /// Whether nodes of this kind never have children
    pub fn is_leaf(self) -> bool {
        matches!(self, Self::Document | Self::Field | Self::Index)
    }

    fn needs_database(self) -> bool {
        self != Self::Connection
    }

    fn needs_collection(self) -> bool {
        self == Self::Collection || self.is_under_collection()
    }

    fn needs_item(self) -> bool {
        self.is_leaf()
    }
}

/// Identity of a node, ignoring its display label
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct NodeKey {
    pub connection_id: ConnectionId,
    pub kind: NodeKind,
    pub database: Option<String>,
    pub collection: Option<String>,
    pub item: Option<String>,
}

impl NodeKey {
    /// Whether `other` is this node or lies in its subtree
    pub fn contains(&self, other: &NodeKey) -> bool {
        if self == other {
            return true;
        }
        if self.connection_id != other.connection_id {
            return false;
        }
        let same_database = self.database == other.database;
        let same_namespace = same_database && self.collection == other.collection;
        match self.kind {
            NodeKind::Connection => other.kind != NodeKind::Connection,
            NodeKind::Database => {
                same_database && !matches!(other.kind, NodeKind::Connection | NodeKind::Database)
            }
            NodeKind::Collection => same_namespace && other.kind.is_under_collection(),
            NodeKind::DocumentList => same_namespace && other.kind == NodeKind::Document,
            NodeKind::Schema => same_namespace && other.kind == NodeKind::Field,
            NodeKind::IndexList => same_namespace && other.kind == NodeKind::Index,
            NodeKind::Document | NodeKind::Field | NodeKind::Index => false,
        }
    }
}

/// A node of the explorer tree
///
/// This is also the shape of the tree-item argument that tree commands
/// receive from the host.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeNode {
    pub connection_id: ConnectionId,
    pub kind: NodeKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection: Option<String>,
    /// Document id, field path, or index name for leaf nodes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item: Option<String>,
    #[serde(default)]
    pub label: String,
}

impl TreeNode {
    fn build(
        connection_id: ConnectionId,
        kind: NodeKind,
        database: Option<String>,
        collection: Option<String>,
        item: Option<String>,
        label: String,
    ) -> Self {
        Self {
            connection_id,
            kind,
            database,
            collection,
            item,
            label,
        }
    }

    pub fn connection(connection_id: ConnectionId, label: impl Into<String>) -> Self {
        Self::build(connection_id, NodeKind::Connection, None, None, None, label.into())
    }

    pub fn database(connection_id: ConnectionId, database: impl Into<String>) -> Self {
        let database = database.into();
        let label = database.clone();
        Self::build(connection_id, NodeKind::Database, Some(database), None, None, label)
    }

    pub fn collection(connection_id: ConnectionId, namespace: &Namespace) -> Self {
        Self::build(
            connection_id,
            NodeKind::Collection,
            Some(namespace.database.clone()),
            Some(namespace.collection.clone()),
            None,
            namespace.collection.clone(),
        )
    }

    pub fn document_list(connection_id: ConnectionId, namespace: &Namespace) -> Self {
        Self::under_collection(connection_id, NodeKind::DocumentList, namespace, None, "Documents")
    }

    pub fn schema(connection_id: ConnectionId, namespace: &Namespace) -> Self {
        Self::under_collection(connection_id, NodeKind::Schema, namespace, None, "Schema")
    }

    pub fn index_list(connection_id: ConnectionId, namespace: &Namespace) -> Self {
        Self::under_collection(connection_id, NodeKind::IndexList, namespace, None, "Indexes")
    }

    /// A document, identified by its `_id` as relaxed Extended JSON
    pub fn document(connection_id: ConnectionId, namespace: &Namespace, id: &str) -> Self {
        Self::under_collection(connection_id, NodeKind::Document, namespace, Some(id), id)
    }

    pub fn field(connection_id: ConnectionId, namespace: &Namespace, path: &str, label: &str) -> Self {
        Self::under_collection(connection_id, NodeKind::Field, namespace, Some(path), label)
    }

    pub fn index(connection_id: ConnectionId, namespace: &Namespace, name: &str) -> Self {
        Self::under_collection(connection_id, NodeKind::Index, namespace, Some(name), name)
    }

    fn under_collection(
        connection_id: ConnectionId,
        kind: NodeKind,
        namespace: &Namespace,
        item: Option<&str>,
        label: &str,
    ) -> Self {
        Self::build(
            connection_id,
            kind,
            Some(namespace.database.clone()),
            Some(namespace.collection.clone()),
            item.map(str::to_string),
            label.to_string(),
        )
    }

    pub fn key(&self) -> NodeKey {
        NodeKey {
            connection_id: self.connection_id.clone(),
            kind: self.kind,
            database: self.database.clone(),
            collection: self.collection.clone(),
            item: self.item.clone(),
        }
    }

    /// Check that the node carries every part its kind requires
    pub fn validate(&self) -> Result<()> {
        let missing = |part: &str| {
            MongolensError::InvalidArgument(format!("{} node is missing its {part}", self.kind))
        };
        if self.kind.needs_database() && self.database.as_deref().is_none_or(str::is_empty) {
            return Err(missing("database"));
        }
        if self.kind.needs_collection() && self.collection.as_deref().is_none_or(str::is_empty) {
            return Err(missing("collection"));
        }
        if self.kind.needs_item() && self.item.is_none() {
            return Err(missing("item"));
        }
        Ok(())
    }

    pub fn database_name(&self) -> Result<&str> {
        self.database.as_deref().ok_or_else(|| {
            MongolensError::InvalidArgument(format!("{} node has no database", self.kind))
        })
    }

    /// The collection namespace this node belongs to
    pub fn namespace(&self) -> Result<Namespace> {
        match (&self.database, &self.collection) {
            (Some(database), Some(collection)) => Ok(Namespace::new(database, collection)),
            _ => Err(MongolensError::InvalidArgument(format!(
                "{} node has no collection namespace",
                self.kind
            ))),
        }
    }

    pub fn item(&self) -> Result<&str> {
        self.item.as_deref().ok_or_else(|| {
            MongolensError::InvalidArgument(format!("{} node has no item", self.kind))
        })
    }
}
