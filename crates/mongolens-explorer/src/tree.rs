//! Lazily populated explorer tree

use mongolens_core::{ConnectionId, DataService, Namespace, Result};
use std::sync::Arc;
use tokio::sync::broadcast;

use crate::{ExplorerCache, NodeKind, RefreshBus, TreeEvent, TreeNode};

/// How much data an expansion fetches
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TreeLimits {
    /// Documents listed under a collection
    pub document_limit: usize,
    /// Documents sampled to discover schema fields
    pub schema_sample_size: usize,
}

impl Default for TreeLimits {
    fn default() -> Self {
        Self {
            document_limit: 10,
            schema_sample_size: 100,
        }
    }
}

/// Tree view model over a [`DataService`]
///
/// Expanding a node returns its cached children or fetches them. Mutating
/// commands call [`reset_cache`](Self::reset_cache) on the affected node and
/// then [`refresh`](Self::refresh).
pub struct ExplorerTree {
    data: Arc<dyn DataService>,
    cache: ExplorerCache,
    bus: RefreshBus,
    limits: TreeLimits,
}

impl ExplorerTree {
    pub fn new(data: Arc<dyn DataService>, limits: TreeLimits) -> Self {
        Self {
            data,
            cache: ExplorerCache::new(),
            bus: RefreshBus::new(),
            limits,
        }
    }

    pub fn limits(&self) -> TreeLimits {
        self.limits
    }

    pub fn cache(&self) -> &ExplorerCache {
        &self.cache
    }

    /// Children of `node`, from the cache when present
    #[tracing::instrument(skip(self, node), fields(kind = %node.kind, connection_id = %node.connection_id))]
    pub async fn children(&self, node: &TreeNode) -> Result<Vec<TreeNode>> {
        if node.kind.is_leaf() {
            return Ok(Vec::new());
        }
        if node.kind == NodeKind::Collection {
            let namespace = node.namespace()?;
            let id = node.connection_id.clone();
            return Ok(vec![
                TreeNode::document_list(id.clone(), &namespace),
                TreeNode::schema(id.clone(), &namespace),
                TreeNode::index_list(id, &namespace),
            ]);
        }

        let key = node.key();
        if let Some(cached) = self.cache.get(&key) {
            return Ok(cached.to_vec());
        }

        let ticket = self.cache.begin_load(&key);
        match self.fetch(node).await {
            Ok(children) => {
                tracing::debug!(count = children.len(), "children fetched");
                let children: Arc<[TreeNode]> = children.into();
                self.cache.finish_load(&key, ticket, children.clone());
                Ok(children.to_vec())
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to fetch children");
                self.cache.abort_load(&key, ticket);
                Err(e)
            }
        }
    }

    async fn fetch(&self, node: &TreeNode) -> Result<Vec<TreeNode>> {
        let id = &node.connection_id;
        match node.kind {
            NodeKind::Connection => Ok(self
                .data
                .list_databases(id)
                .await?
                .into_iter()
                .map(|name| TreeNode::database(id.clone(), name))
                .collect()),
            NodeKind::Database => {
                let database = node.database_name()?;
                Ok(self
                    .data
                    .list_collections(id, database)
                    .await?
                    .into_iter()
                    .map(|info| TreeNode::collection(id.clone(), &Namespace::new(database, info.name)))
                    .collect())
            }
            NodeKind::DocumentList => {
                let namespace = node.namespace()?;
                Ok(self
                    .data
                    .list_documents(id, &namespace, self.limits.document_limit)
                    .await?
                    .into_iter()
                    .map(|doc| TreeNode::document(id.clone(), &namespace, &doc.id))
                    .collect())
            }
            NodeKind::Schema => {
                let namespace = node.namespace()?;
                Ok(self
                    .data
                    .sample_fields(id, &namespace, self.limits.schema_sample_size)
                    .await?
                    .into_iter()
                    .map(|field| {
                        let label = format!("{}: {}", field.path, field.types.join(" | "));
                        TreeNode::field(id.clone(), &namespace, &field.path, &label)
                    })
                    .collect())
            }
            NodeKind::IndexList => {
                let namespace = node.namespace()?;
                Ok(self
                    .data
                    .list_indexes(id, &namespace)
                    .await?
                    .into_iter()
                    .map(|index| TreeNode::index(id.clone(), &namespace, &index.name))
                    .collect())
            }
            NodeKind::Collection | NodeKind::Document | NodeKind::Field | NodeKind::Index => {
                Ok(Vec::new())
            }
        }
    }

    /// Discard the cached children of `node` and of its whole subtree
    pub fn reset_cache(&self, node: &TreeNode) -> usize {
        self.cache.invalidate(&node.key())
    }

    /// Discard everything cached for a connection
    pub fn reset_connection(&self, connection_id: &ConnectionId) -> usize {
        let removed = self.cache.invalidate_connection(connection_id);
        tracing::debug!(connection_id = %connection_id, removed, "connection cache reset");
        removed
    }

    /// Ask the view to re-render from its roots
    pub fn refresh(&self) -> u64 {
        self.bus.refresh()
    }

    /// How many refreshes have been signalled
    pub fn refresh_count(&self) -> u64 {
        self.bus.generation()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<TreeEvent> {
        self.bus.subscribe()
    }
}

#[cfg(test)]
mod tests;
