//! Per-node children cache

use mongolens_core::ConnectionId;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::{NodeKey, TreeNode};

/// Cache entry state for a node's children
#[derive(Debug, Clone)]
pub enum CacheEntry {
    /// Children have been fetched
    Loaded(Arc<[TreeNode]>),
    /// A fetch is outstanding; only the fetch holding this ticket may store its result
    Loading(u64),
}

impl CacheEntry {
    pub fn is_loaded(&self) -> bool {
        matches!(self, CacheEntry::Loaded(_))
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, CacheEntry::Loading(_))
    }

    pub fn get(&self) -> Option<&Arc<[TreeNode]>> {
        match self {
            CacheEntry::Loaded(children) => Some(children),
            CacheEntry::Loading(_) => None,
        }
    }
}

/// Children cache keyed by node identity
///
/// A cached value is a view over live server state and is never
/// authoritative. Invalidating a node discards its entry and every entry in
/// its subtree; a fetch that was outstanding at that moment is not stored.
#[derive(Default)]
pub struct ExplorerCache {
    entries: RwLock<HashMap<NodeKey, CacheEntry>>,
    tickets: AtomicU64,
}

impl ExplorerCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached children of a node, if loaded
    pub fn get(&self, key: &NodeKey) -> Option<Arc<[TreeNode]>> {
        let entries = self.entries.read();
        let result = entries.get(key).and_then(|e| e.get().cloned());
        if result.is_some() {
            tracing::trace!(kind = %key.kind, "cache hit for children");
        } else {
            tracing::trace!(kind = %key.kind, "cache miss for children");
        }
        result
    }

    pub fn entry(&self, key: &NodeKey) -> Option<CacheEntry> {
        self.entries.read().get(key).cloned()
    }

    /// Mark a node as loading and return the ticket its fetch must present
    pub fn begin_load(&self, key: &NodeKey) -> u64 {
        let ticket = self.tickets.fetch_add(1, Ordering::Relaxed) + 1;
        self.entries
            .write()
            .insert(key.clone(), CacheEntry::Loading(ticket));
        ticket
    }

    /// Store fetched children if nothing invalidated the node since `ticket`
    ///
    /// Returns whether the children were stored.
    pub fn finish_load(&self, key: &NodeKey, ticket: u64, children: Arc<[TreeNode]>) -> bool {
        let mut entries = self.entries.write();
        let current =
            matches!(entries.get(key), Some(CacheEntry::Loading(held)) if *held == ticket);
        if !current {
            tracing::debug!(kind = %key.kind, "discarding stale fetch result");
            return false;
        }
        entries.insert(key.clone(), CacheEntry::Loaded(children));
        true
    }

    /// Forget a fetch that failed
    pub fn abort_load(&self, key: &NodeKey, ticket: u64) {
        let mut entries = self.entries.write();
        if matches!(entries.get(key), Some(CacheEntry::Loading(current)) if *current == ticket) {
            entries.remove(key);
        }
    }

    /// Drop the entry of `key` and of every node in its subtree
    pub fn invalidate(&self, key: &NodeKey) -> usize {
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|cached, _| !key.contains(cached));
        let removed = before - entries.len();
        tracing::debug!(kind = %key.kind, removed, "invalidated cached children");
        removed
    }

    /// Drop every entry belonging to a connection
    pub fn invalidate_connection(&self, connection_id: &ConnectionId) -> usize {
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|cached, _| &cached.connection_id != connection_id);
        before - entries.len()
    }

    pub fn clear(&self) {
        self.entries.write().clear();
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}
