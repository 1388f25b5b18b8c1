//! MongoLens Explorer - Tree view model and cache invalidation
//!
//! Tree nodes are created lazily on expansion and their children are cached
//! per node. Mutating commands reset the affected part of the cache and then
//! signal a refresh so the view re-renders from live server state.

mod bus;
mod cache;
mod node;
mod tree;

pub use bus::{RefreshBus, TreeEvent};
pub use cache::{CacheEntry, ExplorerCache};
pub use node::{NodeKey, NodeKind, TreeNode};
pub use tree::{ExplorerTree, TreeLimits};
