//! Refresh signalling towards the tree-view layer

use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::broadcast;

const EVENT_CAPACITY: usize = 64;

/// Emitted when the view should re-render from its roots
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TreeEvent {
    Refreshed { generation: u64 },
}

/// Broadcasts refresh requests and counts them
pub struct RefreshBus {
    sender: broadcast::Sender<TreeEvent>,
    generation: AtomicU64,
}

impl Default for RefreshBus {
    fn default() -> Self {
        Self::new()
    }
}

impl RefreshBus {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            sender,
            generation: AtomicU64::new(0),
        }
    }

    /// Signal a refresh and return its generation
    pub fn refresh(&self) -> u64 {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        tracing::debug!(generation, "tree refresh requested");
        // The view may not be listening yet
        let _ = self.sender.send(TreeEvent::Refreshed { generation });
        generation
    }

    /// Number of refreshes signalled so far
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<TreeEvent> {
        self.sender.subscribe()
    }
}
