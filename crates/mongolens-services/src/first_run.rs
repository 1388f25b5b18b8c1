//! First-run onboarding gate

use mongolens_connection::StorageController;
use mongolens_core::Result;
use std::future::Future;
use std::sync::Arc;

/// Storage key of the persisted flag
pub const HAS_BEEN_SHOWN_INITIAL_VIEW_KEY: &str = "GLOBAL_HAS_BEEN_SHOWN_INITIAL_VIEW";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    NotShown,
    Shown,
}

/// One-shot, persisted decision to show the overview page
///
/// The overview fires only on the first activation, and only when no saved
/// connection exists then. The gate moves to `Shown` on that first
/// activation either way.
pub struct FirstRunGate {
    storage: Arc<dyn StorageController>,
}

impl FirstRunGate {
    pub fn new(storage: Arc<dyn StorageController>) -> Self {
        Self { storage }
    }

    pub async fn state(&self) -> Result<GateState> {
        Ok(if self.storage.get_flag(HAS_BEEN_SHOWN_INITIAL_VIEW_KEY).await? {
            GateState::Shown
        } else {
            GateState::NotShown
        })
    }

    /// Run the gate, calling `open_overview` when it fires
    ///
    /// `enabled` lets settings suppress the overview; the gate still moves to
    /// `Shown`. Returns whether the overview was opened.
    #[tracing::instrument(skip(self, open_overview))]
    pub async fn run<F, Fut>(&self, enabled: bool, open_overview: F) -> Result<bool>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = bool>,
    {
        if self.state().await? == GateState::Shown {
            tracing::debug!("overview already shown on an earlier run");
            return Ok(false);
        }

        let fire = enabled && !self.storage.has_saved_connections().await?;
        if fire {
            tracing::info!("first run without saved connections, opening overview");
            let opened = open_overview().await;
            tracing::debug!(opened, "overview command finished");
        }

        self.storage
            .update(HAS_BEEN_SHOWN_INITIAL_VIEW_KEY, serde_json::Value::Bool(true))
            .await?;
        Ok(fire)
    }
}
