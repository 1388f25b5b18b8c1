//! Connection state machine
//!
//! [`ConnectionController`] owns the single active connection. The
//! transitional states act as a lock: a connect or disconnect is refused with
//! [`MongolensError::Conflict`] while another one is outstanding, and the
//! check happens synchronously before the first await so there is no race
//! window between concurrent commands.

use mongolens_core::{ConnectionDriver, ConnectionId, MongolensError, Result, SavedConnection};
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::broadcast;

use crate::{ConnectionEvent, ConnectionStatus, StorageController};

const EVENT_CAPACITY: usize = 64;

struct State {
    status: ConnectionStatus,
    /// Bumped whenever shutdown forces the machine back to idle, so that
    /// transitions started before it cannot complete afterwards
    epoch: u64,
}

/// Coordinates connect/disconnect against the driver and tracks the active connection
pub struct ConnectionController {
    driver: Arc<dyn ConnectionDriver>,
    storage: Arc<dyn StorageController>,
    state: Mutex<State>,
    events: broadcast::Sender<ConnectionEvent>,
}

impl ConnectionController {
    pub fn new(driver: Arc<dyn ConnectionDriver>, storage: Arc<dyn StorageController>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            driver,
            storage,
            state: Mutex::new(State {
                status: ConnectionStatus::Idle,
                epoch: 0,
            }),
            events,
        }
    }

    pub fn storage(&self) -> &Arc<dyn StorageController> {
        &self.storage
    }

    pub fn status(&self) -> ConnectionStatus {
        self.state.lock().status.clone()
    }

    pub fn is_connecting(&self) -> bool {
        self.state.lock().status.is_connecting()
    }

    pub fn is_disconnecting(&self) -> bool {
        self.state.lock().status.is_disconnecting()
    }

    pub fn active_connection_id(&self) -> Option<ConnectionId> {
        self.state.lock().status.active_connection_id().cloned()
    }

    /// Whether `id` is the active connection
    pub fn is_active(&self, id: &ConnectionId) -> bool {
        self.state.lock().status.active_connection_id() == Some(id)
    }

    /// The saved record of the active connection, if any
    pub async fn active_connection(&self) -> Result<Option<SavedConnection>> {
        match self.active_connection_id() {
            Some(id) => self.storage.saved_connection(&id).await,
            None => Ok(None),
        }
    }

    /// Receive a [`ConnectionEvent`] after every transition
    pub fn subscribe(&self) -> broadcast::Receiver<ConnectionEvent> {
        self.events.subscribe()
    }

    /// Make `id` the active connection
    ///
    /// Any other active connection is torn down first. Connecting to the
    /// connection that is already active succeeds without doing anything.
    #[tracing::instrument(skip(self), fields(connection_id = %id))]
    pub async fn connect(&self, id: &ConnectionId) -> Result<()> {
        if let Some(conflict) = transition_conflict(&self.state.lock().status) {
            return Err(conflict);
        }

        let saved = self
            .storage
            .saved_connection(id)
            .await?
            .ok_or_else(|| MongolensError::NotFound(format!("no saved connection with id {id}")))?;

        let (previous, epoch) = {
            let mut state = self.state.lock();
            if let Some(conflict) = transition_conflict(&state.status) {
                return Err(conflict);
            }
            let previous = match &state.status {
                ConnectionStatus::Connecting { .. } | ConnectionStatus::Disconnecting { .. } => None,
                ConnectionStatus::Connected { id: active } if active == id => {
                    tracing::debug!("connection is already active");
                    return Ok(());
                }
                ConnectionStatus::Connected { id: active } => Some(active.clone()),
                ConnectionStatus::Idle => None,
            };
            state.status = ConnectionStatus::Connecting { target: id.clone() };
            (previous, state.epoch)
        };
        self.publish(ConnectionStatus::Connecting { target: id.clone() });
        let guard = TransitionGuard::new(self, epoch);

        tracing::info!(
            connection_name = %saved.name,
            uri = %saved.redacted_connection_string(),
            "connecting"
        );

        if let Some(previous) = previous {
            tracing::debug!(previous = %previous, "tearing down previous connection");
            if let Err(e) = self.driver.disconnect(&previous).await {
                tracing::warn!(previous = %previous, error = %e, "failed to tear down previous connection");
            }
        }

        if let Err(e) = self.driver.connect(&saved).await {
            tracing::error!(error = %e, "failed to connect");
            guard.complete(ConnectionStatus::Idle);
            return Err(e);
        }

        if !guard.complete(ConnectionStatus::Connected { id: id.clone() }) {
            tracing::warn!("connect superseded by shutdown, tearing the new session down");
            if let Err(e) = self.driver.disconnect(id).await {
                tracing::warn!(error = %e, "failed to tear down superseded connection");
            }
            return Err(MongolensError::Cancelled);
        }

        tracing::info!("connection established");
        self.record_last_connected(saved).await;
        Ok(())
    }

    /// Tear down the active connection
    ///
    /// Returns `Ok(false)` without touching the driver when nothing is
    /// connected. A teardown failure is logged and the machine still ends idle.
    #[tracing::instrument(skip(self))]
    pub async fn disconnect(&self) -> Result<bool> {
        let (id, epoch) = {
            let mut state = self.state.lock();
            let id = match &state.status {
                ConnectionStatus::Idle => {
                    tracing::debug!("nothing to disconnect");
                    return Ok(false);
                }
                ConnectionStatus::Connecting { target } => {
                    return Err(MongolensError::Conflict(format!(
                        "cannot disconnect while connecting to {target}"
                    )));
                }
                ConnectionStatus::Disconnecting { .. } => {
                    return Err(MongolensError::Conflict(
                        "a disconnect is already in progress".to_string(),
                    ));
                }
                ConnectionStatus::Connected { id } => id.clone(),
            };
            state.status = ConnectionStatus::Disconnecting { id: id.clone() };
            (id, state.epoch)
        };
        self.publish(ConnectionStatus::Disconnecting { id: id.clone() });
        let guard = TransitionGuard::new(self, epoch);

        tracing::info!(connection_id = %id, "disconnecting");
        if let Err(e) = self.driver.disconnect(&id).await {
            tracing::error!(connection_id = %id, error = %e, "teardown failed, marking disconnected anyway");
        }

        guard.complete(ConnectionStatus::Idle);
        tracing::info!(connection_id = %id, "disconnected");
        Ok(true)
    }

    /// Switch to `target`, or disconnect when it is `None`
    pub async fn change_active_connection(&self, target: Option<&ConnectionId>) -> Result<()> {
        match target {
            Some(id) => self.connect(id).await,
            None => self.disconnect().await.map(|_| ()),
        }
    }

    /// Disconnect if possible, then force the machine back to idle
    #[tracing::instrument(skip(self))]
    pub async fn shutdown(&self) {
        if let Err(e) = self.disconnect().await {
            tracing::warn!(error = %e, "disconnect during shutdown failed");
        }

        let forced = {
            let mut state = self.state.lock();
            state.epoch += 1;
            std::mem::take(&mut state.status)
        };
        if forced != ConnectionStatus::Idle {
            tracing::warn!(status = forced.label(), "forcing connection state to idle");
            self.publish(ConnectionStatus::Idle);
        }
    }

    /// Apply `next` unless a forced reset happened since `epoch`
    fn transition(&self, epoch: u64, next: ConnectionStatus) -> bool {
        {
            let mut state = self.state.lock();
            if state.epoch != epoch {
                return false;
            }
            state.status = next.clone();
        }
        self.publish(next);
        true
    }

    fn publish(&self, status: ConnectionStatus) {
        tracing::debug!(status = status.label(), "connection status changed");
        // No receivers is fine
        let _ = self.events.send(ConnectionEvent::StatusChanged(status));
    }

    async fn record_last_connected(&self, mut saved: SavedConnection) {
        saved.last_connected = Some(chrono::Utc::now());
        if let Err(e) = self.storage.save_connection(saved).await {
            tracing::warn!(error = %e, "failed to record last connected time");
        }
    }
}

/// The error a new connect must fail with while another transition is outstanding
fn transition_conflict(status: &ConnectionStatus) -> Option<MongolensError> {
    match status {
        ConnectionStatus::Connecting { target } => Some(MongolensError::Conflict(format!(
            "already connecting to {target}"
        ))),
        ConnectionStatus::Disconnecting { .. } => Some(MongolensError::Conflict(
            "a disconnect is in progress".to_string(),
        )),
        ConnectionStatus::Connected { .. } | ConnectionStatus::Idle => None,
    }
}

/// Restores idle if a transition is abandoned before completing
///
/// Covers a dropped connect/disconnect future and a panic inside one.
struct TransitionGuard<'a> {
    controller: &'a ConnectionController,
    epoch: u64,
    armed: bool,
}

impl<'a> TransitionGuard<'a> {
    fn new(controller: &'a ConnectionController, epoch: u64) -> Self {
        Self {
            controller,
            epoch,
            armed: true,
        }
    }

    /// Finish the transition, returning whether `next` was applied
    fn complete(mut self, next: ConnectionStatus) -> bool {
        self.armed = false;
        self.controller.transition(self.epoch, next)
    }
}

impl Drop for TransitionGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            tracing::warn!("connection transition abandoned, restoring idle");
            self.controller.transition(self.epoch, ConnectionStatus::Idle);
        }
    }
}

#[cfg(test)]
mod tests;
