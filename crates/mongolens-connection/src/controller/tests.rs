//! Tests for the connection state machine

use super::*;
use crate::MemoryStorage;
use async_trait::async_trait;
use pretty_assertions::assert_eq;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::Notify;

#[derive(Clone, Debug, PartialEq, Eq)]
enum DriverCall {
    Connect(String),
    Disconnect(String),
}

/// Driver that records calls and can hold `connect` until released
#[derive(Default)]
struct MockDriver {
    calls: parking_lot::Mutex<Vec<DriverCall>>,
    hold_connect: AtomicBool,
    release: Notify,
    fail_connect: AtomicBool,
    fail_disconnect: AtomicBool,
}

impl MockDriver {
    fn calls(&self) -> Vec<DriverCall> {
        self.calls.lock().clone()
    }

    fn hold(&self) {
        self.hold_connect.store(true, Ordering::SeqCst);
    }

    fn release(&self) {
        self.hold_connect.store(false, Ordering::SeqCst);
        self.release.notify_one();
    }
}

#[async_trait]
impl ConnectionDriver for MockDriver {
    async fn connect(&self, connection: &SavedConnection) -> Result<()> {
        self.calls
            .lock()
            .push(DriverCall::Connect(connection.id.to_string()));
        if self.hold_connect.load(Ordering::SeqCst) {
            self.release.notified().await;
        }
        if self.fail_connect.load(Ordering::SeqCst) {
            return Err(MongolensError::Connection("server selection timeout".into()));
        }
        Ok(())
    }

    async fn disconnect(&self, id: &ConnectionId) -> Result<()> {
        self.calls.lock().push(DriverCall::Disconnect(id.to_string()));
        if self.fail_disconnect.load(Ordering::SeqCst) {
            return Err(MongolensError::Connection("socket closed".into()));
        }
        Ok(())
    }
}

fn saved(id: &str) -> SavedConnection {
    SavedConnection::new(id, format!("mongodb://{id}:27017")).with_id(id)
}

fn setup() -> (Arc<ConnectionController>, Arc<MockDriver>, Arc<MemoryStorage>) {
    let driver = Arc::new(MockDriver::default());
    let storage = Arc::new(MemoryStorage::with_connections([saved("a"), saved("b")]));
    let controller = Arc::new(ConnectionController::new(driver.clone(), storage.clone()));
    (controller, driver, storage)
}

async fn wait_until_connecting(controller: &ConnectionController) {
    while !controller.is_connecting() {
        tokio::task::yield_now().await;
    }
}

#[tokio::test]
async fn test_connect_sets_active_connection() {
    let (controller, driver, storage) = setup();
    let a = ConnectionId::from("a");

    controller.connect(&a).await.unwrap();

    assert_eq!(controller.status(), ConnectionStatus::Connected { id: a.clone() });
    assert_eq!(controller.active_connection_id(), Some(a.clone()));
    assert!(controller.is_active(&a));
    assert_eq!(driver.calls(), vec![DriverCall::Connect("a".into())]);

    let record = storage.saved_connection(&a).await.unwrap().unwrap();
    assert!(record.last_connected.is_some());
}

#[tokio::test]
async fn test_connect_to_active_connection_is_noop() {
    let (controller, driver, _) = setup();
    let a = ConnectionId::from("a");

    controller.connect(&a).await.unwrap();
    controller.connect(&a).await.unwrap();

    assert_eq!(driver.calls().len(), 1);
    assert!(controller.is_active(&a));
}

#[tokio::test]
async fn test_connect_unknown_id_leaves_state_unchanged() {
    let (controller, driver, _) = setup();
    let a = ConnectionId::from("a");
    controller.connect(&a).await.unwrap();

    let result = controller.connect(&ConnectionId::from("missing")).await;

    assert!(matches!(result, Err(MongolensError::NotFound(_))));
    assert!(controller.is_active(&a));
    assert_eq!(driver.calls().len(), 1);
}

#[tokio::test]
async fn test_connect_failure_returns_to_idle() {
    let (controller, driver, _) = setup();
    driver.fail_connect.store(true, Ordering::SeqCst);

    let result = controller.connect(&ConnectionId::from("a")).await;

    assert!(matches!(result, Err(MongolensError::Connection(_))));
    assert_eq!(controller.status(), ConnectionStatus::Idle);
    assert_eq!(controller.active_connection_id(), None);
}

#[tokio::test]
async fn test_switching_tears_down_previous_connection_first() {
    let (controller, driver, _) = setup();

    controller.connect(&ConnectionId::from("a")).await.unwrap();
    controller.connect(&ConnectionId::from("b")).await.unwrap();

    assert_eq!(
        driver.calls(),
        vec![
            DriverCall::Connect("a".into()),
            DriverCall::Disconnect("a".into()),
            DriverCall::Connect("b".into()),
        ]
    );
    assert!(controller.is_active(&ConnectionId::from("b")));
}

#[tokio::test]
async fn test_second_connect_conflicts_while_first_in_flight() {
    let (controller, driver, _) = setup();
    driver.hold();

    let first = tokio::spawn({
        let controller = controller.clone();
        async move { controller.connect(&ConnectionId::from("a")).await }
    });
    wait_until_connecting(&controller).await;

    let second = controller.connect(&ConnectionId::from("b")).await;
    assert!(matches!(second, Err(MongolensError::Conflict(_))));
    assert_eq!(controller.active_connection_id(), None);
    assert!(controller.is_connecting());
    assert!(!controller.is_disconnecting());

    driver.release();
    first.await.unwrap().unwrap();

    assert_eq!(controller.active_connection_id(), Some(ConnectionId::from("a")));
    assert_eq!(driver.calls(), vec![DriverCall::Connect("a".into())]);
}

#[tokio::test]
async fn test_connect_unknown_id_conflicts_while_first_in_flight() {
    let (controller, driver, _) = setup();
    driver.hold();

    let first = tokio::spawn({
        let controller = controller.clone();
        async move { controller.connect(&ConnectionId::from("a")).await }
    });
    wait_until_connecting(&controller).await;

    let second = controller.connect(&ConnectionId::from("missing")).await;
    assert!(second.unwrap_err().is_conflict());

    driver.release();
    first.await.unwrap().unwrap();
    assert_eq!(controller.active_connection_id(), Some(ConnectionId::from("a")));
}

#[tokio::test]
async fn test_disconnect_conflicts_while_connecting() {
    let (controller, driver, _) = setup();
    driver.hold();

    let first = tokio::spawn({
        let controller = controller.clone();
        async move { controller.connect(&ConnectionId::from("a")).await }
    });
    wait_until_connecting(&controller).await;

    let result = controller.disconnect().await;
    assert!(result.unwrap_err().is_conflict());

    driver.release();
    first.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_disconnect_when_idle_is_noop() {
    let (controller, driver, _) = setup();

    let disconnected = controller.disconnect().await.unwrap();

    assert!(!disconnected);
    assert!(driver.calls().is_empty());
    assert_eq!(controller.status(), ConnectionStatus::Idle);
}

#[tokio::test]
async fn test_disconnect_reaches_idle_even_when_teardown_fails() {
    let (controller, driver, _) = setup();
    controller.connect(&ConnectionId::from("a")).await.unwrap();
    driver.fail_disconnect.store(true, Ordering::SeqCst);

    let disconnected = controller.disconnect().await.unwrap();

    assert!(disconnected);
    assert_eq!(controller.status(), ConnectionStatus::Idle);
    assert_eq!(controller.active_connection_id(), None);
}

#[tokio::test]
async fn test_change_active_connection() {
    let (controller, _, _) = setup();
    let b = ConnectionId::from("b");

    controller.change_active_connection(Some(&b)).await.unwrap();
    assert!(controller.is_active(&b));

    controller.change_active_connection(None).await.unwrap();
    assert_eq!(controller.status(), ConnectionStatus::Idle);
}

#[tokio::test]
async fn test_dropped_connect_restores_idle() {
    let (controller, driver, _) = setup();
    driver.hold();

    let timed_out = tokio::time::timeout(
        Duration::from_millis(20),
        controller.connect(&ConnectionId::from("a")),
    )
    .await;

    assert!(timed_out.is_err());
    assert_eq!(controller.status(), ConnectionStatus::Idle);

    // The machine is usable again
    driver.release();
    controller.connect(&ConnectionId::from("b")).await.unwrap();
    assert!(controller.is_active(&ConnectionId::from("b")));
}

#[tokio::test]
async fn test_shutdown_disconnects_active_connection() {
    let (controller, driver, _) = setup();
    controller.connect(&ConnectionId::from("a")).await.unwrap();

    controller.shutdown().await;

    assert_eq!(controller.status(), ConnectionStatus::Idle);
    assert_eq!(driver.calls().last(), Some(&DriverCall::Disconnect("a".into())));
}

#[tokio::test]
async fn test_shutdown_supersedes_connect_in_flight() {
    let (controller, driver, _) = setup();
    driver.hold();

    let pending = tokio::spawn({
        let controller = controller.clone();
        async move { controller.connect(&ConnectionId::from("a")).await }
    });
    wait_until_connecting(&controller).await;

    controller.shutdown().await;
    assert_eq!(controller.status(), ConnectionStatus::Idle);

    driver.release();
    let result = pending.await.unwrap();

    assert!(matches!(result, Err(MongolensError::Cancelled)));
    assert_eq!(controller.status(), ConnectionStatus::Idle);
    assert_eq!(
        driver.calls(),
        vec![
            DriverCall::Connect("a".into()),
            DriverCall::Disconnect("a".into()),
        ]
    );
}

#[tokio::test]
async fn test_every_transition_is_broadcast() {
    let (controller, _, _) = setup();
    let mut events = controller.subscribe();
    let a = ConnectionId::from("a");

    controller.connect(&a).await.unwrap();
    controller.disconnect().await.unwrap();

    let mut seen = Vec::new();
    while let Ok(ConnectionEvent::StatusChanged(status)) = events.try_recv() {
        seen.push(status);
    }
    assert_eq!(
        seen,
        vec![
            ConnectionStatus::Connecting { target: a.clone() },
            ConnectionStatus::Connected { id: a.clone() },
            ConnectionStatus::Disconnecting { id: a.clone() },
            ConnectionStatus::Idle,
        ]
    );
}
