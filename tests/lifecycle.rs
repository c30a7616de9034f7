//! Lifecycle tests over a real socket: bind, serve, drain, stop.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use bson::oid::ObjectId;
use pretty_assertions::assert_eq;
use tokio::sync::{oneshot, Notify};
use todo_server::domain::{StoredTodo, TodoFields};
use todo_server::server::{
    BoundServer, LifecycleState, ServerConfig, ServerError, ShutdownOutcome, TodoServer,
};
use todo_server::store::memory::InMemoryStore;
use todo_server::store::{StoreError, TodoStore};

/// Store whose `list_all` signals on entry, stalls for `delay`, then marks
/// itself finished.
struct SlowStore {
    delay: Duration,
    entered: Arc<Notify>,
    finished: AtomicBool,
}

#[async_trait]
impl TodoStore for SlowStore {
    async fn list_all(&self) -> Result<Vec<StoredTodo>, StoreError> {
        self.entered.notify_one();
        tokio::time::sleep(self.delay).await;
        self.finished.store(true, Ordering::SeqCst);
        Ok(Vec::new())
    }

    async fn insert(&self, _record: &StoredTodo) -> Result<(), StoreError> {
        Ok(())
    }

    async fn update_by_id(&self, _id: ObjectId, _fields: TodoFields) -> Result<(), StoreError> {
        Ok(())
    }

    async fn delete_by_id(&self, _id: ObjectId) -> Result<(), StoreError> {
        Ok(())
    }
}

fn local_config(grace: Duration) -> ServerConfig {
    ServerConfig {
        addr: "127.0.0.1:0".parse().unwrap(),
        shutdown_grace: grace,
    }
}

async fn bind(store: Arc<dyn TodoStore>, grace: Duration) -> BoundServer {
    TodoServer::new(local_config(grace), store)
        .bind()
        .await
        .unwrap()
}

fn slow_store(delay: Duration) -> (Arc<SlowStore>, Arc<Notify>) {
    let entered = Arc::new(Notify::new());
    let store = Arc::new(SlowStore {
        delay,
        entered: entered.clone(),
        finished: AtomicBool::new(false),
    });
    (store, entered)
}

fn list_url(addr: SocketAddr) -> String {
    format!("http://{addr}/todo/")
}

#[tokio::test]
async fn bind_moves_to_listening_and_reports_local_addr() {
    let server = TodoServer::new(
        local_config(Duration::from_secs(5)),
        Arc::new(InMemoryStore::new()),
    );
    let states = server.subscribe();
    assert_eq!(*states.borrow(), LifecycleState::Starting);

    let bound = server.bind().await.unwrap();
    assert_eq!(*states.borrow(), LifecycleState::Listening);
    assert_ne!(bound.local_addr().port(), 0);
}

#[tokio::test]
async fn serves_requests_then_stops_on_signal() {
    let bound = bind(Arc::new(InMemoryStore::new()), Duration::from_secs(5)).await;
    let addr = bound.local_addr();
    let states = bound.subscribe();
    let (stop_tx, stop_rx) = oneshot::channel::<()>();
    let serving = tokio::spawn(bound.serve_until(async move {
        let _ = stop_rx.await;
    }));

    let body: serde_json::Value = reqwest::get(list_url(addr))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body, serde_json::json!({ "data": [] }));

    stop_tx.send(()).unwrap();
    let outcome = serving.await.unwrap();

    assert_eq!(outcome, ShutdownOutcome::Drained);
    assert_eq!(*states.borrow(), LifecycleState::Stopped);
    assert!(reqwest::get(list_url(addr)).await.is_err());
}

#[tokio::test]
async fn in_flight_request_completes_during_drain() {
    let (store, entered) = slow_store(Duration::from_millis(300));
    let bound = bind(store, Duration::from_secs(5)).await;
    let addr = bound.local_addr();
    let (stop_tx, stop_rx) = oneshot::channel::<()>();
    let serving = tokio::spawn(bound.serve_until(async move {
        let _ = stop_rx.await;
    }));

    let request = tokio::spawn(reqwest::get(list_url(addr)));
    entered.notified().await;
    stop_tx.send(()).unwrap();

    let response = request.await.unwrap().unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::OK);
    assert_eq!(serving.await.unwrap(), ShutdownOutcome::Drained);
}

#[tokio::test]
async fn drain_is_bounded_by_grace_period() {
    let (store, entered) = slow_store(Duration::from_millis(800));
    let bound = bind(store.clone(), Duration::from_millis(100)).await;
    let addr = bound.local_addr();
    let states = bound.subscribe();
    let (stop_tx, stop_rx) = oneshot::channel::<()>();
    let serving = tokio::spawn(bound.serve_until(async move {
        let _ = stop_rx.await;
    }));

    let stuck = tokio::spawn(reqwest::get(list_url(addr)));
    entered.notified().await;

    let started = Instant::now();
    stop_tx.send(()).unwrap();
    let outcome = serving.await.unwrap();

    assert_eq!(outcome, ShutdownOutcome::GraceElapsed);
    assert!(started.elapsed() < Duration::from_millis(800));
    assert_eq!(*states.borrow(), LifecycleState::Stopped);

    // The aborted request must not complete after the server reports Stopped.
    assert!(stuck.await.unwrap().is_err());
    tokio::time::sleep(Duration::from_secs(1)).await;
    assert!(!store.finished.load(Ordering::SeqCst));
}

#[tokio::test]
async fn occupied_address_fails_to_bind() {
    let holder = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let taken = holder.local_addr().unwrap();

    let server = TodoServer::new(
        ServerConfig {
            addr: taken,
            shutdown_grace: Duration::from_secs(5),
        },
        Arc::new(InMemoryStore::new()),
    );
    let states = server.subscribe();

    match server.bind().await {
        Err(ServerError::Bind { addr, .. }) => assert_eq!(addr, taken),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("bind should fail while the port is held"),
    }
    assert_eq!(*states.borrow(), LifecycleState::Starting);
}
