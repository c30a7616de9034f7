//! HTTP surface: router, handlers, and the server lifecycle.

pub mod envelope;
pub mod handlers;
pub mod lifecycle;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::routing::{get, put};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::store::TodoStore;

pub use lifecycle::{
    shutdown_signal, BoundServer, LifecycleState, ServerError, ShutdownOutcome, TodoServer,
};

/// Configuration for the HTTP server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to listen on.
    pub addr: SocketAddr,
    /// How long in-flight requests may run after shutdown begins.
    pub shutdown_grace: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([0, 0, 0, 0], 9000)),
            shutdown_grace: Duration::from_secs(5),
        }
    }
}

/// State shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn TodoStore>,
}

/// Builds the application router around `store`.
///
/// The collection routes answer both with and without the trailing slash.
pub fn router(store: Arc<dyn TodoStore>) -> Router {
    Router::new()
        .route("/", get(handlers::home))
        .route(
            "/todo",
            get(handlers::list_todos).post(handlers::create_todo),
        )
        .route(
            "/todo/",
            get(handlers::list_todos).post(handlers::create_todo),
        )
        .route(
            "/todo/{id}",
            put(handlers::update_todo).delete(handlers::delete_todo),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(AppState { store })
}
