//! Server lifecycle: bind, serve, and bounded graceful shutdown.
//!
//! ```text
//! Starting --bind ok--> Listening --shutdown--> Draining --drained | grace elapsed--> Stopped
//! ```
//!
//! A bind failure leaves the server in `Starting` and is returned to the
//! caller; the binary treats it as fatal. Once shutdown begins the listener
//! stops accepting connections while in-flight requests run to completion,
//! for at most the configured grace period. Connections still open when the
//! grace period ends are aborted before `Stopped` is published.

use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use hyper::server::conn::http1;
use hyper_util::rt::TokioIo;
use hyper_util::service::TowerToHyperService;
use thiserror::Error;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::watch;
use tokio::task::{JoinError, JoinSet};
use tracing::{debug, info, warn};

use super::ServerConfig;
use crate::store::TodoStore;

/// Pause after a failed `accept` before trying again.
const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

/// Observable lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    /// Constructed, socket not yet bound.
    Starting,
    /// Socket bound; accepting connections.
    Listening,
    /// Shutdown requested; no new connections, in-flight requests finishing.
    Draining,
    /// Every connection has finished or been aborted.
    Stopped,
}

/// How draining ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownOutcome {
    /// Every in-flight request finished within the grace period.
    Drained,
    /// The grace period ran out; remaining connections were aborted.
    GraceElapsed,
}

/// Errors from binding the server.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The listening socket could not be bound.
    #[error("failed to bind {addr}")]
    Bind {
        /// Address that was requested.
        addr: SocketAddr,
        /// Error from the operating system.
        #[source]
        source: io::Error,
    },

    /// Socket I/O failed after binding (reading the local address).
    #[error("server I/O error")]
    Io(#[from] io::Error),
}

/// An unbound todo server.
pub struct TodoServer {
    config: ServerConfig,
    router: Router,
    state: watch::Sender<LifecycleState>,
}

impl TodoServer {
    /// Creates a server that will route requests to `store`.
    pub fn new(config: ServerConfig, store: Arc<dyn TodoStore>) -> Self {
        let (state, _) = watch::channel(LifecycleState::Starting);
        Self {
            config,
            router: super::router(store),
            state,
        }
    }

    /// Subscribes to lifecycle state changes.
    pub fn subscribe(&self) -> watch::Receiver<LifecycleState> {
        self.state.subscribe()
    }

    /// Binds the listening socket.
    ///
    /// # Errors
    ///
    /// [`ServerError::Bind`] if the address is unavailable. There is no retry.
    pub async fn bind(self) -> Result<BoundServer, ServerError> {
        let addr = self.config.addr;
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| ServerError::Bind { addr, source })?;
        let local_addr = listener.local_addr()?;

        self.state.send_replace(LifecycleState::Listening);
        info!("Listening on {}", local_addr);

        Ok(BoundServer {
            listener,
            local_addr,
            router: self.router,
            grace: self.config.shutdown_grace,
            state: self.state,
        })
    }
}

/// A server with a bound socket, ready to serve.
pub struct BoundServer {
    listener: TcpListener,
    local_addr: SocketAddr,
    router: Router,
    grace: Duration,
    state: watch::Sender<LifecycleState>,
}

impl BoundServer {
    /// The address actually bound (useful when binding port 0).
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Subscribes to lifecycle state changes.
    pub fn subscribe(&self) -> watch::Receiver<LifecycleState> {
        self.state.subscribe()
    }

    /// Serves requests until `shutdown` resolves, then drains.
    ///
    /// Each connection runs on its own task in a [`JoinSet`]. After
    /// `shutdown` the listener is closed and every connection is asked to
    /// finish its current request and close. Connections still open after
    /// `grace` are aborted, which drops their in-flight handlers, and
    /// [`ShutdownOutcome::GraceElapsed`] is returned.
    pub async fn serve_until<F>(self, shutdown: F) -> ShutdownOutcome
    where
        F: Future<Output = ()> + Send,
    {
        let Self {
            listener,
            router,
            grace,
            state,
            ..
        } = self;

        let (drain_tx, drain_rx) = watch::channel(false);
        let mut connections = JoinSet::new();
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                () = &mut shutdown => break,
                accepted = listener.accept() => match accepted {
                    Ok((stream, peer)) => {
                        debug!(%peer, "connection accepted");
                        connections.spawn(serve_connection(stream, router.clone(), drain_rx.clone()));
                    },
                    Err(e) => {
                        warn!("Failed to accept connection: {e}");
                        tokio::time::sleep(ACCEPT_BACKOFF).await;
                    },
                },
                Some(joined) = connections.join_next(), if !connections.is_empty() => {
                    log_join(joined);
                }
            }
        }

        drop(listener);
        info!("Shutting down server...");
        state.send_replace(LifecycleState::Draining);
        drain_tx.send_replace(true);

        let outcome = match tokio::time::timeout(grace, join_all(&mut connections)).await {
            Ok(()) => {
                info!("Server gracefully stopped");
                ShutdownOutcome::Drained
            },
            Err(_) => {
                warn!(
                    ?grace,
                    open = connections.len(),
                    "Shutdown grace period elapsed, aborting open connections"
                );
                connections.abort_all();
                join_all(&mut connections).await;
                ShutdownOutcome::GraceElapsed
            },
        };

        state.send_replace(LifecycleState::Stopped);
        outcome
    }
}

/// Serves one HTTP/1 connection until it closes or draining begins.
///
/// Requests are handled inside the connection future, so aborting this
/// task drops any handler still running on it.
async fn serve_connection(stream: TcpStream, router: Router, mut drain: watch::Receiver<bool>) {
    let service = TowerToHyperService::new(router);
    let conn = http1::Builder::new().serve_connection(TokioIo::new(stream), service);
    tokio::pin!(conn);

    tokio::select! {
        result = conn.as_mut() => {
            if let Err(e) = result {
                debug!("connection error: {e}");
            }
            return;
        }
        _ = drain.changed() => {}
    }

    conn.as_mut().graceful_shutdown();
    if let Err(e) = conn.await {
        debug!("connection error while draining: {e}");
    }
}

async fn join_all(connections: &mut JoinSet<()>) {
    while let Some(joined) = connections.join_next().await {
        log_join(joined);
    }
}

fn log_join(joined: Result<(), JoinError>) {
    match joined {
        Ok(()) => {},
        Err(e) if e.is_cancelled() => debug!("connection aborted"),
        Err(e) => warn!("connection task failed: {e}"),
    }
}

/// Resolves when the process receives an interrupt (Ctrl-C), or SIGTERM on
/// unix.
pub async fn shutdown_signal() {
    let interrupt = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for interrupt signal: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            },
            Err(e) => {
                warn!("Failed to listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = interrupt => info!("Received interrupt signal"),
        () = terminate => info!("Received SIGTERM"),
    }
}
