//! Command-line and environment configuration.
//!
//! Every flag can also be set through an environment variable, which makes
//! the binary easy to run in a container:
//!
//! ```bash
//! TODO_STORE=memory TODO_LISTEN_ADDR=127.0.0.1:8080 todo-server
//! ```

use std::net::SocketAddr;
use std::time::Duration;

use clap::Parser;

use crate::server::ServerConfig;
use crate::store::{StoreConfig, StoreKind};

/// HTTP CRUD service for todo records
#[derive(Debug, Clone, Parser)]
#[command(name = "todo-server")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Address to listen on
    #[arg(long, env = "TODO_LISTEN_ADDR", default_value = "0.0.0.0:9000")]
    pub listen: SocketAddr,

    /// Storage backend
    #[arg(long, env = "TODO_STORE", value_enum, default_value_t = StoreKind::Mongodb)]
    pub store: StoreKind,

    /// MongoDB connection string
    #[arg(long, env = "TODO_MONGO_URI", default_value = "mongodb://localhost:27017")]
    pub mongo_uri: String,

    /// Database holding the todo collection
    #[arg(long, env = "TODO_DATABASE", default_value = "todo-app")]
    pub database: String,

    /// Collection name
    #[arg(long, env = "TODO_COLLECTION", default_value = "todos")]
    pub collection: String,

    /// Seconds in-flight requests may run after a shutdown signal
    #[arg(long, env = "TODO_SHUTDOWN_GRACE_SECS", default_value_t = 5)]
    pub shutdown_grace_secs: u64,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, env = "TODO_LOG", default_value = "info")]
    pub log_filter: String,
}

impl Cli {
    /// Settings for the HTTP server.
    pub fn server_config(&self) -> ServerConfig {
        ServerConfig {
            addr: self.listen,
            shutdown_grace: Duration::from_secs(self.shutdown_grace_secs),
        }
    }

    /// Settings for the storage backend.
    pub fn store_config(&self) -> StoreConfig {
        StoreConfig {
            kind: self.store,
            mongo_uri: self.mongo_uri.clone(),
            database: self.database.clone(),
            collection: self.collection.clone(),
        }
    }
}
