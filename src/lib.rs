//! HTTP CRUD service for todo records backed by a document database.
//!
//! # Overview
//!
//! The service exposes a single collection of todos over JSON:
//!
//! | Method   | Path         | Operation                         |
//! |----------|--------------|-----------------------------------|
//! | `GET`    | `/todo/`     | List every todo                   |
//! | `POST`   | `/todo/`     | Create a todo                     |
//! | `PUT`    | `/todo/{id}` | Replace title and completed flag  |
//! | `DELETE` | `/todo/{id}` | Delete a todo                     |
//!
//! Responses use the `{message, data, error}` envelope described in
//! [`server::envelope`].
//!
//! # Module Organization
//!
//! - [`domain`] - Storage and wire record shapes, validation, id parsing
//! - [`store`] - The [`TodoStore`] trait plus in-memory and MongoDB backends
//! - [`server`] - Router, request handlers, and the shutdown lifecycle
//! - [`config`] - Command-line and environment configuration
//! - [`error`] - Validation and API error types with HTTP mapping
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use todo_server::server::{ServerConfig, TodoServer};
//! use todo_server::store::memory::InMemoryStore;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let server = TodoServer::new(ServerConfig::default(), Arc::new(InMemoryStore::new()))
//!     .bind()
//!     .await?;
//! server.serve_until(todo_server::server::shutdown_signal()).await;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod domain;
pub mod error;
pub mod logging;
pub mod server;
pub mod store;

// Re-exports for ergonomic access
pub use domain::{parse_id, StoredTodo, TodoFields, WireTodo};
pub use error::{ApiError, ValidationError};
pub use store::{StoreError, TodoStore};
