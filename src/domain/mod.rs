//! Domain types for todo records.
//!
//! These types separate storage concerns from wire-format concerns.
//! [`StoredTodo`] is the store's representation, keyed by a BSON
//! [`ObjectId`](bson::oid::ObjectId) with a native timestamp. [`WireTodo`] is
//! the flat JSON shape exchanged with HTTP clients: string id and a
//! preformatted `createdAt`.

pub mod record;
pub mod wire;

pub use record::*;
pub use wire::*;
