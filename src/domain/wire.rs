//! Wire format: the JSON shape clients send and receive.

use bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// `chrono` format string for `createdAt` on the wire (`YYYY-MM-DD HH:MM:SS`).
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A todo as exchanged with HTTP clients.
///
/// On requests every field is optional and only `title` and `completed` are
/// read; `id` and `createdAt` are always assigned by the server.
///
/// # Examples
///
/// ```
/// use todo_server::domain::WireTodo;
///
/// let todo: WireTodo = serde_json::from_str(r#"{"title":"buy milk"}"#).unwrap();
/// assert_eq!(todo.title, "buy milk");
/// assert!(!todo.completed);
/// assert!(todo.id.is_empty());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WireTodo {
    pub id: String,
    pub title: String,
    pub completed: bool,
    pub created_at: String,
}

/// Parses a path id into a store key.
///
/// Surrounding whitespace is ignored.
///
/// # Errors
///
/// [`ValidationError::InvalidId`] unless the input is 24 hex digits.
///
/// # Examples
///
/// ```
/// use todo_server::domain::parse_id;
/// use todo_server::ValidationError;
///
/// assert!(parse_id(" 507f1f77bcf86cd799439011 ").is_ok());
/// assert_eq!(parse_id("xyz"), Err(ValidationError::InvalidId));
/// ```
pub fn parse_id(raw: &str) -> Result<ObjectId, ValidationError> {
    ObjectId::parse_str(raw.trim()).map_err(|_| ValidationError::InvalidId)
}

/// Decodes a request body into a [`WireTodo`].
///
/// No content type is required; any body that parses as a JSON object with
/// correctly typed fields is accepted.
///
/// # Errors
///
/// [`ValidationError::MalformedBody`] carrying the decoder message.
pub fn decode_body(body: &[u8]) -> Result<WireTodo, ValidationError> {
    serde_json::from_slice(body).map_err(|e| ValidationError::MalformedBody(e.to_string()))
}
