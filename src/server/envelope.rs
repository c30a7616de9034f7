//! The `{message, data, error}` JSON envelope used by every response.

use serde::{Deserialize, Serialize};

/// Response body wrapper.
///
/// Absent fields are omitted from the JSON rather than sent as `null`.
///
/// # Examples
///
/// ```
/// use todo_server::server::envelope::Envelope;
///
/// let body = serde_json::to_value(Envelope::<()>::message("Todo deleted successfully")).unwrap();
/// assert_eq!(body, serde_json::json!({"message": "Todo deleted successfully"}));
///
/// let empty: Vec<u32> = Vec::new();
/// let body = serde_json::to_value(Envelope::data(empty)).unwrap();
/// assert_eq!(body, serde_json::json!({"data": []}));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T> {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> Envelope<T> {
    /// Body with only a payload.
    pub fn data(data: T) -> Self {
        Self {
            message: None,
            data: Some(data),
            error: None,
        }
    }

    /// Body with a message and a payload.
    pub fn with_data(message: impl Into<String>, data: T) -> Self {
        Self {
            message: Some(message.into()),
            data: Some(data),
            error: None,
        }
    }

    /// Body with only a message.
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            data: None,
            error: None,
        }
    }

    /// Failure body: a message plus optional error detail.
    pub fn failure(message: impl Into<String>, error: Option<String>) -> Self {
        Self {
            message: Some(message.into()),
            data: None,
            error,
        }
    }
}
