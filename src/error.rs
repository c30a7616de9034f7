//! Error types for request handling.
//!
//! [`ValidationError`] covers everything wrong with the caller's input and
//! [`ApiError`] wraps it together with store failures. Both end up as a
//! `400 Bad Request` carrying an [`Envelope`] body; nothing here is retried.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

use crate::server::envelope::Envelope;
use crate::store::StoreError;

/// Input rejected before any store call is made.
///
/// The `Display` text is the `message` sent to the client.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Path id is not a well-formed store key.
    #[error("Invalid id")]
    InvalidId,

    /// Title is empty or only whitespace.
    #[error("Title is required")]
    TitleRequired,

    /// Request body could not be decoded as a todo.
    #[error("Invalid request body")]
    MalformedBody(String),
}

impl ValidationError {
    /// Additional detail for the envelope `error` field, if any.
    pub fn detail(&self) -> Option<String> {
        match self {
            Self::MalformedBody(detail) => Some(detail.clone()),
            Self::InvalidId | Self::TitleRequired => None,
        }
    }
}

/// Store operation a failure is attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// `GET /todo/`
    List,
    /// `POST /todo/`
    Create,
    /// `PUT /todo/{id}`
    Update,
    /// `DELETE /todo/{id}`
    Delete,
}

impl Operation {
    fn failure_message(self) -> &'static str {
        match self {
            Self::List => "Failed to get todos",
            Self::Create => "Failed to create todo",
            Self::Update => "Failed to update todo",
            Self::Delete => "Failed to delete todo",
        }
    }
}

/// Any failure a request handler reports to its caller.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Caller input failed validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The document store rejected or failed the operation.
    #[error("{}", .operation.failure_message())]
    Store {
        /// Which handler operation failed.
        operation: Operation,
        /// The underlying store error.
        #[source]
        source: StoreError,
    },
}

impl ApiError {
    /// Wraps a store error for the given operation.
    pub fn store(operation: Operation) -> impl FnOnce(StoreError) -> Self {
        move |source| Self::Store { operation, source }
    }

    /// Status code sent for this error.
    pub fn status(&self) -> StatusCode {
        StatusCode::BAD_REQUEST
    }

    fn detail(&self) -> Option<String> {
        match self {
            Self::Validation(err) => err.detail(),
            Self::Store { source, .. } => Some(source.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            Self::Validation(err) => tracing::debug!("rejected request: {err}"),
            Self::Store { source, .. } => tracing::warn!("{self}: {source}"),
        }
        let body = Envelope::<()>::failure(self.to_string(), self.detail());
        (self.status(), Json(body)).into_response()
    }
}
