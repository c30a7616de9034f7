//! Request handlers for the todo API.
//!
//! Each handler checks its inputs in a fixed order (path id, then body, then
//! the store call) and returns on the first failure. Failures are
//! [`ApiError`]s, which render as `400` envelopes.

use axum::body::Bytes;
use axum::extract::rejection::PathRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Html;
use axum::Json;
use bson::oid::ObjectId;

use super::envelope::Envelope;
use super::AppState;
use crate::domain::{decode_body, parse_id, StoredTodo, TodoFields, WireTodo};
use crate::error::{ApiError, Operation, ValidationError};

/// Handler result: a status code and a JSON envelope.
pub type ApiResult<T> = Result<(StatusCode, Json<Envelope<T>>), ApiError>;

/// Resolves the `{id}` path segment to a store key.
///
/// A segment the router cannot decode (e.g. invalid UTF-8 after
/// percent-decoding) is reported the same way as a malformed id.
fn path_id(path: Result<Path<String>, PathRejection>) -> Result<ObjectId, ValidationError> {
    match path {
        Ok(Path(raw)) => parse_id(&raw),
        Err(rejection) => {
            tracing::debug!("undecodable id segment: {rejection}");
            Err(ValidationError::InvalidId)
        },
    }
}

/// Serve the home page.
pub async fn home() -> Html<&'static str> {
    Html(include_str!("../../static/home.html"))
}

/// `GET /todo/` -- list every todo.
pub async fn list_todos(State(state): State<AppState>) -> ApiResult<Vec<WireTodo>> {
    let todos = state
        .store
        .list_all()
        .await
        .map_err(ApiError::store(Operation::List))?;

    let data = todos.iter().map(StoredTodo::to_wire).collect();
    Ok((StatusCode::OK, Json(Envelope::data(data))))
}

/// `POST /todo/` -- create a todo.
pub async fn create_todo(State(state): State<AppState>, body: Bytes) -> ApiResult<WireTodo> {
    let request = decode_body(&body)?;
    let fields = TodoFields::from_wire(&request)?;

    let todo = StoredTodo::new(fields);
    state
        .store
        .insert(&todo)
        .await
        .map_err(ApiError::store(Operation::Create))?;

    tracing::info!(id = %todo.id, "todo created");
    Ok((
        StatusCode::CREATED,
        Json(Envelope::with_data("Todo created successfully", todo.to_wire())),
    ))
}

/// `PUT /todo/{id}` -- replace title and completed flag.
pub async fn update_todo(
    State(state): State<AppState>,
    id: Result<Path<String>, PathRejection>,
    body: Bytes,
) -> ApiResult<()> {
    let id = path_id(id)?;
    let request = decode_body(&body)?;
    let fields = TodoFields::from_wire(&request)?;

    state
        .store
        .update_by_id(id, fields)
        .await
        .map_err(ApiError::store(Operation::Update))?;

    Ok((
        StatusCode::OK,
        Json(Envelope::message("Todo updated successfully")),
    ))
}

/// `DELETE /todo/{id}` -- delete a todo.
pub async fn delete_todo(
    State(state): State<AppState>,
    id: Result<Path<String>, PathRejection>,
) -> ApiResult<()> {
    let id = path_id(id)?;

    state
        .store
        .delete_by_id(id)
        .await
        .map_err(ApiError::store(Operation::Delete))?;

    Ok((
        StatusCode::OK,
        Json(Envelope::message("Todo deleted successfully")),
    ))
}
