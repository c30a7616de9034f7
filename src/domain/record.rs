//! Todo record -- the store's representation of a todo.

use bson::oid::ObjectId;
use chrono::{DateTime, Local, SubsecRound, Utc};

use super::wire::{WireTodo, TIMESTAMP_FORMAT};
use crate::error::ValidationError;

/// Storage representation of a todo.
///
/// `id` and `created_at` are assigned once by [`StoredTodo::new`] and never
/// change afterwards; updates only touch `title` and `completed`.
///
/// # Examples
///
/// ```
/// use todo_server::domain::{StoredTodo, TodoFields};
///
/// let todo = StoredTodo::new(TodoFields {
///     title: "buy milk".to_string(),
///     completed: false,
/// });
/// let wire = todo.to_wire();
/// assert_eq!(wire.id, todo.id.to_hex());
/// assert_eq!(wire.title, "buy milk");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct StoredTodo {
    /// Store key, generated at creation.
    pub id: ObjectId,

    /// Non-empty title.
    pub title: String,

    /// Whether the todo is done.
    pub completed: bool,

    /// Insertion time, truncated to millisecond precision to match what the
    /// document store persists.
    pub created_at: DateTime<Utc>,
}

impl StoredTodo {
    /// Creates a record with a fresh id and the current time.
    pub fn new(fields: TodoFields) -> Self {
        Self {
            id: ObjectId::new(),
            title: fields.title,
            completed: fields.completed,
            created_at: Utc::now().trunc_subsecs(3),
        }
    }

    /// Converts to the wire shape sent to clients.
    ///
    /// The timestamp is rendered in the server's local time zone.
    pub fn to_wire(&self) -> WireTodo {
        WireTodo {
            id: self.id.to_hex(),
            title: self.title.clone(),
            completed: self.completed,
            created_at: self
                .created_at
                .with_timezone(&Local)
                .format(TIMESTAMP_FORMAT)
                .to_string(),
        }
    }

    /// Applies the mutable fields, leaving `id` and `created_at` untouched.
    pub fn apply(&mut self, fields: TodoFields) {
        self.title = fields.title;
        self.completed = fields.completed;
    }
}

/// The fields a client may set on create and update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoFields {
    pub title: String,
    pub completed: bool,
}

impl TodoFields {
    /// Extracts the mutable fields from a decoded request.
    ///
    /// `id` and `createdAt` on the wire record are ignored. The title is
    /// kept as sent, but must contain something other than whitespace.
    ///
    /// # Errors
    ///
    /// [`ValidationError::TitleRequired`] when the title is blank.
    ///
    /// # Examples
    ///
    /// ```
    /// use todo_server::domain::{TodoFields, WireTodo};
    /// use todo_server::ValidationError;
    ///
    /// let blank = WireTodo { title: "  ".to_string(), ..WireTodo::default() };
    /// assert_eq!(TodoFields::from_wire(&blank), Err(ValidationError::TitleRequired));
    /// ```
    pub fn from_wire(wire: &WireTodo) -> Result<Self, ValidationError> {
        if wire.title.trim().is_empty() {
            return Err(ValidationError::TitleRequired);
        }
        Ok(Self {
            title: wire.title.clone(),
            completed: wire.completed,
        })
    }
}
