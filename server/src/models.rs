//! Request and response shapes for the todo API.
//!
//! # Design
//! Input shapes are decoded strictly: unknown keys are rejected and every
//! type mismatch is an error. There is no coercion, so `"done": "true"` or a
//! numeric `due` is a 422. Decoding and `TodoUpdate::validate` are pure, so
//! a bad payload is turned away before any store session is opened.
//!
//! `TodoUpdate` keeps "key absent" apart from "key set to null" by wrapping
//! every field in `Option<Option<T>>`: the outer layer records presence, the
//! inner one the value. Only present keys are merged into the stored row.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::store::Todo;

/// Body of `POST /todos`.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TodoCreate {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "timestamp::optional")]
    pub due: Option<DateTime<Utc>>,
    #[serde(default)]
    pub priority: Option<String>,
}

impl TodoCreate {
    /// Build the row to insert. New todos always start not done.
    pub fn into_todo(self, id: Uuid) -> Todo {
        Todo {
            id,
            name: self.name,
            description: self.description,
            due: self.due,
            priority: self.priority,
            done: false,
        }
    }
}

/// Body of `PATCH /todos/{id}`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TodoUpdate {
    #[serde(default, deserialize_with = "present")]
    pub name: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "timestamp::present")]
    pub due: Option<Option<DateTime<Utc>>>,
    #[serde(default, deserialize_with = "present")]
    pub priority: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub done: Option<Option<bool>>,
}

/// The changes a validated `TodoUpdate` carries.
///
/// `name` and `done` cannot be cleared, so they lose the inner `Option`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TodoChanges {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub due: Option<Option<DateTime<Utc>>>,
    pub priority: Option<Option<String>>,
    pub done: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{field} may not be null")]
    Null { field: &'static str },
}

impl TodoUpdate {
    pub fn validate(self) -> Result<TodoChanges, ValidationError> {
        Ok(TodoChanges {
            name: not_null("name", self.name)?,
            description: self.description,
            due: self.due,
            priority: self.priority,
            done: not_null("done", self.done)?,
        })
    }
}

fn not_null<T>(field: &'static str, value: Option<Option<T>>) -> Result<Option<T>, ValidationError> {
    match value {
        None => Ok(None),
        Some(Some(value)) => Ok(Some(value)),
        Some(None) => Err(ValidationError::Null { field }),
    }
}

impl TodoChanges {
    /// Merge the present fields into `todo`, leaving the rest untouched.
    pub fn apply(self, todo: &mut Todo) {
        if let Some(name) = self.name {
            todo.name = name;
        }
        if let Some(description) = self.description {
            todo.description = description;
        }
        if let Some(due) = self.due {
            todo.due = due;
        }
        if let Some(priority) = self.priority {
            todo.priority = priority;
        }
        if let Some(done) = self.done {
            todo.done = done;
        }
    }
}

/// A todo as returned by the API. Every key is always serialized.
///
/// `due` always goes out as RFC 3339 in UTC with a `Z` suffix, whatever form
/// it came in as: `"2025-03-01T09:30:00"` is returned as
/// `"2025-03-01T09:30:00Z"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoRead {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub due: Option<DateTime<Utc>>,
    pub priority: Option<String>,
    pub done: bool,
}

impl From<Todo> for TodoRead {
    fn from(todo: Todo) -> Self {
        Self {
            id: todo.id,
            name: todo.name,
            description: todo.description,
            due: todo.due,
            priority: todo.priority,
            done: todo.done,
        }
    }
}

/// Body of `GET /`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Greeting {
    pub message: String,
}

/// Marks a key as present; the inner `Option` carries an explicit `null`.
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

pub mod timestamp {
    //! Lenient timestamp input.
    //!
    //! Accepts RFC 3339 with an offset, a naive date-time (read as UTC) with
    //! `T` or a space between date and time, or a bare date (midnight UTC).

    use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
    use serde::{Deserialize, Deserializer};

    const NAIVE_FORMATS: [&str; 4] = [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M",
    ];

    pub fn parse(raw: &str) -> Option<DateTime<Utc>> {
        let raw = raw.trim();
        if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
            return Some(parsed.with_timezone(&Utc));
        }
        for format in NAIVE_FORMATS {
            if let Ok(parsed) = NaiveDateTime::parse_from_str(raw, format) {
                return Some(parsed.and_utc());
            }
        }
        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .map(|parsed| parsed.and_utc())
    }

    fn parse_field<E: serde::de::Error>(raw: Option<String>) -> Result<Option<DateTime<Utc>>, E> {
        raw.map(|raw| parse(&raw).ok_or_else(|| E::custom(format!("invalid datetime: {raw:?}"))))
            .transpose()
    }

    pub fn optional<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        parse_field(Option::<String>::deserialize(deserializer)?)
    }

    pub fn present<'de, D>(deserializer: D) -> Result<Option<Option<DateTime<Utc>>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        optional(deserializer).map(Some)
    }
}
