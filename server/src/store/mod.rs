//! Record store for todo rows.
//!
//! # Design
//! Handlers never touch a connection directly. They ask a `TodoStore` for a
//! `TodoSession`, which lives for exactly one request: every read and write
//! of that request goes through it, and `commit` consumes it. A session that
//! is dropped without `commit` (early return on 404, a `?` on a store error)
//! rolls back and gives its connection back, so release happens on every
//! exit path without handler cooperation.
//!
//! Two backends exist: `PgTodoStore` for the `todos` table and
//! `MemoryTodoStore` for running without a database and for tests.

pub mod db;
pub mod memory;
pub mod postgres;
pub mod schema;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

pub use memory::MemoryTodoStore;
pub use postgres::PgTodoStore;

/// A persisted todo row.
#[derive(Clone, Debug, PartialEq, Eq, sqlx::FromRow)]
pub struct Todo {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub due: Option<DateTime<Utc>>,
    pub priority: Option<String>,
    pub done: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Hands out request-scoped sessions.
#[async_trait]
pub trait TodoStore: Send + Sync {
    async fn session(&self) -> Result<Box<dyn TodoSession>, StoreError>;
}

/// One unit of work against the `todos` table.
///
/// Changes become visible to other sessions only after `commit`.
#[async_trait]
pub trait TodoSession: Send {
    async fn insert(&mut self, todo: &Todo) -> Result<(), StoreError>;

    async fn fetch_all(&mut self) -> Result<Vec<Todo>, StoreError>;

    /// `Ok(None)` on a miss.
    async fn fetch(&mut self, id: Uuid) -> Result<Option<Todo>, StoreError>;

    /// Writes every column of `todo` back to the row with the same id.
    /// `Ok(false)` when no such row exists any more.
    async fn update(&mut self, todo: &Todo) -> Result<bool, StoreError>;

    async fn delete(&mut self, id: Uuid) -> Result<(), StoreError>;

    async fn commit(self: Box<Self>) -> Result<(), StoreError>;
}
