use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{StoreError, Todo, TodoSession, TodoStore};

pub type Db = Arc<RwLock<Vec<Todo>>>;

/// In-process `TodoStore`. Rows are kept in insertion order.
#[derive(Clone, Debug, Default)]
pub struct MemoryTodoStore {
    db: Db,
}

impl MemoryTodoStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of committed rows.
    pub async fn len(&self) -> usize {
        self.db.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.db.read().await.is_empty()
    }
}

#[async_trait]
impl TodoStore for MemoryTodoStore {
    async fn session(&self) -> Result<Box<dyn TodoSession>, StoreError> {
        let view = self.db.read().await.clone();
        Ok(Box::new(MemorySession {
            db: Arc::clone(&self.db),
            view,
            staged: Vec::new(),
        }))
    }
}

#[derive(Clone)]
enum Change {
    Insert(Todo),
    Update(Todo),
    Delete(Uuid),
}

impl Change {
    fn apply(self, rows: &mut Vec<Todo>) {
        match self {
            Change::Insert(todo) => rows.push(todo),
            Change::Update(todo) => {
                if let Some(row) = rows.iter_mut().find(|row| row.id == todo.id) {
                    *row = todo;
                }
            }
            Change::Delete(id) => rows.retain(|row| row.id != id),
        }
    }
}

/// Snapshot taken at session start plus the session's own staged changes.
/// Nothing reaches the shared rows until `commit`.
struct MemorySession {
    db: Db,
    view: Vec<Todo>,
    staged: Vec<Change>,
}

impl MemorySession {
    fn stage(&mut self, change: Change) {
        change.clone().apply(&mut self.view);
        self.staged.push(change);
    }

    fn inserted_here(&self, id: Uuid) -> bool {
        self.staged
            .iter()
            .any(|change| matches!(change, Change::Insert(todo) if todo.id == id))
    }
}

#[async_trait]
impl TodoSession for MemorySession {
    async fn insert(&mut self, todo: &Todo) -> Result<(), StoreError> {
        self.stage(Change::Insert(todo.clone()));
        Ok(())
    }

    async fn fetch_all(&mut self) -> Result<Vec<Todo>, StoreError> {
        Ok(self.view.clone())
    }

    async fn fetch(&mut self, id: Uuid) -> Result<Option<Todo>, StoreError> {
        Ok(self.view.iter().find(|row| row.id == id).cloned())
    }

    /// Like a Postgres `UPDATE` under read committed, this sees rows other
    /// sessions have deleted and committed since the snapshot was taken.
    async fn update(&mut self, todo: &Todo) -> Result<bool, StoreError> {
        let in_view = self.view.iter().any(|row| row.id == todo.id);
        let committed = self.db.read().await.iter().any(|row| row.id == todo.id);
        if !in_view || !(committed || self.inserted_here(todo.id)) {
            return Ok(false);
        }
        self.stage(Change::Update(todo.clone()));
        Ok(true)
    }

    async fn delete(&mut self, id: Uuid) -> Result<(), StoreError> {
        self.stage(Change::Delete(id));
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        let MemorySession { db, staged, .. } = *self;
        let mut rows = db.write().await;
        for change in staged {
            change.apply(&mut rows);
        }
        Ok(())
    }
}
