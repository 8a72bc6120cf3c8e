use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use super::{StoreError, Todo, TodoSession, TodoStore};

const SELECT_ALL: &str = "SELECT id, name, description, due, priority, done FROM todos";
const SELECT_ONE: &str =
    "SELECT id, name, description, due, priority, done FROM todos WHERE id = $1";

/// `TodoStore` backed by the `todos` table.
#[derive(Debug, Clone)]
pub struct PgTodoStore {
    pool: PgPool,
}

impl PgTodoStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TodoStore for PgTodoStore {
    async fn session(&self) -> Result<Box<dyn TodoSession>, StoreError> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PgTodoSession { tx }))
    }
}

/// One pooled connection inside an open transaction.
///
/// sqlx rolls the transaction back and returns the connection to the pool
/// when this is dropped uncommitted.
struct PgTodoSession {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl TodoSession for PgTodoSession {
    async fn insert(&mut self, todo: &Todo) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO todos (id, name, description, due, priority, done)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(todo.id)
        .bind(&todo.name)
        .bind(&todo.description)
        .bind(todo.due)
        .bind(&todo.priority)
        .bind(todo.done)
        .execute(&mut *self.tx)
        .await?;
        Ok(())
    }

    async fn fetch_all(&mut self) -> Result<Vec<Todo>, StoreError> {
        let todos = sqlx::query_as::<_, Todo>(SELECT_ALL)
            .fetch_all(&mut *self.tx)
            .await?;
        Ok(todos)
    }

    async fn fetch(&mut self, id: Uuid) -> Result<Option<Todo>, StoreError> {
        let todo = sqlx::query_as::<_, Todo>(SELECT_ONE)
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await?;
        Ok(todo)
    }

    async fn update(&mut self, todo: &Todo) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE todos
            SET name = $2, description = $3, due = $4, priority = $5, done = $6
            WHERE id = $1
            "#,
        )
        .bind(todo.id)
        .bind(&todo.name)
        .bind(&todo.description)
        .bind(todo.due)
        .bind(&todo.priority)
        .bind(todo.done)
        .execute(&mut *self.tx)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete(&mut self, id: Uuid) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM todos WHERE id = $1")
            .bind(id)
            .execute(&mut *self.tx)
            .await?;
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        self.tx.commit().await?;
        Ok(())
    }
}
