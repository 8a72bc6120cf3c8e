//! Startup schema bootstrap.
//!
//! There is no migration history: the table is created when missing and
//! left alone otherwise. Call `init` once before the listener is bound.

use sqlx::PgPool;

use super::StoreError;

const CREATE_TODOS: &str = r#"
    CREATE TABLE IF NOT EXISTS todos (
        id UUID PRIMARY KEY,
        name TEXT NOT NULL,
        description TEXT,
        due TIMESTAMPTZ,
        priority TEXT,
        done BOOLEAN NOT NULL DEFAULT FALSE
    )
"#;

/// Create the `todos` table if it does not exist yet. Idempotent.
pub async fn init(pool: &PgPool) -> Result<(), StoreError> {
    tracing::info!("ensuring todos table exists");
    sqlx::query(CREATE_TODOS).execute(pool).await?;
    Ok(())
}
