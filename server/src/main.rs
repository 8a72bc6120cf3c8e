use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use todo_server::store::{db, schema};
use todo_server::{serve, MemoryTodoStore, PgTodoStore, ServerConfig, TodoStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,todo_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env().context("invalid configuration")?;

    let store: Arc<dyn TodoStore> = match &config.database_url {
        Some(url) => {
            let pool = db::create_pool(url, config.max_connections)
                .await
                .context("failed to connect to database")?;
            schema::init(&pool).await.context("failed to create schema")?;
            tracing::info!(max_connections = config.max_connections, "connected to database");
            Arc::new(PgTodoStore::new(pool))
        }
        None => {
            tracing::warn!("DATABASE_URL not set, todos are kept in memory only");
            Arc::new(MemoryTodoStore::new())
        }
    };

    let listener = TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;
    tracing::info!("listening on {}", config.bind_addr);

    serve(listener, store, &config.allowed_origins).await?;

    tracing::info!("server stopped");
    Ok(())
}
