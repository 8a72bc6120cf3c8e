//! HTTP API for a single table of todo items.
//!
//! # Overview
//! Five routes translate HTTP verbs into store operations:
//! `GET /` (greeting), `GET /todos`, `POST /todos`, `PATCH /todos/{id}` and
//! `DELETE /todos/{id}`. Input is validated before a store session is opened;
//! each request gets its own session and nothing else is shared between
//! requests.
//!
//! # Design
//! - `store` owns persistence behind the `TodoStore` / `TodoSession` traits,
//!   with Postgres and in-memory backends.
//! - `models` holds the create, update and read shapes and the partial-update
//!   merge.
//! - `handlers` wires them together; `error` maps failures to status codes.

pub mod config;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod models;
pub mod store;

use std::sync::Arc;

use axum::{
    http::HeaderValue,
    routing::{get, patch},
    Router,
};
use tokio::net::TcpListener;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

pub use config::ServerConfig;
pub use models::{TodoCreate, TodoRead, TodoUpdate};
pub use store::{MemoryTodoStore, PgTodoStore, Todo, TodoStore};

/// Shared by every handler. Holds no per-request state.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn TodoStore>,
}

/// Router with the default front-end origins allowed.
pub fn app(store: Arc<dyn TodoStore>) -> Router {
    app_with_origins(store, &ServerConfig::default().allowed_origins)
}

pub fn app_with_origins(store: Arc<dyn TodoStore>, allowed_origins: &[String]) -> Router {
    Router::new()
        .route("/", get(handlers::health))
        .route("/todos", get(handlers::list_todos).post(handlers::create_todo))
        .route(
            "/todos/{id}",
            patch(handlers::update_todo).delete(handlers::delete_todo),
        )
        .layer(cors_layer(allowed_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(AppState { store })
}

/// Only the listed origins, with credentials. Methods and headers are
/// mirrored from the preflight because wildcards are not allowed alongside
/// credentials.
fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(%origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_credentials(true)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
}

pub async fn run(listener: TcpListener, store: Arc<dyn TodoStore>) -> Result<(), std::io::Error> {
    axum::serve(listener, app(store)).await
}

/// Like `run`, with the given origins and a graceful stop on `shutdown_signal`.
pub async fn serve(
    listener: TcpListener,
    store: Arc<dyn TodoStore>,
    allowed_origins: &[String],
) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with_origins(store, allowed_origins))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

/// Resolves on Ctrl+C or SIGTERM.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("received Ctrl+C, shutting down"),
        _ = terminate => tracing::info!("received SIGTERM, shutting down"),
    }
}
