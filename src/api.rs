mod ingest;
mod liveness;
mod query;

use std::fmt;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context as _, Result};
use axum::Router;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use tokio::net::TcpListener;

use crate::config::QueryFormat;
use crate::store::RoomStateStore;

pub use ingest::ingest;
pub use liveness::liveness;
pub use query::query;

#[derive(Debug, Clone)]
pub struct AppState {
    pub store: Arc<RoomStateStore>,

    /// Empty when not configured, which rejects every write.
    pub api_key: Arc<str>,

    pub query_format: QueryFormat,
}

impl AppState {
    pub fn new(store: Arc<RoomStateStore>, api_key: &str, query_format: QueryFormat) -> Self {
        Self {
            store,
            api_key: Arc::from(api_key),
            query_format,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestError {
    Unauthorized,
    InvalidRange,
}

impl fmt::Display for IngestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unauthorized => write!(f, "missing or invalid API key"),
            Self::InvalidRange => write!(f, "invalid range"),
        }
    }
}

impl std::error::Error for IngestError {}

impl IntoResponse for IngestError {
    fn into_response(self) -> Response {
        match self {
            IngestError::Unauthorized => StatusCode::UNAUTHORIZED.into_response(),
            IngestError::InvalidRange => (StatusCode::BAD_REQUEST, self.to_string()).into_response(),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(liveness))
        .route("/api/room/{room_id}", get(query).post(ingest))
        .with_state(state)
}

/// Serves until `shutdown` resolves. Handlers see the peer address of every
/// connection.
pub async fn serve<F>(listener: TcpListener, state: AppState, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(
        listener,
        router(state).into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown)
    .await
    .context("HTTP server failed")
}
