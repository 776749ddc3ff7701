//! HTTP routes for browsing and downloading library files.
//!
//! The handlers are a thin mapping from [`LibraryManager`] outcomes to
//! responses:
//!
//! | Route | Outcome |
//! |-------|---------|
//! | `GET /library` | JSON tree |
//! | `GET /library/{*path}` | streamed bytes, `404` or `400` |
//! | `GET /health` | liveness probe |
//!
//! All filesystem work runs on the blocking thread pool. Rejected and
//! missing paths produce the same `404` body so clients cannot probe for
//! files outside the library.

use std::future::Future;
use std::sync::Arc;

use axum::body::Body;
use axum::extract::rejection::PathRejection;
use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use library::{Entry, LibraryManager, ServeOutcome, ServedFile};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tokio_util::io::ReaderStream;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info};

use crate::config::ServerConfig;

/// Read buffer used when streaming files (64KB).
pub const STREAM_CHUNK_SIZE: usize = 64 * 1024;

/// Shared state injected into all handlers.
#[derive(Clone)]
pub struct AppState {
    library: Arc<LibraryManager>,
}

impl AppState {
    pub fn new(library: Arc<LibraryManager>) -> Self {
        Self { library }
    }
}

/// Body of `GET /library`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibraryListing {
    pub success: bool,
    pub items: Vec<Entry>,
}

/// Body of every error response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub success: bool,
    pub error: String,
}

/// Body of `GET /health`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthBody {
    pub success: bool,
    pub status: String,
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(ErrorBody {
            success: false,
            error: message.to_string(),
        }),
    )
        .into_response()
}

/// Build the application router.
pub fn router(library: Arc<LibraryManager>, config: &ServerConfig) -> Router {
    let mut app = Router::new()
        .route("/health", get(health))
        .route("/library", get(list_library))
        .route("/library/{*path}", get(serve_library_file));

    if let Some(static_dir) = &config.static_dir {
        debug!("Serving static files from {:?}", static_dir);
        app = app.nest_service("/static", ServeDir::new(static_dir));
    }

    let mut app = app
        .fallback(endpoint_not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(AppState::new(library));

    if config.cors {
        let cors = CorsLayer::new()
            .allow_methods([Method::GET, Method::HEAD])
            .allow_origin(Any);
        app = app.layer(cors);
    }

    app
}

/// Serve `app` on `listener` until `shutdown` resolves.
pub async fn serve<F>(listener: TcpListener, app: Router, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    info!("Listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;
    info!("HTTP server stopped");
    Ok(())
}

async fn health() -> Json<HealthBody> {
    Json(HealthBody {
        success: true,
        status: "ok".to_string(),
    })
}

async fn list_library(State(state): State<AppState>) -> Response {
    let library = state.library.clone();

    match tokio::task::spawn_blocking(move || library.list_library()).await {
        Ok(items) => Json(LibraryListing {
            success: true,
            items,
        })
        .into_response(),
        Err(e) => {
            error!("Library listing task failed: {}", e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Server error")
        }
    }
}

async fn serve_library_file(
    State(state): State<AppState>,
    requested: Result<Path<String>, PathRejection>,
) -> Response {
    // Undecodable paths (e.g. invalid UTF-8) are malformed input.
    let Ok(Path(requested)) = requested else {
        debug!("rejected undecodable library path");
        return error_response(StatusCode::NOT_FOUND, "File not found");
    };
    let library = state.library.clone();

    let outcome =
        match tokio::task::spawn_blocking(move || library.resolve_for_serving(&requested)).await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!("Path resolution task failed: {}", e);
                return error_response(StatusCode::INTERNAL_SERVER_ERROR, "Server error");
            }
        };

    match outcome {
        ServeOutcome::File(file) => stream_file(file).await,
        ServeOutcome::NotFound => error_response(StatusCode::NOT_FOUND, "File not found"),
        ServeOutcome::Invalid => error_response(StatusCode::BAD_REQUEST, "Invalid file path"),
    }
}

/// Stream a resolved file without reading it into memory.
async fn stream_file(file: ServedFile) -> Response {
    // The file can disappear or become unreadable after resolution.
    let handle = match tokio::fs::File::open(&file.path).await {
        Ok(handle) => handle,
        Err(e) => {
            debug!(error = %e, "resolved library file could not be opened");
            return error_response(StatusCode::NOT_FOUND, "File not found");
        }
    };

    let length = match handle.metadata().await {
        Ok(metadata) => metadata.len(),
        Err(_) => file.size,
    };

    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_str(&file.mime)
            .unwrap_or_else(|_| HeaderValue::from_static("application/octet-stream")),
    );
    headers.insert(header::CONTENT_LENGTH, HeaderValue::from(length));

    let stream = ReaderStream::with_capacity(handle, STREAM_CHUNK_SIZE);
    (StatusCode::OK, headers, Body::from_stream(stream)).into_response()
}

async fn endpoint_not_found() -> Response {
    error_response(StatusCode::NOT_FOUND, "Endpoint not found")
}
