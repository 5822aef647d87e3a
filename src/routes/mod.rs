//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! Pages are rendered server-side; the browser loads one static script that
//! posts notifications back to `/sync` (values) and `/upload` (files).

pub mod page;
pub mod sync;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::StatusCode;
use axum::routing::{get, post};
use tower_http::trace::TraceLayer;

use crate::render::{CLIENT_SCRIPT_PATH, SYNC_PATH, UPLOAD_PATH};
use crate::state::AppState;

/// Slack for multipart boundaries and text parts on top of the file limit.
const MULTIPART_OVERHEAD: u64 = 64 * 1024;

pub fn app(state: AppState) -> Router {
    let upload_limit = match state.config.upload_max_bytes {
        Some(max) => usize::try_from(max.saturating_add(MULTIPART_OVERHEAD))
            .map_or_else(|_| DefaultBodyLimit::disable(), DefaultBodyLimit::max),
        None => DefaultBodyLimit::disable(),
    };

    Router::new()
        .route("/", get(page::new_page))
        .route("/page/{pid}", get(page::show_page))
        .route(SYNC_PATH, post(sync::post_sync))
        .route("/sync/batch", post(sync::post_sync_batch))
        .route(UPLOAD_PATH, post(sync::post_upload).layer(upload_limit))
        .route(CLIENT_SCRIPT_PATH, get(page::client_script))
        .route("/healthz", get(healthz))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}
