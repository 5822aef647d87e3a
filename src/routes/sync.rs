//! Sync and upload routes.
//!
//! DESIGN
//! ======
//! These handlers only translate HTTP into `Notification` + `SyncPayload`
//! and outcomes back into JSON. All state changes happen in
//! `services::sync`.
//!
//! Multipart uploads are streamed: the text parts (`pid`, `et`, `cid`,
//! `fcid`) must precede the single file part `cval`, so the target is known
//! before the first file byte is read and the body is never buffered.
//!
//! Upload responses never echo internal errors. Clients get a definitive
//! `uploaded: true` or a generic failure.

use std::io;
use std::sync::atomic::{AtomicU64, Ordering};

use axum::Json;
use axum::body::Bytes;
use axum::extract::{Form, Multipart, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::component::ComponentId;
use crate::event::EventKind;
use crate::notification::{
    self, ErrorCode, Notification, NotificationError, PARAM_COMPONENT_VALUE, PARAM_EVENT_KIND,
};
use crate::payload::{FilePart, FormValues, SyncPayload};
use crate::services::intake::IntakeError;
use crate::services::page;
use crate::services::sync::{self, SyncError, SyncOutcome};
use crate::state::AppState;

const UPLOAD_FAILED: &str = "upload failed";

// =============================================================================
// RESPONSES
// =============================================================================

#[derive(Debug, Serialize)]
pub struct SyncResponse {
    pub status: SyncOutcome,
}

/// Structured error body, mirrors `ErrorCode`.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub retryable: bool,
}

impl ErrorBody {
    pub fn from_error(err: &(impl ErrorCode + ?Sized)) -> Self {
        Self { code: err.error_code(), message: err.to_string(), retryable: err.retryable() }
    }
}

/// Error response for the sync endpoints.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub body: ErrorBody,
}

impl ApiError {
    fn page_not_found(page_id: Uuid) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            body: ErrorBody {
                code: "E_PAGE_NOT_FOUND",
                message: format!("page not found: {page_id}"),
                retryable: false,
            },
        }
    }
}

impl From<NotificationError> for ApiError {
    fn from(err: NotificationError) -> Self {
        Self { status: StatusCode::BAD_REQUEST, body: ErrorBody::from_error(&err) }
    }
}

impl From<SyncError> for ApiError {
    fn from(err: SyncError) -> Self {
        Self { status: sync_error_to_status(&err), body: ErrorBody::from_error(&err) }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

pub(crate) fn sync_error_to_status(err: &SyncError) -> StatusCode {
    match err {
        SyncError::Notification(_) => StatusCode::BAD_REQUEST,
        SyncError::Intake(IntakeError::TooLarge { .. }) => StatusCode::PAYLOAD_TOO_LARGE,
        SyncError::Intake(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

// =============================================================================
// POST /sync
// =============================================================================

/// `POST /sync` — apply one url-encoded notification.
pub async fn post_sync(
    State(state): State<AppState>,
    Form(pairs): Form<Vec<(String, String)>>,
) -> Result<Json<SyncResponse>, ApiError> {
    let values = FormValues::from_pairs(pairs);
    let page_id = notification::parse_page_id(&values)?;
    let notification = Notification::from_values(&values)?;

    let Some(page) = page::lookup(&state, page_id).await else {
        return Err(ApiError::page_not_found(page_id));
    };

    let status = sync::handle_event(&page, &state.store, &notification, SyncPayload::from_values(values)).await?;
    Ok(Json(SyncResponse { status }))
}

// =============================================================================
// POST /sync/batch
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct BatchRequest {
    pub pid: Uuid,
    pub events: Vec<BatchEvent>,
}

#[derive(Debug, Deserialize)]
pub struct BatchEvent {
    pub et: u8,
    pub cid: ComponentId,
    #[serde(default)]
    pub fcid: Option<ComponentId>,
    #[serde(default)]
    pub cval: Option<BatchValue>,
}

/// `cval` as a single value or a list; `[]` lists the name with no values.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum BatchValue {
    One(String),
    Many(Vec<String>),
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum BatchResult {
    Outcome { status: SyncOutcome },
    Error { error: ErrorBody },
}

#[derive(Debug, Serialize)]
pub struct BatchResponse {
    pub results: Vec<BatchResult>,
}

impl BatchEvent {
    fn into_entry(self) -> Result<(Notification, SyncPayload<'static>), NotificationError> {
        let kind = EventKind::from_code(self.et).ok_or_else(|| NotificationError::Invalid {
            param: PARAM_EVENT_KIND,
            value: self.et.to_string(),
        })?;

        let mut notification = Notification::new(self.cid, kind);
        notification.focused_component_id = self.fcid;

        let mut values = FormValues::new();
        match self.cval {
            None => {}
            Some(BatchValue::One(v)) => values.push(PARAM_COMPONENT_VALUE, v),
            Some(BatchValue::Many(vs)) => {
                values.list_empty(PARAM_COMPONENT_VALUE);
                for v in vs {
                    values.push(PARAM_COMPONENT_VALUE, v);
                }
            }
        }
        Ok((notification, SyncPayload::from_values(values)))
    }
}

/// `POST /sync/batch` — apply several notifications for one page
/// concurrently. Each entry reports its own outcome or error.
pub async fn post_sync_batch(
    State(state): State<AppState>,
    Json(body): Json<BatchRequest>,
) -> Result<Json<BatchResponse>, ApiError> {
    let Some(page) = page::lookup(&state, body.pid).await else {
        return Err(ApiError::page_not_found(body.pid));
    };

    // Entries that fail to parse keep their slot; the rest run together.
    let mut slots: Vec<Option<BatchResult>> = Vec::with_capacity(body.events.len());
    let mut entries = Vec::new();
    for event in body.events {
        match event.into_entry() {
            Ok(entry) => {
                entries.push(entry);
                slots.push(None);
            }
            Err(e) => slots.push(Some(BatchResult::Error { error: ErrorBody::from_error(&e) })),
        }
    }

    let mut outcomes = sync::handle_batch(&page, &state.store, entries).await.into_iter();
    let results = slots
        .into_iter()
        .map(|slot| {
            slot.unwrap_or_else(|| match outcomes.next() {
                Some(Ok(status)) => BatchResult::Outcome { status },
                Some(Err(e)) => BatchResult::Error { error: ErrorBody::from_error(&e) },
                None => BatchResult::Outcome { status: SyncOutcome::Dropped },
            })
        })
        .collect();

    Ok(Json(BatchResponse { results }))
}

// =============================================================================
// POST /upload
// =============================================================================

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum UploadResponse {
    Done { uploaded: bool, name: String, size: u64 },
    Failed { uploaded: bool, error: &'static str },
}

impl UploadResponse {
    fn failed(status: StatusCode) -> (StatusCode, Json<Self>) {
        (status, Json(Self::Failed { uploaded: false, error: UPLOAD_FAILED }))
    }
}

/// `POST /upload` — streamed multipart upload for a file widget.
pub async fn post_upload(State(state): State<AppState>, mut multipart: Multipart) -> (StatusCode, Json<UploadResponse>) {
    let mut values = FormValues::new();

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => {
                warn!("upload: no file part");
                return UploadResponse::failed(StatusCode::BAD_REQUEST);
            }
            Err(e) => {
                warn!(error = %e, "upload: malformed multipart body");
                return UploadResponse::failed(StatusCode::BAD_REQUEST);
            }
        };

        let name = field.name().unwrap_or_default().to_string();
        if name != PARAM_COMPONENT_VALUE {
            match field.text().await {
                Ok(text) => values.push(name, text),
                Err(e) => {
                    warn!(error = %e, field = %name, "upload: unreadable text part");
                    return UploadResponse::failed(StatusCode::BAD_REQUEST);
                }
            }
            continue;
        }

        let (page_id, notification) = match notification::parse_page_id(&values)
            .and_then(|pid| Notification::from_values(&values).map(|n| (pid, n)))
        {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!(code = e.error_code(), error = %e, "upload: bad routing fields");
                return UploadResponse::failed(StatusCode::BAD_REQUEST);
            }
        };

        let Some(page) = page::lookup(&state, page_id).await else {
            warn!(%page_id, "upload: unknown page");
            return UploadResponse::failed(StatusCode::NOT_FOUND);
        };

        let original_name = field.file_name().unwrap_or_default().to_string();
        let received = AtomicU64::new(0);
        let chunks = field
            .map(|chunk| -> io::Result<Bytes> {
                let chunk = chunk.map_err(io::Error::other)?;
                received.fetch_add(chunk.len() as u64, Ordering::Relaxed);
                Ok(chunk)
            })
            .boxed();
        let payload = SyncPayload::from_values(values).with_file(FilePart::new(original_name.clone(), chunks));

        return match sync::handle_event(&page, &state.store, &notification, payload).await {
            Ok(SyncOutcome::Applied) => (
                StatusCode::OK,
                Json(UploadResponse::Done {
                    uploaded: true,
                    name: original_name,
                    size: received.load(Ordering::Relaxed),
                }),
            ),
            Ok(SyncOutcome::Dropped) => UploadResponse::failed(StatusCode::NOT_FOUND),
            Ok(outcome) => {
                warn!(%page_id, cid = %notification.component_id, outcome = outcome.as_str(), "upload: not applied");
                UploadResponse::failed(StatusCode::BAD_REQUEST)
            }
            Err(e) => {
                warn!(%page_id, cid = %notification.component_id, code = e.error_code(), error = %e, "upload: intake failed");
                UploadResponse::failed(sync_error_to_status(&e))
            }
        };
    }
}

#[cfg(test)]
#[path = "sync_test.rs"]
mod tests;
