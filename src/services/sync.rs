//! Sync service — apply client notifications to component state.
//!
//! DESIGN
//! ======
//! `handle_event` is the single entry point for client-originated changes:
//!
//! 1. Resolve the target component. Unknown ids (stale renders after a
//!    reload) are dropped with a warning.
//! 2. Record the focused component when the notification names one.
//! 3. Gate on subscriptions. Upload and structured-value widgets are always
//!    admitted; other widgets skip kinds they never subscribed to, silently.
//! 4. Extract the value (`FormValues::extract`) and apply it.
//!
//! Text values are checked, extracted and applied under one component lock,
//! so two notifications for the same component never interleave. File
//! values are streamed to disk with no lock held and then applied in a
//! second, short locked step.
//!
//! ERROR HANDLING
//! ==============
//! Routing gaps and extraction gaps are outcomes, not errors. Only intake
//! I/O failures surface as `SyncError`, and no state is committed for them.

use std::sync::Arc;

use futures::future::join_all;
use serde::Serialize;
use tracing::{debug, warn};

use crate::component::{self, ComponentId, SharedWidget, Update, ValueSource};
use crate::notification::{ErrorCode, Notification, NotificationError, PARAM_COMPONENT_VALUE};
use crate::payload::{FilePart, SyncPayload};
use crate::services::intake::{IntakeError, TempStore, UploadArtifact};
use crate::services::page::Page;

// =============================================================================
// TYPES
// =============================================================================

/// What happened to one notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncOutcome {
    /// A new value was stored.
    Applied,
    /// The notification carried no usable value; state is untouched.
    Unchanged,
    /// The component is not subscribed to this event kind.
    Ignored,
    /// The target component does not exist (any more).
    Dropped,
}

impl SyncOutcome {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Applied => "applied",
            Self::Unchanged => "unchanged",
            Self::Ignored => "ignored",
            Self::Dropped => "dropped",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error(transparent)]
    Notification(#[from] NotificationError),
    #[error(transparent)]
    Intake(#[from] IntakeError),
}

impl ErrorCode for SyncError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Notification(e) => e.error_code(),
            Self::Intake(e) => e.error_code(),
        }
    }

    fn retryable(&self) -> bool {
        match self {
            Self::Notification(e) => e.retryable(),
            Self::Intake(e) => e.retryable(),
        }
    }
}

// =============================================================================
// HANDLER
// =============================================================================

/// Apply one notification to its target component.
///
/// # Errors
///
/// Returns `SyncError::Intake` when an uploaded file cannot be persisted.
pub async fn handle_event(
    page: &Page,
    store: &TempStore,
    notification: &Notification,
    payload: SyncPayload<'_>,
) -> Result<SyncOutcome, SyncError> {
    let cid = notification.component_id;
    let kind = notification.event_kind;

    let Some(widget) = page.get(cid) else {
        warn!(page_id = %page.id(), %cid, et = kind.code(), "sync: dropped notification for unknown component");
        return Ok(SyncOutcome::Dropped);
    };

    if let Some(focused) = notification.focused_component_id {
        page.set_focused(focused);
    }

    let SyncPayload { values, file } = payload;

    {
        let mut guard = component::lock(&widget);
        if !guard.sync_policy().admits(guard.core().sync_kinds(), kind) {
            return Ok(SyncOutcome::Ignored);
        }
        if guard.value_source() == ValueSource::Text {
            let Some(text) = values.extract(PARAM_COMPONENT_VALUE).into_update() else {
                debug!(page_id = %page.id(), %cid, "sync: value absent, state unchanged");
                return Ok(SyncOutcome::Unchanged);
            };
            if guard.apply(Update::Text(text)).is_err() {
                debug!(page_id = %page.id(), %cid, "sync: component rejected text value");
                return Ok(SyncOutcome::Unchanged);
            }
            return Ok(SyncOutcome::Applied);
        }
    }

    let Some(part) = file else {
        warn!(page_id = %page.id(), %cid, "sync: upload notification without file part");
        return Ok(SyncOutcome::Unchanged);
    };
    apply_file(page, store, &widget, cid, part).await
}

/// Stream the file to disk, then hand the artifact to the component if it
/// is still the one that was resolved.
async fn apply_file(
    page: &Page,
    store: &TempStore,
    widget: &SharedWidget,
    cid: ComponentId,
    part: FilePart<'_>,
) -> Result<SyncOutcome, SyncError> {
    let artifact = store.intake(part).await?;

    let applied = match page.get(cid) {
        Some(current) if Arc::ptr_eq(&current, widget) => {
            let mut guard = component::lock(&current);
            guard.apply(Update::Artifact(artifact))
        }
        _ => Err(Update::Artifact(artifact)),
    };

    match applied {
        Ok(displaced) => {
            if let Some(previous) = displaced {
                debug!(page_id = %page.id(), %cid, "sync: newer upload replaced held file");
                discard_orphan(page, cid, previous).await;
            }
            Ok(SyncOutcome::Applied)
        }
        Err(rejected) => {
            let outcome = if page.get(cid).is_some() { SyncOutcome::Unchanged } else { SyncOutcome::Dropped };
            if let Update::Artifact(orphan) = rejected {
                warn!(page_id = %page.id(), %cid, "sync: upload not accepted, discarding stored file");
                discard_orphan(page, cid, orphan).await;
            }
            Ok(outcome)
        }
    }
}

/// Remove a stored file no component holds any more.
async fn discard_orphan(page: &Page, cid: ComponentId, orphan: UploadArtifact) {
    if let Err(e) = orphan.discard().await {
        warn!(page_id = %page.id(), %cid, error = %e, "sync: failed to remove orphaned upload");
    }
}

/// Apply independent notifications concurrently. Results are returned in
/// input order; one entry failing never affects another.
pub async fn handle_batch<'a>(
    page: &Page,
    store: &TempStore,
    entries: Vec<(Notification, SyncPayload<'a>)>,
) -> Vec<Result<SyncOutcome, SyncError>> {
    join_all(
        entries
            .into_iter()
            .map(|(notification, payload)| async move { handle_event(page, store, &notification, payload).await }),
    )
    .await
}

#[cfg(test)]
#[path = "sync_test.rs"]
mod tests;
