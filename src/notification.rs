//! Notification — the unit crossing the synchronization boundary.
//!
//! ARCHITECTURE
//! ============
//! Every client interaction that must reach the server arrives as a
//! notification: which page, which component, which kind of event, and
//! which component held focus when it was sent. The value itself stays in
//! the accompanying `SyncPayload` so that absent, empty and file values can
//! be told apart.
//!
//! DESIGN
//! ======
//! - Routing fields are parsed once, here, from the form parameters below.
//! - The focused component may differ from the target: a button click can
//!   submit while a text field still holds focus.
//! - Errors carry a grepable code via `ErrorCode`, mirrored into JSON error
//!   bodies by the routes.

use std::fmt;

use uuid::Uuid;

use crate::component::ComponentId;
use crate::event::EventKind;
use crate::payload::FormValues;

// =============================================================================
// FIELD CONSTANTS
// =============================================================================

/// Page id parameter.
pub const PARAM_PAGE_ID: &str = "pid";

/// Event kind parameter (wire code).
pub const PARAM_EVENT_KIND: &str = "et";

/// Target component id parameter.
pub const PARAM_COMPONENT_ID: &str = "cid";

/// Component value parameter. Also the multipart file field name.
pub const PARAM_COMPONENT_VALUE: &str = "cval";

/// Focused component id parameter.
pub const PARAM_FOCUSED_COMPONENT_ID: &str = "fcid";

// =============================================================================
// ERROR CODES
// =============================================================================

/// Grepable error code and retryable flag for structured error bodies.
pub trait ErrorCode: fmt::Display {
    fn error_code(&self) -> &'static str;

    fn retryable(&self) -> bool {
        false
    }
}

#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    #[error("missing parameter: {0}")]
    Missing(&'static str),
    #[error("invalid {param}: {value:?}")]
    Invalid { param: &'static str, value: String },
}

impl ErrorCode for NotificationError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Missing(_) => "E_MISSING_PARAM",
            Self::Invalid { .. } => "E_INVALID_PARAM",
        }
    }
}

// =============================================================================
// NOTIFICATION
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Notification {
    pub component_id: ComponentId,
    pub event_kind: EventKind,
    pub focused_component_id: Option<ComponentId>,
}

impl Notification {
    #[must_use]
    pub fn new(component_id: ComponentId, event_kind: EventKind) -> Self {
        Self { component_id, event_kind, focused_component_id: None }
    }

    #[must_use]
    pub fn with_focused(mut self, focused: ComponentId) -> Self {
        self.focused_component_id = Some(focused);
        self
    }

    /// Parse routing fields from form values. An `fcid` that is not a
    /// component id (the client reports whatever element had focus) is
    /// treated as absent.
    ///
    /// # Errors
    ///
    /// Returns `Missing` or `Invalid` for a bad `et` or `cid`.
    pub fn from_values(values: &FormValues) -> Result<Self, NotificationError> {
        let component_id = parse_component_id(values, PARAM_COMPONENT_ID)?;
        let event_kind = parse_event_kind(values)?;
        let focused_component_id = values
            .first(PARAM_FOCUSED_COMPONENT_ID)
            .and_then(|raw| raw.parse().ok());

        Ok(Self { component_id, event_kind, focused_component_id })
    }
}

/// Parse the page id parameter.
///
/// # Errors
///
/// Returns `Missing` or `Invalid` when `pid` is absent or not a UUID.
pub fn parse_page_id(values: &FormValues) -> Result<Uuid, NotificationError> {
    let raw = values
        .first(PARAM_PAGE_ID)
        .ok_or(NotificationError::Missing(PARAM_PAGE_ID))?;
    raw.trim()
        .parse()
        .map_err(|_| NotificationError::Invalid { param: PARAM_PAGE_ID, value: raw.to_string() })
}

fn parse_component_id(values: &FormValues, param: &'static str) -> Result<ComponentId, NotificationError> {
    let raw = values.first(param).ok_or(NotificationError::Missing(param))?;
    raw.parse()
        .map_err(|_| NotificationError::Invalid { param, value: raw.to_string() })
}

fn parse_event_kind(values: &FormValues) -> Result<EventKind, NotificationError> {
    let raw = values
        .first(PARAM_EVENT_KIND)
        .ok_or(NotificationError::Missing(PARAM_EVENT_KIND))?;
    raw.trim()
        .parse::<u8>()
        .ok()
        .and_then(EventKind::from_code)
        .ok_or_else(|| NotificationError::Invalid { param: PARAM_EVENT_KIND, value: raw.to_string() })
}

#[cfg(test)]
#[path = "notification_test.rs"]
mod tests;
