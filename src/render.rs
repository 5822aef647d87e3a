//! Render pipeline helpers — escaping, attributes, and client configs.
//!
//! DESIGN
//! ======
//! Widgets render markup for their current state followed by one
//! `<script type="application/json" class="sui-config">` block. The block is
//! structured data, never script source: a single static, versioned client
//! script (`/static/syncui-v1.js`) reads every config on the page and binds
//! DOM events to the sync endpoint. Server state therefore never becomes
//! executable code, and widget variants share one client implementation.
//!
//! Rendering is pure. Everything here writes into a caller-supplied
//! `fmt::Write` sink and reads nothing but its arguments.

use std::fmt::{self, Write};

use serde::Serialize;
use uuid::Uuid;

use crate::component::json_edit::JsonEditorOptions;
use crate::component::{ComponentCore, ComponentId, WidgetKind};

// =============================================================================
// CONSTANTS
// =============================================================================

/// Path of the generic value-sync endpoint.
pub const SYNC_PATH: &str = "/sync";

/// Path of the dedicated multipart upload endpoint.
pub const UPLOAD_PATH: &str = "/upload";

/// Versioned path of the static client script.
pub const CLIENT_SCRIPT_PATH: &str = "/static/syncui-v1.js";

/// Class marking client config blocks.
pub const CONFIG_CLASS: &str = "sui-config";

// =============================================================================
// CONTEXT
// =============================================================================

/// Page-level facts a widget needs to wire its client behavior.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderContext {
    pub page_id: Uuid,
    pub sync_path: String,
    pub upload_path: String,
}

impl RenderContext {
    #[must_use]
    pub fn new(page_id: Uuid) -> Self {
        Self { page_id, sync_path: SYNC_PATH.into(), upload_path: UPLOAD_PATH.into() }
    }
}

// =============================================================================
// CLIENT CONFIG
// =============================================================================

/// Structured description of one widget's client behavior.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientConfig<'a> {
    pub id: ComponentId,
    pub widget: &'static str,
    pub page_id: Uuid,
    pub sync_path: &'a str,
    pub upload_path: &'a str,
    /// Event kind wire codes that trigger a sync call.
    pub events: Vec<u8>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub read_only: bool,
    /// Set when the component is not enabled. Containers such as `<div>`
    /// ignore the `disabled` attribute, so the client enforces it.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub disabled: bool,
    /// Rich-text editing on a `<div>` instead of a form control.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub rich: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<&'a serde_json::Value>,
    /// Current value of widgets the client builds itself: a JSON string
    /// for structured editors, markup for rich text. `None` when empty.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<&'a JsonEditorOptions>,
}

impl<'a> ClientConfig<'a> {
    #[must_use]
    pub fn new(core: &ComponentCore, kind: WidgetKind, ctx: &'a RenderContext) -> Self {
        Self {
            id: core.id(),
            widget: kind.as_str(),
            page_id: ctx.page_id,
            sync_path: &ctx.sync_path,
            upload_path: &ctx.upload_path,
            events: core.sync_kinds().codes(),
            read_only: false,
            disabled: !core.enabled(),
            rich: false,
            schema: None,
            value: None,
            options: None,
        }
    }
}

/// Write the config block for one widget.
///
/// # Errors
///
/// Propagates sink errors, or `fmt::Error` if the config fails to serialize.
pub fn write_config(out: &mut dyn Write, config: &ClientConfig<'_>) -> fmt::Result {
    let json = script_safe_json(config).map_err(|_| fmt::Error)?;
    write!(
        out,
        "<script type=\"application/json\" class=\"{CONFIG_CLASS}\" data-for=\"{}\">{json}</script>",
        config.id
    )
}

// =============================================================================
// ESCAPING
// =============================================================================

/// Serialize to JSON that is safe to embed inside a `<script>` element.
///
/// # Errors
///
/// Returns the serializer error.
pub fn script_safe_json<T: Serialize + ?Sized>(value: &T) -> Result<String, serde_json::Error> {
    let raw = serde_json::to_string(value)?;
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '<' => out.push_str("\\u003c"),
            '>' => out.push_str("\\u003e"),
            '&' => out.push_str("\\u0026"),
            '\u{2028}' => out.push_str("\\u2028"),
            '\u{2029}' => out.push_str("\\u2029"),
            c => out.push(c),
        }
    }
    Ok(out)
}

/// Escape text content.
#[must_use]
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            c => out.push(c),
        }
    }
    out
}

/// Escape a double-quoted attribute value.
#[must_use]
pub fn escape_attr(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

fn is_safe_attr_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == ':')
}

// =============================================================================
// ATTRIBUTES
// =============================================================================

/// Write ` id=".." class=".."`, custom attributes in insertion order, and
/// `disabled` when the component is not enabled. Attribute names that are
/// not plain identifiers are skipped.
///
/// # Errors
///
/// Propagates sink errors.
pub fn write_attrs(out: &mut dyn Write, core: &ComponentCore) -> fmt::Result {
    write!(out, " id=\"{}\"", core.id())?;

    let classes: Vec<&str> = core.classes().collect();
    if !classes.is_empty() {
        write!(out, " class=\"{}\"", escape_attr(&classes.join(" ")))?;
    }

    for (name, value) in core.attributes() {
        if is_safe_attr_name(name) {
            write!(out, " {name}=\"{}\"", escape_attr(value))?;
        }
    }

    if !core.enabled() {
        out.write_str(" disabled=\"disabled\"")?;
    }
    Ok(())
}

// =============================================================================
// DOCUMENT
// =============================================================================

/// Wrap rendered widget markup into a full HTML document that loads the
/// static client script.
#[must_use]
pub fn document(title: &str, body: &str) -> String {
    format!(
        "<!doctype html>\
<html><head><meta charset=\"utf-8\">\
<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\
<title>{}</title>\
</head><body>\
{body}\
<script src=\"{CLIENT_SCRIPT_PATH}\" defer></script>\
</body></html>",
        escape_html(title)
    )
}

#[cfg(test)]
#[path = "render_test.rs"]
mod tests;
