//! Schema-bound structured-data editor.
//!
//! DESIGN
//! ======
//! The server supplies a schema and holds the current value as an opaque
//! string. The client-side editor is built from the schema, starts from the
//! current value (or the schema defaults when the value is empty) and sends
//! the whole document back on every change.
//!
//! - The schema is never touched by client input.
//! - Incoming values are stored verbatim. Validation happens in the browser
//!   only; the server does not parse the value.
//! - Value changes always synchronize regardless of subscriptions.

use std::fmt;

use serde::Serialize;
use serde_json::Value;

use crate::component::{
    ComponentCore, ComponentId, HasEnabled, HasReadOnly, HasText, Update, Widget, WidgetKind,
};
use crate::event::EventKind;
use crate::render::{self, ClientConfig, RenderContext};
use crate::services::intake::UploadArtifact;
use crate::subscription::SyncPolicy;

pub const JSON_EDIT_CLASS: &str = "sui-JsonEdit";

/// Options forwarded to the client-side JSON editor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JsonEditorOptions {
    pub theme: String,
    pub iconlib: String,
    /// When validation errors are shown: `interaction`, `change` or `always`.
    pub show_errors: String,
    pub disable_collapse: bool,
    pub disable_edit_json: bool,
    pub disable_properties: bool,
}

impl Default for JsonEditorOptions {
    fn default() -> Self {
        Self {
            theme: "bootstrap4".into(),
            iconlib: "bootstrap3".into(),
            show_errors: "change".into(),
            disable_collapse: true,
            disable_edit_json: true,
            disable_properties: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct JsonEdit {
    core: ComponentCore,
    schema: Value,
    value: String,
    options: JsonEditorOptions,
}

impl JsonEdit {
    #[must_use]
    pub fn new(id: ComponentId, schema: Value) -> Self {
        let mut core = ComponentCore::new(id, JSON_EDIT_CLASS);
        core.add_sync_on(&[EventKind::Change]);
        Self { core, schema, value: String::new(), options: JsonEditorOptions::default() }
    }

    #[must_use]
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self
    }

    #[must_use]
    pub fn schema(&self) -> &Value {
        &self.schema
    }

    /// Current value, verbatim as last received. May be empty.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    #[must_use]
    pub fn options(&self) -> &JsonEditorOptions {
        &self.options
    }

    pub fn options_mut(&mut self) -> &mut JsonEditorOptions {
        &mut self.options
    }
}

impl Widget for JsonEdit {
    fn core(&self) -> &ComponentCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ComponentCore {
        &mut self.core
    }

    fn kind(&self) -> WidgetKind {
        WidgetKind::JsonEdit
    }

    fn sync_policy(&self) -> SyncPolicy {
        SyncPolicy::Always
    }

    fn apply(&mut self, update: Update) -> Result<Option<UploadArtifact>, Update> {
        match update {
            Update::Text(value) => {
                self.value = value;
                Ok(None)
            }
            other @ Update::Artifact(_) => Err(other),
        }
    }

    fn render(&self, out: &mut dyn fmt::Write, ctx: &RenderContext) -> fmt::Result {
        out.write_str("<div")?;
        render::write_attrs(out, &self.core)?;
        out.write_str("></div>")?;

        let mut config = ClientConfig::new(&self.core, self.kind(), ctx);
        config.read_only = self.read_only();
        config.schema = Some(&self.schema);
        config.value = (!self.value.is_empty()).then_some(self.value.as_str());
        config.options = Some(&self.options);
        render::write_config(out, &config)
    }

    fn as_text(&self) -> Option<&dyn HasText> {
        Some(self)
    }
}

impl HasText for JsonEdit {
    fn text(&self) -> &str {
        &self.value
    }

    fn set_text(&mut self, text: String) {
        self.value = text;
    }
}

impl HasEnabled for JsonEdit {}

impl HasReadOnly for JsonEdit {}

#[cfg(test)]
#[path = "json_edit_test.rs"]
mod tests;
