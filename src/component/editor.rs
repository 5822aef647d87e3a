//! Text editor widget.
//!
//! One configurable component covers the single-line and multi-line
//! variants: `rows == 1` renders an `<input type="text">`, `rows > 1` a
//! `<textarea>`. In rich mode the editor is a `<div>` the client turns into
//! an inline rich-text editor when one is loaded on the page; its text is
//! markup and every data change posts back as `Change`. By default the
//! value syncs on `Change` (blur or Enter). Per-keystroke sync is opt-in via
//! `add_sync_on(&[EventKind::KeyUp])`.

use std::fmt;

use crate::component::{
    ComponentCore, ComponentId, HasEnabled, HasReadOnly, HasText, Update, Widget, WidgetKind,
};
use crate::event::EventKind;
use crate::render::{self, ClientConfig, RenderContext};
use crate::services::intake::UploadArtifact;

pub const EDITOR_CLASS: &str = "sui-Editor";

const DEFAULT_COLS: u32 = 20;

#[derive(Debug, Clone)]
pub struct Editor {
    core: ComponentCore,
    text: String,
    rows: u32,
    cols: u32,
    max_length: Option<u32>,
    rich: bool,
}

impl Editor {
    #[must_use]
    pub fn new(id: ComponentId, text: impl Into<String>) -> Self {
        let mut core = ComponentCore::new(id, EDITOR_CLASS);
        core.add_sync_on(&[EventKind::Change]);
        Self { core, text: text.into(), rows: 1, cols: DEFAULT_COLS, max_length: None, rich: false }
    }

    #[must_use]
    pub fn rows(&self) -> u32 {
        self.rows
    }

    /// `1` renders a one-line input, anything larger a text area.
    pub fn set_rows(&mut self, rows: u32) {
        self.rows = rows.max(1);
    }

    #[must_use]
    pub fn cols(&self) -> u32 {
        self.cols
    }

    pub fn set_cols(&mut self, cols: u32) {
        self.cols = cols;
    }

    #[must_use]
    pub fn max_length(&self) -> Option<u32> {
        self.max_length
    }

    /// `None` removes the limit.
    pub fn set_max_length(&mut self, max_length: Option<u32>) {
        self.max_length = max_length;
    }

    #[must_use]
    pub fn is_rich(&self) -> bool {
        self.rich
    }

    /// Switch between a plain form control and rich-text editing.
    pub fn set_rich(&mut self, rich: bool) {
        self.rich = rich;
    }

    /// Subscribe to more event kinds.
    pub fn add_sync_on(&mut self, kinds: &[EventKind]) {
        self.core.add_sync_on(kinds);
    }

    fn write_max_length(&self, out: &mut dyn fmt::Write) -> fmt::Result {
        match self.max_length {
            Some(n) => write!(out, " maxlength=\"{n}\""),
            None => Ok(()),
        }
    }
}

impl Widget for Editor {
    fn core(&self) -> &ComponentCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ComponentCore {
        &mut self.core
    }

    fn kind(&self) -> WidgetKind {
        WidgetKind::Editor
    }

    fn apply(&mut self, update: Update) -> Result<Option<UploadArtifact>, Update> {
        match update {
            Update::Text(text) => {
                self.text = text;
                Ok(None)
            }
            other @ Update::Artifact(_) => Err(other),
        }
    }

    fn render(&self, out: &mut dyn fmt::Write, ctx: &RenderContext) -> fmt::Result {
        if self.rich {
            out.write_str("<div")?;
            render::write_attrs(out, &self.core)?;
            write!(out, ">{}</div>", render::escape_html(&self.text))?;
        } else if self.rows <= 1 {
            out.write_str("<input type=\"text\"")?;
            render::write_attrs(out, &self.core)?;
            write!(out, " value=\"{}\" size=\"{}\"", render::escape_attr(&self.text), self.cols)?;
            self.write_max_length(out)?;
            out.write_str(">")?;
        } else {
            out.write_str("<textarea")?;
            render::write_attrs(out, &self.core)?;
            write!(out, " rows=\"{}\" cols=\"{}\"", self.rows, self.cols)?;
            self.write_max_length(out)?;
            // Parsers drop one newline right after the start tag.
            write!(out, ">\n{}</textarea>", render::escape_html(&self.text))?;
        }

        let mut config = ClientConfig::new(&self.core, self.kind(), ctx);
        config.read_only = self.read_only();
        if self.rich {
            config.rich = true;
            config.value = Some(self.text.as_str());
        }
        render::write_config(out, &config)
    }

    fn as_text(&self) -> Option<&dyn HasText> {
        Some(self)
    }
}

impl HasText for Editor {
    fn text(&self) -> &str {
        &self.text
    }

    fn set_text(&mut self, text: String) {
        self.text = text;
    }
}

impl HasEnabled for Editor {}

impl HasReadOnly for Editor {}

#[cfg(test)]
#[path = "editor_test.rs"]
mod tests;
