//! File upload widget.
//!
//! Renders a file chooser plus an Upload button. The client script submits
//! the chosen file as a separate multipart request to the upload path and
//! reports progress into the status and progress containers. The widget
//! always accepts a new artifact, whatever it is subscribed to.

use std::fmt;

use crate::component::{ComponentCore, ComponentId, HasEnabled, Update, ValueSource, Widget, WidgetKind};
use crate::event::EventKind;
use crate::render::{self, ClientConfig, RenderContext};
use crate::services::intake::UploadArtifact;
use crate::subscription::SyncPolicy;

pub const UPLOAD_CLASS: &str = "sui-FileUpload";

#[derive(Debug, Clone)]
pub struct FileUpload {
    core: ComponentCore,
    artifact: Option<UploadArtifact>,
}

impl FileUpload {
    #[must_use]
    pub fn new(id: ComponentId) -> Self {
        let mut core = ComponentCore::new(id, UPLOAD_CLASS);
        core.add_sync_on(&[EventKind::Change]);
        Self { core, artifact: None }
    }

    /// Most recent upload, if one arrived and was not taken yet.
    #[must_use]
    pub fn artifact(&self) -> Option<&UploadArtifact> {
        self.artifact.as_ref()
    }

    /// Hand the artifact to a consumer, which then owns the stored file.
    pub fn take_artifact(&mut self) -> Option<UploadArtifact> {
        self.artifact.take()
    }
}

impl Widget for FileUpload {
    fn core(&self) -> &ComponentCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ComponentCore {
        &mut self.core
    }

    fn kind(&self) -> WidgetKind {
        WidgetKind::FileUpload
    }

    fn sync_policy(&self) -> SyncPolicy {
        SyncPolicy::Always
    }

    fn value_source(&self) -> ValueSource {
        ValueSource::File
    }

    /// A newer upload replaces the held one and hands the old artifact back.
    fn apply(&mut self, update: Update) -> Result<Option<UploadArtifact>, Update> {
        match update {
            Update::Artifact(artifact) => Ok(self.artifact.replace(artifact)),
            other @ Update::Text(_) => Err(other),
        }
    }

    fn render(&self, out: &mut dyn fmt::Write, ctx: &RenderContext) -> fmt::Result {
        let id = self.core.id();
        let disabled = if self.core.enabled() { "" } else { " disabled=\"disabled\"" };

        out.write_str("<input type=\"file\"")?;
        render::write_attrs(out, &self.core)?;
        out.write_str(">")?;
        write!(out, "<button type=\"button\" id=\"upload-button-{id}\"{disabled}>Upload</button>")?;
        write!(out, "<div id=\"upload-status-{id}\"></div>")?;
        write!(out, "<div id=\"progress-{id}\"></div>")?;

        render::write_config(out, &ClientConfig::new(&self.core, self.kind(), ctx))
    }
}

impl HasEnabled for FileUpload {}

#[cfg(test)]
#[path = "upload_test.rs"]
mod tests;
