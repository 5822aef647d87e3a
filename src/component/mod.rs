//! Component identity and state.
//!
//! ARCHITECTURE
//! ============
//! A component is a server-held stateful unit backing one interactive UI
//! element. Every widget embeds a `ComponentCore` (id, attributes, style
//! classes, enabled flag, sync subscriptions) and exposes exactly the
//! capability traits it supports (`HasText`, `HasEnabled`, `HasReadOnly`).
//!
//! Ids come from a page-scoped `IdSequence`, never from a process-wide
//! counter, so two pages never interfere and tests stay deterministic.
//!
//! DESIGN
//! ======
//! The page stores widgets as `Arc<Mutex<dyn Widget>>`. All client-driven
//! mutation goes through `Widget::apply` under that mutex, which makes every
//! notification a single atomic state transition. Rendering takes the same
//! lock, so it always observes a whole pre- or post-mutation snapshot.
//! Read-only is an attribute consulted by the render layer only: `apply`
//! never checks it, so server-side callers can always update state.

pub mod editor;
pub mod json_edit;
pub mod upload;

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};

use crate::event::EventKind;
use crate::render::RenderContext;
use crate::services::intake::UploadArtifact;
use crate::subscription::{SyncKinds, SyncPolicy};

pub use editor::Editor;
pub use json_edit::JsonEdit;
pub use upload::FileUpload;

// =============================================================================
// IDENTITY
// =============================================================================

/// Page-unique component identifier. Never reused while the page lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ComponentId(u64);

impl ComponentId {
    #[must_use]
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ComponentId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.trim().parse()?))
    }
}

/// Monotonic id allocator owned by one page.
#[derive(Debug)]
pub struct IdSequence {
    next: AtomicU64,
}

impl IdSequence {
    /// Sequence whose first id is 1.
    #[must_use]
    pub fn new() -> Self {
        Self::starting_at(1)
    }

    #[must_use]
    pub fn starting_at(first: u64) -> Self {
        Self { next: AtomicU64::new(first) }
    }

    pub fn allocate(&self) -> ComponentId {
        ComponentId(self.next.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for IdSequence {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// CORE STATE
// =============================================================================

/// State shared by every widget kind.
#[derive(Debug, Clone)]
pub struct ComponentCore {
    id: ComponentId,
    /// Custom attributes in insertion order.
    attributes: Vec<(String, String)>,
    style_classes: BTreeSet<String>,
    enabled: bool,
    sync_kinds: SyncKinds,
}

impl ComponentCore {
    /// Fresh core: enabled, no sync subscriptions, one default style class.
    #[must_use]
    pub fn new(id: ComponentId, default_class: &str) -> Self {
        let mut style_classes = BTreeSet::new();
        style_classes.insert(default_class.to_string());
        Self { id, attributes: Vec::new(), style_classes, enabled: true, sync_kinds: SyncKinds::new() }
    }

    #[must_use]
    pub fn id(&self) -> ComponentId {
        self.id
    }

    #[must_use]
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Set an attribute, keeping its original position when it already exists.
    /// An empty value removes the attribute.
    pub fn set_attr(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        if value.is_empty() {
            self.attributes.retain(|(k, _)| *k != name);
            return;
        }
        match self.attributes.iter_mut().find(|(k, _)| *k == name) {
            Some(slot) => slot.1 = value,
            None => self.attributes.push((name, value)),
        }
    }

    pub fn attributes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn add_class(&mut self, class: impl Into<String>) {
        self.style_classes.insert(class.into());
    }

    pub fn remove_class(&mut self, class: &str) {
        self.style_classes.remove(class);
    }

    #[must_use]
    pub fn has_class(&self, class: &str) -> bool {
        self.style_classes.contains(class)
    }

    /// Style classes in sorted order.
    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.style_classes.iter().map(String::as_str)
    }

    #[must_use]
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    #[must_use]
    pub fn sync_kinds(&self) -> &SyncKinds {
        &self.sync_kinds
    }

    /// Subscribe to more event kinds. Keystroke-level sync is opt-in:
    /// `core.add_sync_on(&[EventKind::KeyUp])`.
    pub fn add_sync_on(&mut self, kinds: &[EventKind]) {
        self.sync_kinds.add(kinds);
    }

    pub fn remove_sync_on(&mut self, kinds: &[EventKind]) {
        self.sync_kinds.remove(kinds);
    }
}

// =============================================================================
// CAPABILITIES
// =============================================================================

/// Widget carrying a text value. Empty text is a valid value.
pub trait HasText {
    fn text(&self) -> &str;
    fn set_text(&mut self, text: String);
}

/// Widget that can be enabled or disabled. A disabled widget renders the
/// `disabled` attribute and carries `disabled` in its client config.
pub trait HasEnabled: Widget {
    fn enabled(&self) -> bool {
        self.core().enabled()
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.core_mut().set_enabled(enabled);
    }
}

/// Widget supporting a read-only flag, stored as the `readonly` attribute.
pub trait HasReadOnly: Widget {
    fn read_only(&self) -> bool {
        self.core().attr(READONLY_ATTR).is_some()
    }

    fn set_read_only(&mut self, read_only: bool) {
        let value = if read_only { READONLY_ATTR } else { "" };
        self.core_mut().set_attr(READONLY_ATTR, value);
    }
}

pub const READONLY_ATTR: &str = "readonly";

// =============================================================================
// WIDGET
// =============================================================================

/// Where a widget's incoming value comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueSource {
    /// A named form value (`cval`).
    Text,
    /// A single multipart file part (`cval`).
    File,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WidgetKind {
    Editor,
    FileUpload,
    JsonEdit,
}

impl WidgetKind {
    /// Name used in client configs.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Editor => "editor",
            Self::FileUpload => "upload",
            Self::JsonEdit => "jsonEdit",
        }
    }
}

/// A new value extracted from a notification.
#[derive(Debug)]
pub enum Update {
    Text(String),
    Artifact(UploadArtifact),
}

/// A server-held interactive element.
pub trait Widget: Send {
    fn core(&self) -> &ComponentCore;
    fn core_mut(&mut self) -> &mut ComponentCore;
    fn kind(&self) -> WidgetKind;

    fn sync_policy(&self) -> SyncPolicy {
        SyncPolicy::Subscribed
    }

    fn value_source(&self) -> ValueSource {
        ValueSource::Text
    }

    /// Apply an extracted value. On success returns the artifact the new
    /// value displaced, if any; the caller disposes of it.
    ///
    /// # Errors
    ///
    /// Returns the rejected `Update` unchanged when the widget does not
    /// accept that shape of value.
    fn apply(&mut self, update: Update) -> Result<Option<UploadArtifact>, Update>;

    /// Write markup plus client config for the current state. Pure: reads
    /// `self` only and performs no I/O beyond `out`.
    ///
    /// # Errors
    ///
    /// Propagates errors from the output sink.
    fn render(&self, out: &mut dyn fmt::Write, ctx: &RenderContext) -> fmt::Result;

    fn as_text(&self) -> Option<&dyn HasText> {
        None
    }
}

// =============================================================================
// HANDLES
// =============================================================================

/// Type-erased widget as stored by a page.
pub type SharedWidget = Arc<Mutex<dyn Widget>>;

/// Lock a widget, recovering the guard if a previous holder panicked.
pub fn lock<T: ?Sized>(widget: &Mutex<T>) -> MutexGuard<'_, T> {
    widget.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Typed handle returned when a widget is registered with a page. Updates
/// through the handle are server-originated and bypass read-only.
pub struct Handle<T> {
    id: ComponentId,
    inner: Arc<Mutex<T>>,
}

impl<T> Clone for Handle<T> {
    fn clone(&self) -> Self {
        Self { id: self.id, inner: Arc::clone(&self.inner) }
    }
}

impl<T: Widget + 'static> Handle<T> {
    pub(crate) fn new(widget: T) -> Self {
        let id = widget.core().id();
        Self { id, inner: Arc::new(Mutex::new(widget)) }
    }

    pub(crate) fn shared(&self) -> SharedWidget {
        self.inner.clone()
    }

    #[must_use]
    pub fn id(&self) -> ComponentId {
        self.id
    }

    pub fn read<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&lock(&self.inner))
    }

    pub fn update<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        f(&mut lock(&self.inner))
    }
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
