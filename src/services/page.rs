//! Page service — component container, page registry, and idle reaper.
//!
//! ARCHITECTURE
//! ============
//! A `Page` is the server-side session behind one rendered document. It
//! allocates component ids from its own `IdSequence`, stores each component
//! behind its own mutex, and remembers which component last held focus.
//! Live pages are registered on `AppState` keyed by a random UUID which the
//! client echoes back as `pid` on every notification.
//!
//! LOCKING
//! =======
//! - The component map lock is held only to insert, remove, or clone an
//!   `Arc` out of the map. It is never held while a component is locked.
//! - Component locks are `std::sync::Mutex` and are never held across an
//!   `.await`.
//! - The registry lock (`tokio::sync::RwLock`) is held only to find, insert,
//!   or evict pages.
//!
//! LIFECYCLE
//! =========
//! Pages are discarded explicitly or by the reaper once idle for longer
//! than the configured window. Discarding a page drops its components;
//! artifacts they still hold keep their files on disk.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::time::{Duration, Instant};

use tokio::task::JoinHandle;
use tracing::info;
use uuid::Uuid;

use crate::component::{self, ComponentId, Handle, IdSequence, SharedWidget, Widget};
use crate::event::EventKind;
use crate::render::{self, RenderContext};
use crate::state::AppState;

// =============================================================================
// PAGE
// =============================================================================

pub struct Page {
    id: Uuid,
    title: String,
    ids: IdSequence,
    components: RwLock<HashMap<ComponentId, SharedWidget>>,
    focused: Mutex<Option<ComponentId>>,
    last_seen: Mutex<Instant>,
}

impl Page {
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            ids: IdSequence::new(),
            components: RwLock::new(HashMap::new()),
            focused: Mutex::new(None),
            last_seen: Mutex::new(Instant::now()),
        }
    }

    #[must_use]
    pub fn id(&self) -> Uuid {
        self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Allocate an id, build the widget with it, and register the result.
    /// The builder must construct the widget with the id it is given.
    pub fn create<W, F>(&self, build: F) -> Handle<W>
    where
        W: Widget + 'static,
        F: FnOnce(ComponentId) -> W,
    {
        let id = self.ids.allocate();
        let handle = Handle::new(build(id));
        debug_assert_eq!(handle.id(), id, "widget built with a foreign id");

        self.components
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, handle.shared());
        handle
    }

    /// O(1) lookup by id.
    #[must_use]
    pub fn get(&self, id: ComponentId) -> Option<SharedWidget> {
        self.components
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&id)
            .cloned()
    }

    /// Discard a component. Its id is never handed out again.
    pub fn remove(&self, id: ComponentId) -> bool {
        let removed = self
            .components
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&id)
            .is_some();

        if removed {
            let mut focused = self.focused.lock().unwrap_or_else(PoisonError::into_inner);
            if *focused == Some(id) {
                *focused = None;
            }
        }
        removed
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.components
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether `id` names a live component subscribed to `kind`.
    #[must_use]
    pub fn is_subscribed(&self, id: ComponentId, kind: EventKind) -> bool {
        self.get(id)
            .is_some_and(|widget| component::lock(&widget).core().sync_kinds().contains(kind))
    }

    #[must_use]
    pub fn focused(&self) -> Option<ComponentId> {
        *self.focused.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Record the focused component. Ids of unknown components are ignored.
    pub fn set_focused(&self, id: ComponentId) {
        if self.get(id).is_some() {
            *self.focused.lock().unwrap_or_else(PoisonError::into_inner) = Some(id);
        }
    }

    pub fn touch(&self) {
        *self.last_seen.lock().unwrap_or_else(PoisonError::into_inner) = Instant::now();
    }

    #[must_use]
    pub fn idle_for(&self) -> Duration {
        self.last_seen
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .elapsed()
    }

    // -------------------------------------------------------------------------
    // Rendering
    // -------------------------------------------------------------------------

    #[must_use]
    pub fn render_context(&self) -> RenderContext {
        RenderContext::new(self.id)
    }

    /// Render one component. Returns `Ok(false)` when the id is unknown.
    ///
    /// # Errors
    ///
    /// Propagates sink errors.
    pub fn render(&self, id: ComponentId, out: &mut dyn fmt::Write) -> Result<bool, fmt::Error> {
        let Some(widget) = self.get(id) else {
            return Ok(false);
        };
        component::lock(&widget).render(out, &self.render_context())?;
        Ok(true)
    }

    /// Render every component in creation order.
    ///
    /// # Errors
    ///
    /// Propagates sink errors.
    pub fn render_all(&self, out: &mut dyn fmt::Write) -> fmt::Result {
        let mut widgets: Vec<(ComponentId, SharedWidget)> = self
            .components
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(id, w)| (*id, Arc::clone(w)))
            .collect();
        widgets.sort_by_key(|(id, _)| *id);

        let ctx = self.render_context();
        for (_, widget) in widgets {
            out.write_str("<div class=\"sui-row\">")?;
            component::lock(&widget).render(out, &ctx)?;
            out.write_str("</div>")?;
        }
        Ok(())
    }

    /// Full HTML document for this page.
    ///
    /// # Errors
    ///
    /// Returns `fmt::Error` if a component fails to render.
    pub fn render_document(&self) -> Result<String, fmt::Error> {
        let mut body = String::new();
        self.render_all(&mut body)?;
        Ok(render::document(&self.title, &body))
    }
}

impl fmt::Debug for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Page")
            .field("id", &self.id)
            .field("title", &self.title)
            .field("components", &self.len())
            .finish_non_exhaustive()
    }
}

// =============================================================================
// REGISTRY
// =============================================================================

/// Register a page so notifications can reach it.
pub async fn register(state: &AppState, page: Page) -> Arc<Page> {
    let page = Arc::new(page);
    state.pages.write().await.insert(page.id(), Arc::clone(&page));
    page
}

/// Find a live page and mark it as recently used.
pub async fn lookup(state: &AppState, page_id: Uuid) -> Option<Arc<Page>> {
    let page = state.pages.read().await.get(&page_id).cloned()?;
    page.touch();
    Some(page)
}

/// Discard a page and all of its components.
pub async fn discard(state: &AppState, page_id: Uuid) -> bool {
    state.pages.write().await.remove(&page_id).is_some()
}

/// Discard every page idle for longer than `max_idle`. Returns the count.
pub async fn reap_idle(state: &AppState, max_idle: Duration) -> usize {
    let mut pages = state.pages.write().await;
    let before = pages.len();
    pages.retain(|_, page| page.idle_for() <= max_idle);
    before - pages.len()
}

/// Spawn the background idle-page reaper. Returns a handle for shutdown.
pub fn spawn_page_reaper(state: AppState) -> JoinHandle<()> {
    let max_idle = state.config.page_idle;
    let period = (max_idle / 4).max(Duration::from_secs(1));
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        loop {
            interval.tick().await;
            let reaped = reap_idle(&state, max_idle).await;
            if reaped > 0 {
                info!(reaped, "page reaper discarded idle pages");
            }
        }
    })
}

#[cfg(test)]
#[path = "page_test.rs"]
mod tests;
