//! Page routes — demo page, page re-render, and the static client script.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::http::header::{CACHE_CONTROL, CONTENT_TYPE};
use axum::response::{Html, IntoResponse, Redirect};
use serde_json::json;
use tracing::{error, info};
use uuid::Uuid;

use crate::component::{Editor, FileUpload, HasText, JsonEdit, Widget};
use crate::event::EventKind;
use crate::services::page::{self, Page};
use crate::state::AppState;

/// Static client script, served under a versioned path.
pub const CLIENT_SCRIPT: &str = include_str!("../../static/syncui-v1.js");

/// Build the demo page: editors with commit and keystroke sync, a text
/// area, a rich-text editor, a file upload, and a schema-bound editor.
#[must_use]
pub fn demo_page() -> Page {
    let page = Page::new("syncui demo");

    page.create(|id| Editor::new(id, "Edit me, then leave the field"));
    page.create(|id| {
        let mut e = Editor::new(id, "");
        e.add_sync_on(&[EventKind::KeyUp]);
        e.core_mut().set_attr("placeholder", "Synced on every key");
        e
    });
    page.create(|id| {
        let mut e = Editor::new(id, "");
        e.set_rows(4);
        e.set_cols(40);
        e.set_text("Multi-line text".into());
        e
    });
    page.create(|id| {
        let mut e = Editor::new(id, "<p>Rich <strong>text</strong></p>");
        e.set_rich(true);
        e
    });
    page.create(FileUpload::new);
    page.create(|id| {
        JsonEdit::new(
            id,
            json!({
                "title": "Person",
                "type": "object",
                "properties": {
                    "name": { "type": "string" },
                    "age": { "type": "integer", "minimum": 0 }
                }
            }),
        )
    });

    page
}

/// `GET /` — create a fresh demo page and redirect to it.
pub async fn new_page(State(state): State<AppState>) -> Redirect {
    let page = page::register(&state, demo_page()).await;
    info!(page_id = %page.id(), "page created");
    Redirect::to(&format!("/page/{}", page.id()))
}

/// `GET /page/{pid}` — render the current state of a live page.
pub async fn show_page(
    State(state): State<AppState>,
    Path(page_id): Path<Uuid>,
) -> Result<Html<String>, StatusCode> {
    let page = page::lookup(&state, page_id)
        .await
        .ok_or(StatusCode::NOT_FOUND)?;

    page.render_document().map(Html).map_err(|e| {
        error!(%page_id, error = %e, "page render failed");
        StatusCode::INTERNAL_SERVER_ERROR
    })
}

/// `GET /static/syncui-v1.js`
pub async fn client_script() -> impl IntoResponse {
    (
        [
            (CONTENT_TYPE, "text/javascript; charset=utf-8"),
            (CACHE_CONTROL, "public, max-age=31536000, immutable"),
        ],
        CLIENT_SCRIPT,
    )
}

#[cfg(test)]
#[path = "page_test.rs"]
mod tests;
