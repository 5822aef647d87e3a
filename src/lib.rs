//! Server-side UI components kept in sync with the browser.
//!
//! ARCHITECTURE
//! ============
//! Widgets live on the server inside a `Page`. Rendering turns their state
//! into markup plus a JSON client config; the static client script posts
//! notifications back, and `services::sync` applies them. Uploaded files go
//! through `services::intake` into a scoped temp directory.

pub mod component;
pub mod config;
pub mod event;
pub mod notification;
pub mod payload;
pub mod render;
pub mod routes;
pub mod services;
pub mod state;
pub mod subscription;
