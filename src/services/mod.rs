//! Domain services used by the HTTP routes.
//!
//! ARCHITECTURE
//! ============
//! Service modules own component state changes and file handling so route
//! handlers can stay focused on protocol translation.

pub mod intake;
pub mod page;
pub mod sync;
