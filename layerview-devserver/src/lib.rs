//! Demo backend and terminal watcher for layerview.
//!
//! The [`api`] module serves a fleet over the same HTTP endpoints the sync
//! layer consumes, including the live event stream, so the whole pipeline
//! can run without a cluster. [`render`] turns a published view into the
//! text the `layerview watch` command prints.

pub mod api;
pub mod fixtures;
pub mod render;

pub use api::{build_router, Fleet};
pub use render::render_summary;
