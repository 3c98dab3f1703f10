//! High-level repository API and output rendering.
//!
//! This module provides the user-facing handle the CLI drives, its
//! configuration, and plain or coloured text rendering of results.

mod api;
mod render;

pub use api::{Revu, RevuConfig, RevuError, RevuResult};
pub use render::{render_commit_diff, render_log_entry, render_segments, Palette};
