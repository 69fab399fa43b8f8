//! Headless testing framework: Pilot, snapshot helpers.
//!
//! Use the [`Pilot`] to drive the site (navigate, click, go back) without a
//! browser. Use [`render_to_string`] and [`tag_lines`] to capture component
//! markup for snapshot-style assertions.

pub mod pilot;
pub mod snapshot;

pub use pilot::{Pilot, PilotError};
pub use snapshot::{render_in, render_to_string, tag_lines};
