//! HTTP surface for the kanshi update tracker.

pub mod api;
pub mod state;
