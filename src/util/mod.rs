//! Shared utilities.
//!
//! Helpers for frame timing, yaw arithmetic and easing curves.

pub mod angle;
pub mod easing;
pub mod frame_timing;
