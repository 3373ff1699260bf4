//! Connection path builder.
//!
//! Turns the active connection into a raised arc, a smoothed tube carrying a
//! per-vertex path progress attribute, and a marker looping along the arc.

/// Arc, Catmull-Rom resampling and tube extrusion.
pub mod path;

/// Thread and marker entities rebuilt on connection change.
pub mod thread;
