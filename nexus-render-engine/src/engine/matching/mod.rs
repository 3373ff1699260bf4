//! Nearest-resource matching for the selected starved core.

/// Linear nearest-neighbour scan and the system publishing its result.
pub mod nearest;
