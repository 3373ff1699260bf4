//! Paths and extensions of the runtime assets.

/// Asset locations relative to the asset root.
pub mod path;
