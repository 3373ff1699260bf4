//! Resource wells: one glowing disc per visible market, hospital or transit hub.

/// Pure well descriptors and deterministic particle layouts.
pub mod generator;

/// Entities for the current descriptors, rebuilt on mode or dataset change.
pub mod spawn;
