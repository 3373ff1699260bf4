/// Shared scene clock and the registry of animated primitives it drives.
pub mod clock;
