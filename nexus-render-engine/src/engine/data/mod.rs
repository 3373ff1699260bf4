//! Input dataset contract and record validation.
//!
//! Records arrive as one JSON snapshot from the data-loading collaborator and are
//! never mutated afterwards. Every builder that consumes them validates each record
//! on its own and skips the ones it cannot render.

/// Dataset snapshot asset and lookup helpers.
pub mod datasets;

/// Record validation failures.
pub mod error;

/// Population, infrastructure and starved-set record types.
pub mod records;
