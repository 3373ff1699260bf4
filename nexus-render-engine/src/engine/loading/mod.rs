//! Asynchronous loading of the scene manifest and the dataset snapshot.
//!
//! The manifest names the dataset file and the initial analysis mode; the
//! snapshot is delivered to the store in one step once the asset server has it.

/// Manifest request, parsing and the follow-up dataset request.
pub mod manifest_loader;

/// Dataset load monitoring and hand-over to the scene store.
pub mod dataset_loader;

/// Loading progress tracking resource for state transitions.
pub mod progress;
