//! JSON assets describing what the scene loads.

/// Runtime manifest: dataset location and initial analysis mode.
pub mod nexus_manifest;
