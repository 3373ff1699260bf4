//! Population cores as a single instanced draw.
//!
//! `core_batch` turns population records into one Pod instance per accepted
//! record, `core_render` uploads them and draws a shared sphere per instance.

/// Record to instance transform and the batch resource.
pub mod core_batch;

/// Instanced pipeline, shared uniforms and the systems keeping them current.
pub mod core_render;
