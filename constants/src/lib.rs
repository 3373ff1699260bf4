//! Shared compile-time configuration for the nexus render engine.

/// Fixed local planar projection parameters and per-layer elevations.
pub mod coordinate_system;

/// Resource category table: colours, pulse speeds and display names.
pub mod category;

/// Animation program constants shared by the Rust mirrors and the WGSL shaders.
pub mod procedural_shader;

/// Geometry sizes for cores, wells, streams and the connection thread.
pub mod render_settings;
