/// Core visual size bounds applied after `sqrt(density / 10000) * 0.8`.
pub const MIN_CORE_SIZE: f32 = 0.5;
pub const MAX_CORE_SIZE: f32 = 3.0;

/// Density divisor and multiplier of the core size formula.
pub const CORE_DENSITY_DIVISOR: f64 = 10_000.0;
pub const CORE_SIZE_FACTOR: f32 = 0.8;

/// Instance scale applied to the unit sphere per unit of core size.
pub const CORE_RADIUS_PER_SIZE: f32 = 100.0;

/// Height of the connection arc control point above the higher endpoint.
pub const ARC_ELEVATION_OFFSET: f32 = 200.0;

/// Number of divisions sampled along the connection arc.
pub const ARC_SAMPLE_DIVISIONS: usize = 100;

/// Connection tube extrusion.
pub const THREAD_TUBULAR_SEGMENTS: usize = 100;
pub const THREAD_RADIUS: f32 = 2.0;
pub const THREAD_RADIAL_SEGMENTS: usize = 8;

/// Radius of the marker that travels along the connection.
pub const MARKER_RADIUS: f32 = 5.0;

/// Particles bundled with every resource well.
pub const WELL_PARTICLE_COUNT: usize = 50;
pub const WELL_PARTICLE_MAX_HEIGHT: f32 = 100.0;

/// Glow sphere radius relative to the well radius.
pub const WELL_GLOW_RATIO: f32 = 0.3;

/// Circle tessellation for well discs.
pub const WELL_DISC_SEGMENTS: u32 = 64;
