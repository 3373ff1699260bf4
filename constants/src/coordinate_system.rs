/// Reference longitude of the deployment city (Dhaka).
pub const REF_LON: f64 = 90.4;

/// Reference latitude of the deployment city (Dhaka).
pub const REF_LAT: f64 = 23.8;

/// Linear scale from degrees to projected scene units.
pub const SCALE: f64 = 100_000.0;

/// Projected units per reported kilometre.
pub const UNITS_PER_KILOMETRE: f32 = 1000.0;

/// Elevation multiplier applied to a core's visual size.
pub const CORE_ELEVATION_PER_SIZE: f32 = 500.0;

/// Resource wells sit just above the ground plane.
pub const WELL_ELEVATION: f32 = 5.0;

/// Infrastructure streams float above the wells.
pub const STREAM_ELEVATION: f32 = 10.0;

/// Elevation of the connection thread endpoint at the matched resource.
pub const CONNECTION_TARGET_ELEVATION: f32 = 10.0;
