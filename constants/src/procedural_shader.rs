use bevy::color::{LinearRgba, Srgba};

/// Pulse program: radial scale oscillates around this baseline.
pub const PULSE_SCALE_BASE: f32 = 0.85;
pub const PULSE_SCALE_AMPLITUDE: f32 = 0.15;

/// Pulse program: opacity oscillation.
pub const PULSE_OPACITY_BASE: f32 = 0.7;
pub const PULSE_OPACITY_AMPLITUDE: f32 = 0.3;

/// Secondary oscillation applied to starved cores, at twice the pulse rate.
pub const STARVED_FLICKER_BASE: f32 = 0.6;
pub const STARVED_FLICKER_AMPLITUDE: f32 = 0.4;

/// Glitch program hash coefficients.
pub const HASH_DOT: [f32; 2] = [12.9898, 78.233];
pub const HASH_SCALE: f32 = 43758.5453;

/// Hash values above this threshold light a full fracture highlight.
pub const GLITCH_FRACTURE_THRESHOLD: f32 = 0.95;

/// Glitch amplitude used while the housing analysis mode is active.
pub const HOUSING_GLITCH_INTENSITY: f32 = 0.3;

/// Radial well ring frequency in uv-distance units.
pub const WELL_RING_FREQUENCY: f32 = 20.0;

/// Normalised well radius in uv space (the disc's uv spans [0, 1]).
pub const WELL_UV_RADIUS: f32 = 0.5;

/// Connection thread global flicker speed.
pub const THREAD_FLICKER_SPEED: f32 = 8.0;

/// Rate at which the thread highlight and marker travel along the path.
pub const THREAD_TRAVEL_RATE: f32 = 0.1;

/// Baseline alpha of the thread outside the travelling highlight.
pub const THREAD_BASE_ALPHA: f32 = 0.2;

/// Connectivity thresholds for the stream colour bands.
pub const STREAM_GREEN_THRESHOLD: f32 = 0.7;
pub const STREAM_YELLOW_THRESHOLD: f32 = 0.5;

/// Connectivity assumed for roads that do not report one.
pub const DEFAULT_CONNECTIVITY: f32 = 0.5;

/// Core base colour (#44aaff) and its housing-mode replacement (#ff4444).
pub const CORE_COLOUR: Srgba = Srgba::new(0.266_666_67, 0.666_666_7, 1.0, 1.0);
pub const HOUSING_CORE_COLOUR: Srgba = Srgba::new(1.0, 0.266_666_67, 0.266_666_67, 1.0);

/// Base opacity multiplied by the pulse and flicker oscillations.
pub const CORE_OPACITY: f32 = 0.8;

/// Stream ribbon opacity; the band brightness is the road's connectivity.
pub const STREAM_OPACITY: f32 = 0.6;

/// Connection thread colour and the brighter marker travelling along it.
pub const THREAD_COLOUR: LinearRgba = LinearRgba::rgb(0.9, 0.2, 0.2);
pub const MARKER_COLOUR: LinearRgba = LinearRgba::rgb(1.0, 0.4, 0.4);

/// Opacity of the glow sphere and particles bundled with each well.
pub const WELL_GLOW_OPACITY: f32 = 0.8;
pub const WELL_PARTICLE_OPACITY: f32 = 0.6;
