use bevy::prelude::*;
use constants::coordinate_system::{REF_LAT, REF_LON, SCALE};

use crate::engine::data::error::RecordError;

/// Map a geographic coordinate into projected scene space (Z-up).
///
/// Local planar approximation around the reference point. Non-finite input is a
/// programming error in debug builds; release builds clamp affected components to 0.
pub fn project(lon: f64, lat: f64, elevation: f32) -> Vec3 {
    debug_assert!(
        lon.is_finite() && lat.is_finite() && elevation.is_finite(),
        "non-finite projection input ({lon}, {lat}, {elevation})"
    );

    Vec3::new(
        finite_or_zero(((lon - REF_LON) * SCALE) as f32),
        finite_or_zero(((lat - REF_LAT) * SCALE) as f32),
        finite_or_zero(elevation),
    )
}

/// Checked projection used by every dataset-driven builder.
pub fn try_project(lon: f64, lat: f64, elevation: f32) -> Result<Vec3, RecordError> {
    if !lon.is_finite() || !lat.is_finite() {
        return Err(RecordError::NonFiniteCoordinate { lon, lat });
    }
    Ok(project(lon, lat, finite_or_zero(elevation)))
}

/// Squared distance on the projected ground plane; elevation is ignored.
pub fn planar_distance_squared(a: Vec3, b: Vec3) -> f32 {
    a.xy().distance_squared(b.xy())
}

fn finite_or_zero(value: f32) -> f32 {
    if value.is_finite() { value } else { 0.0 }
}
