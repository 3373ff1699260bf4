use bevy::prelude::*;
use bytemuck::{Pod, Zeroable};
use constants::coordinate_system::CORE_ELEVATION_PER_SIZE;
use constants::render_settings::{
    CORE_DENSITY_DIVISOR, CORE_RADIUS_PER_SIZE, CORE_SIZE_FACTOR, MAX_CORE_SIZE, MIN_CORE_SIZE,
};
use std::collections::HashSet;

use crate::engine::data::error::RecordError;
use crate::engine::data::records::{PopulationId, PopulationRecord};
use crate::engine::projection::try_project;

/// GPU instance layout of one population core. Two `Float32x4` attributes.
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct CoreInstance {
    pub position: [f32; 3], // Projected position, z hovers with size
    pub scale: f32,         // Uniform instance scale
    pub pulse_rate: f32,
    pub starved: f32,       // 1.0 when starved
    pub size: f32,          // Visual size before scaling
    pub _padding: f32,
}

impl CoreInstance {
    pub fn is_starved(&self) -> bool {
        self.starved > 0.5
    }

    pub fn translation(&self) -> Vec3 {
        Vec3::from_array(self.position)
    }
}

/// One batch descriptor for all cores, in input order. `ids[i]` belongs to `instances[i]`.
#[derive(Resource, Debug, Clone, Default, PartialEq)]
pub struct CoreBatch {
    pub instances: Vec<CoreInstance>,
    pub ids: Vec<PopulationId>,
}

impl CoreBatch {
    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&PopulationId, &CoreInstance)> {
        self.ids.iter().zip(self.instances.iter())
    }
}

/// `sqrt(density / 10000) * 0.8`, clamped to the visible size range.
pub fn core_size(density: f64) -> f32 {
    let size = (density / CORE_DENSITY_DIVISOR).sqrt() as f32 * CORE_SIZE_FACTOR;
    size.clamp(MIN_CORE_SIZE, MAX_CORE_SIZE)
}

pub fn pulse_rate(growth_rate: f64) -> f32 {
    let rate = 1.0 + growth_rate as f32 * 2.0;
    if rate.is_finite() { rate } else { 1.0 }
}

/// Build the instance for a single record.
pub fn core_instance(record: &PopulationRecord, starved: bool) -> Result<CoreInstance, RecordError> {
    if !record.density.is_finite() || record.density < 0.0 {
        return Err(RecordError::InvalidDensity(record.density));
    }

    let size = core_size(record.density);
    let position = try_project(record.lon, record.lat, size * CORE_ELEVATION_PER_SIZE)?;

    Ok(CoreInstance {
        position: position.to_array(),
        scale: size * CORE_RADIUS_PER_SIZE,
        pulse_rate: pulse_rate(record.growth_rate),
        starved: if starved { 1.0 } else { 0.0 },
        size,
        _padding: 0.0,
    })
}

/// Pure function of (records, starved set). Invalid records are skipped and logged.
pub fn build_core_batch(
    records: &[PopulationRecord],
    starved: &HashSet<PopulationId>,
) -> CoreBatch {
    let mut batch = CoreBatch {
        instances: Vec::with_capacity(records.len()),
        ids: Vec::with_capacity(records.len()),
    };

    for record in records {
        match core_instance(record, starved.contains(&record.id)) {
            Ok(instance) => {
                batch.instances.push(instance);
                batch.ids.push(record.id.clone());
            }
            Err(error) => warn!("Skipping population record {}: {}", record.id, error),
        }
    }

    batch
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, lon: f64, lat: f64, density: f64) -> PopulationRecord {
        PopulationRecord {
            id: PopulationId::new(id),
            lon,
            lat,
            density,
            growth_rate: 0.05,
            ward: String::new(),
            area: String::new(),
        }
    }

    #[test]
    fn instance_layout_is_two_vec4s() {
        assert_eq!(std::mem::size_of::<CoreInstance>(), 32);
    }

    #[test]
    fn size_follows_density_and_is_clamped() {
        assert!((core_size(10_000.0) - 0.8).abs() < 1e-6);
        assert!((core_size(40_000.0) - 1.6).abs() < 1e-6);
        assert_eq!(core_size(0.0), MIN_CORE_SIZE);
        assert_eq!(core_size(10_000_000.0), MAX_CORE_SIZE);
    }

    #[test]
    fn instances_keep_input_order_and_flags() {
        let records = vec![
            record("a", 90.40, 23.80, 40_000.0),
            record("b", 90.41, 23.81, 10_000.0),
        ];
        let starved = HashSet::from([PopulationId::new("b")]);
        let batch = build_core_batch(&records, &starved);

        assert_eq!(batch.ids, vec![PopulationId::new("a"), PopulationId::new("b")]);
        assert!(!batch.instances[0].is_starved());
        assert!(batch.instances[1].is_starved());

        let a = batch.instances[0];
        assert!((a.position[2] - 1.6 * 500.0).abs() < 1e-3);
        assert!((a.scale - 160.0).abs() < 1e-3);
        assert!((a.pulse_rate - 1.1).abs() < 1e-6);
    }

    #[test]
    fn rebuild_is_bit_identical() {
        let records: Vec<_> = (0..50)
            .map(|i| record(&format!("p{i}"), 90.35 + i as f64 * 0.003, 23.75, 5_000.0 * i as f64))
            .collect();
        let starved = HashSet::from([PopulationId::new("p3"), PopulationId::new("p17")]);

        let first = build_core_batch(&records, &starved);
        let second = build_core_batch(&records, &starved);
        assert_eq!(
            bytemuck::cast_slice::<CoreInstance, u8>(&first.instances),
            bytemuck::cast_slice::<CoreInstance, u8>(&second.instances)
        );
    }

    #[test]
    fn invalid_records_are_skipped() {
        let records = vec![
            record("nan", f64::NAN, 23.8, 1_000.0),
            record("negative", 90.4, 23.8, -5.0),
            record("ok", 90.4, 23.8, 1_000.0),
        ];
        let batch = build_core_batch(&records, &HashSet::new());
        assert_eq!(batch.ids, vec![PopulationId::new("ok")]);
        assert!(batch.instances.iter().all(|i| i.position.iter().all(|c| c.is_finite())));
    }
}
