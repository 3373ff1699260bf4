use bevy::prelude::*;
use constants::category::{
    DEFAULT_TRANSIT_CAPACITY, FOOD_RADIUS_MULTIPLIER, HEALTH_WELL_RADIUS,
    TRANSIT_RADIUS_MULTIPLIER,
};
use constants::coordinate_system::WELL_ELEVATION;
use constants::render_settings::{WELL_PARTICLE_COUNT, WELL_PARTICLE_MAX_HEIGHT};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::f32::consts::TAU;

use crate::engine::data::error::RecordError;
use crate::engine::data::records::{
    InfrastructureRecords, ResourceCategory, ResourceMagnitude, ResourceNode, ResourceRef,
};
use crate::engine::projection::try_project;
use crate::engine::state::analysis_mode::AnalysisMode;

/// Everything needed to spawn one well.
#[derive(Debug, Clone, PartialEq)]
pub struct WellDescriptor {
    /// Stable label, e.g. `market-3`.
    pub id: String,
    pub reference: ResourceRef,
    pub position: Vec3,
    pub colour: LinearRgba,
    pub radius: f32,
    pub pulse_speed: f32,
    pub emitter: ParticleEmitter,
}

impl WellDescriptor {
    pub fn category(&self) -> ResourceCategory {
        self.reference.category
    }
}

/// Particle layout around a well, reproducible from its seed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParticleEmitter {
    pub seed: u64,
    pub count: usize,
    pub radius: f32,
}

impl ParticleEmitter {
    pub fn for_resource(reference: ResourceRef, radius: f32) -> Self {
        Self {
            seed: emitter_seed(reference),
            count: WELL_PARTICLE_COUNT,
            radius,
        }
    }

    /// Offsets relative to the well centre. Particle `i` sits at angle
    /// `i / count * 2pi`, a random distance inside the radius and a random
    /// height below the particle ceiling.
    pub fn particles(&self) -> Vec<Vec3> {
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        (0..self.count)
            .map(|i| {
                let angle = i as f32 / self.count as f32 * TAU;
                let distance = rng.gen_range(0.0..1.0) * self.radius;
                let height = rng.gen_range(0.0..WELL_PARTICLE_MAX_HEIGHT);
                Vec3::new(angle.cos() * distance, angle.sin() * distance, height)
            })
            .collect()
    }
}

fn emitter_seed(reference: ResourceRef) -> u64 {
    let category = match reference.category {
        ResourceCategory::Food => 0x51_u64,
        ResourceCategory::Health => 0xA7,
        ResourceCategory::Transit => 0xE3,
    };
    (category << 56) ^ (reference.index as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15)
}

/// Well radius from the category-specific magnitude field.
pub fn well_radius(magnitude: ResourceMagnitude) -> Result<f32, RecordError> {
    match magnitude {
        ResourceMagnitude::MarketRadius(radius) => {
            if !radius.is_finite() || radius < 0.0 {
                return Err(RecordError::InvalidMagnitude {
                    field: "radius",
                    value: radius,
                });
            }
            Ok(radius as f32 * FOOD_RADIUS_MULTIPLIER)
        }
        ResourceMagnitude::Fixed => Ok(HEALTH_WELL_RADIUS),
        ResourceMagnitude::Capacity(capacity) => {
            let capacity = match capacity {
                None => DEFAULT_TRANSIT_CAPACITY,
                Some(value) if value == 0.0 => DEFAULT_TRANSIT_CAPACITY,
                Some(value) if !value.is_finite() || value < 0.0 => {
                    return Err(RecordError::InvalidMagnitude {
                        field: "capacity",
                        value,
                    });
                }
                Some(value) => value,
            };
            Ok(capacity.sqrt() as f32 * TRANSIT_RADIUS_MULTIPLIER)
        }
    }
}

fn well_prefix(category: ResourceCategory) -> &'static str {
    match category {
        ResourceCategory::Food => "market",
        ResourceCategory::Health => "hospital",
        ResourceCategory::Transit => "transit",
    }
}

/// Build the descriptor for a single node.
pub fn well_descriptor(node: &ResourceNode) -> Result<WellDescriptor, RecordError> {
    let category = node.reference.category;
    let info = category.info();
    let radius = well_radius(node.magnitude)?;
    let position = try_project(node.lon, node.lat, WELL_ELEVATION)?;

    Ok(WellDescriptor {
        id: format!("{}-{}", well_prefix(category), node.reference.index),
        reference: node.reference,
        position,
        colour: info.colour,
        radius,
        pulse_speed: info.pulse_speed,
        emitter: ParticleEmitter::for_resource(node.reference, radius),
    })
}

/// Wells for every category the mode shows, collection by collection.
/// Invalid records are logged and skipped; inputs are never modified.
pub fn generate_wells(
    infrastructure: &InfrastructureRecords,
    mode: AnalysisMode,
) -> Vec<WellDescriptor> {
    let mut wells = Vec::new();

    for &category in mode.candidate_categories() {
        for node in infrastructure.nodes(category) {
            match well_descriptor(&node) {
                Ok(well) => wells.push(well),
                Err(error) => warn!(
                    "Skipping {} well {}: {}",
                    category.as_str(),
                    node.reference.index,
                    error
                ),
            }
        }
    }

    wells
}
