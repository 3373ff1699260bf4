use bevy::prelude::*;
use bevy::render::mesh::PrimitiveTopology;
use bevy::render::render_asset::RenderAssetUsages;
use constants::procedural_shader::{WELL_GLOW_OPACITY, WELL_PARTICLE_OPACITY, WELL_UV_RADIUS};
use constants::render_settings::{WELL_DISC_SEGMENTS, WELL_GLOW_RATIO};

use super::generator::{WellDescriptor, generate_wells};
use crate::engine::animation::clock::{AnimationTarget, ClockRegistry};
use crate::engine::data::records::ResourceRef;
use crate::engine::shaders::materials::WellMaterial;
use crate::engine::state::scene_store::{SceneChange, SceneStore};

/// Root of one spawned well; children carry the disc, glow and particles.
#[derive(Component, Debug, Clone, Copy)]
pub struct ActiveWell {
    pub reference: ResourceRef,
    pub radius: f32,
}

/// Disc child animated by the radial well program.
#[derive(Component)]
pub struct WellDisc;

/// Replace every well when the dataset or the analysis mode changes.
pub fn rebuild_wells(
    mut commands: Commands,
    mut changes: EventReader<SceneChange>,
    store: Res<SceneStore>,
    existing: Query<Entity, With<ActiveWell>>,
    discs: Query<Entity, With<WellDisc>>,
    mut registry: ResMut<ClockRegistry>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut well_materials: ResMut<Assets<WellMaterial>>,
    mut standard_materials: ResMut<Assets<StandardMaterial>>,
) {
    let rebuild = changes.read().fold(false, |rebuild, change| {
        rebuild || matches!(change, SceneChange::Datasets | SceneChange::AnalysisMode)
    });
    if !rebuild {
        return;
    }

    for disc in &discs {
        registry.deregister(disc);
    }
    for entity in &existing {
        commands.entity(entity).despawn();
    }

    let Some(datasets) = store.datasets() else {
        return;
    };

    let wells = generate_wells(&datasets.infrastructure, store.analysis_mode());
    for well in &wells {
        spawn_well(
            &mut commands,
            well,
            &mut registry,
            &mut meshes,
            &mut well_materials,
            &mut standard_materials,
        );
    }

    info!(
        "Resource wells rebuilt for {} mode: {} wells",
        store.analysis_mode().as_str(),
        wells.len()
    );
}

fn spawn_well(
    commands: &mut Commands,
    well: &WellDescriptor,
    registry: &mut ClockRegistry,
    meshes: &mut Assets<Mesh>,
    well_materials: &mut Assets<WellMaterial>,
    standard_materials: &mut Assets<StandardMaterial>,
) {
    let disc_material =
        well_materials.add(WellMaterial::new(well.colour, well.pulse_speed, WELL_UV_RADIUS));
    let glow_material = standard_materials.add(additive_material(well.colour, WELL_GLOW_OPACITY));
    let particle_material =
        standard_materials.add(additive_material(well.colour, WELL_PARTICLE_OPACITY));

    let disc_mesh = meshes.add(Circle::new(well.radius).mesh().resolution(WELL_DISC_SEGMENTS));
    let glow_mesh = meshes.add(
        Sphere::new(well.radius * WELL_GLOW_RATIO)
            .mesh()
            .uv(16, 16),
    );
    let particle_mesh = meshes.add(particle_mesh(&well.emitter.particles()));

    let mut disc = None;
    commands
        .spawn((
            Transform::from_translation(well.position),
            Visibility::default(),
            ActiveWell {
                reference: well.reference,
                radius: well.radius,
            },
            Name::new(well.id.clone()),
        ))
        .with_children(|parent| {
            // Circle meshes lie in XY, which is already the ground plane.
            disc = Some(
                parent
                    .spawn((
                        Mesh3d(disc_mesh),
                        MeshMaterial3d(disc_material.clone()),
                        Transform::default(),
                        WellDisc,
                    ))
                    .id(),
            );
            parent.spawn((
                Mesh3d(glow_mesh),
                MeshMaterial3d(glow_material),
                Transform::default(),
            ));
            parent.spawn((
                Mesh3d(particle_mesh),
                MeshMaterial3d(particle_material),
                Transform::default(),
            ));
        });

    if let Some(disc) = disc {
        registry.register(disc, AnimationTarget::Well(disc_material));
    }
}

fn additive_material(colour: LinearRgba, opacity: f32) -> StandardMaterial {
    StandardMaterial {
        base_color: Color::LinearRgba(colour.with_alpha(opacity)),
        unlit: true,
        alpha_mode: AlphaMode::Add,
        ..default()
    }
}

fn particle_mesh(particles: &[Vec3]) -> Mesh {
    let positions: Vec<[f32; 3]> = particles.iter().map(|p| p.to_array()).collect();
    Mesh::new(PrimitiveTopology::PointList, RenderAssetUsages::default())
        .with_inserted_attribute(Mesh::ATTRIBUTE_POSITION, positions)
}
