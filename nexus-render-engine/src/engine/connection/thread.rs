use bevy::prelude::*;
use constants::procedural_shader::{
    MARKER_COLOUR, THREAD_BASE_ALPHA, THREAD_COLOUR, THREAD_FLICKER_SPEED, THREAD_TRAVEL_RATE,
};
use constants::render_settings::MARKER_RADIUS;

use super::path::{QuadraticArc, build_connection_path};
use crate::engine::animation::clock::{AnimationTarget, ClockRegistry, SceneClock};
use crate::engine::shaders::materials::ThreadMaterial;
use crate::engine::shaders::programs::marker_parameter;
use crate::engine::state::scene_store::{SceneChange, SceneStore};

/// Tube mesh of the active connection.
#[derive(Component)]
pub struct ConnectionThread;

/// Sphere looping along the connection arc.
#[derive(Component, Debug, Clone, Copy)]
pub struct TravellingMarker {
    pub arc: QuadraticArc,
}

impl TravellingMarker {
    pub fn position_at(&self, elapsed: f32) -> Vec3 {
        self.arc.point_at(marker_parameter(elapsed))
    }
}

/// Replace the thread and marker whenever the store's connection changes.
/// No connection leaves nothing spawned.
pub fn rebuild_connection_thread(
    mut commands: Commands,
    mut changes: EventReader<SceneChange>,
    store: Res<SceneStore>,
    clock: Res<SceneClock>,
    existing: Query<Entity, Or<(With<ConnectionThread>, With<TravellingMarker>)>>,
    mut registry: ResMut<ClockRegistry>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut thread_materials: ResMut<Assets<ThreadMaterial>>,
    mut standard_materials: ResMut<Assets<StandardMaterial>>,
) {
    let connection_changed = changes
        .read()
        .fold(false, |changed, change| changed || *change == SceneChange::Connection);
    if !connection_changed {
        return;
    }

    for entity in &existing {
        registry.deregister(entity);
        commands.entity(entity).despawn();
    }

    let Some(connection) = store.connection() else {
        return;
    };

    let path = build_connection_path(connection);
    let vertex_count = path.tube.vertex_count();
    let material = thread_materials.add(ThreadMaterial::new(
        THREAD_COLOUR,
        THREAD_FLICKER_SPEED,
        THREAD_TRAVEL_RATE,
        THREAD_BASE_ALPHA,
    ));

    let thread = commands
        .spawn((
            Mesh3d(meshes.add(path.tube.into_mesh())),
            MeshMaterial3d(material.clone()),
            Transform::default(),
            ConnectionThread,
        ))
        .id();
    registry.register(thread, AnimationTarget::Thread(material));

    let marker = TravellingMarker { arc: path.arc };
    let marker_entity = commands
        .spawn((
            Mesh3d(meshes.add(Sphere::new(MARKER_RADIUS).mesh().uv(16, 16))),
            MeshMaterial3d(standard_materials.add(StandardMaterial {
                base_color: Color::LinearRgba(MARKER_COLOUR),
                unlit: true,
                alpha_mode: AlphaMode::Add,
                ..default()
            })),
            Transform::from_translation(marker.position_at(clock.elapsed())),
            marker,
        ))
        .id();
    registry.register(marker_entity, AnimationTarget::Marker);

    info!(
        "Connection thread built: {} -> {:?} ({:.2} km, {} vertices)",
        connection.source,
        connection.resource.category,
        connection.distance_km,
        vertex_count
    );
}
