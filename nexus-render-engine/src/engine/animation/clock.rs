use bevy::prelude::*;
use std::collections::HashMap;

use crate::engine::batching::core_render::CoreShaderParams;
use crate::engine::connection::thread::TravellingMarker;
use crate::engine::shaders::materials::{
    AnimatedMaterial, StreamMaterial, ThreadMaterial, WellMaterial,
};
use crate::engine::shaders::programs::sanitize_uniform;

/// Shared elapsed time every animation program is evaluated against.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq)]
pub struct SceneClock {
    elapsed: f32,
}

impl SceneClock {
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn set_elapsed(&mut self, elapsed: f32) {
        self.elapsed = sanitize_uniform(elapsed);
    }
}

/// What the clock has to update for a registered entity.
#[derive(Debug, Clone, PartialEq)]
pub enum AnimationTarget {
    Cores,
    Well(Handle<WellMaterial>),
    Stream(Handle<StreamMaterial>),
    Thread(Handle<ThreadMaterial>),
    Marker,
}

/// Animated primitives register on spawn and deregister on despawn, so the
/// per-frame cost follows what is on screen rather than the dataset size.
#[derive(Resource, Debug, Default)]
pub struct ClockRegistry {
    targets: HashMap<Entity, AnimationTarget>,
}

impl ClockRegistry {
    pub fn register(&mut self, entity: Entity, target: AnimationTarget) {
        self.targets.insert(entity, target);
    }

    pub fn deregister(&mut self, entity: Entity) -> Option<AnimationTarget> {
        self.targets.remove(&entity)
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    pub fn contains(&self, entity: Entity) -> bool {
        self.targets.contains_key(&entity)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Entity, &AnimationTarget)> {
        self.targets.iter()
    }
}

pub fn tick_scene_clock(time: Res<Time>, mut clock: ResMut<SceneClock>) {
    clock.set_elapsed(time.elapsed_secs());
}

/// Write the shared elapsed time into a registered material.
pub fn apply_time<M: AnimatedMaterial>(assets: &mut Assets<M>, handle: &Handle<M>, elapsed: f32) {
    if let Some(material) = assets.get_mut(handle) {
        material.set_time(elapsed);
    }
}

/// Single per-frame dispatcher over the registry.
pub fn drive_scene_clock(
    clock: Res<SceneClock>,
    registry: Res<ClockRegistry>,
    mut wells: ResMut<Assets<WellMaterial>>,
    mut streams: ResMut<Assets<StreamMaterial>>,
    mut threads: ResMut<Assets<ThreadMaterial>>,
    mut core_params: ResMut<CoreShaderParams>,
    mut markers: Query<(&TravellingMarker, &mut Transform)>,
) {
    let elapsed = clock.elapsed();

    for (entity, target) in registry.iter() {
        match target {
            AnimationTarget::Cores => core_params.set_time(elapsed),
            AnimationTarget::Well(handle) => apply_time(&mut wells, handle, elapsed),
            AnimationTarget::Stream(handle) => apply_time(&mut streams, handle, elapsed),
            AnimationTarget::Thread(handle) => apply_time(&mut threads, handle, elapsed),
            AnimationTarget::Marker => {
                if let Ok((marker, mut transform)) = markers.get_mut(*entity) {
                    transform.translation = marker.position_at(elapsed);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::ecs::world::World;

    #[test]
    fn registry_tracks_spawn_and_despawn() {
        let mut world = World::new();
        let a = world.spawn_empty().id();
        let b = world.spawn_empty().id();

        let mut registry = ClockRegistry::default();
        registry.register(a, AnimationTarget::Cores);
        registry.register(b, AnimationTarget::Marker);
        assert_eq!(registry.len(), 2);

        assert_eq!(registry.deregister(a), Some(AnimationTarget::Cores));
        assert!(!registry.contains(a));
        assert!(registry.contains(b));
        assert_eq!(registry.deregister(a), None);
    }

    #[test]
    fn clock_rejects_non_finite_time() {
        let mut clock = SceneClock::default();
        clock.set_elapsed(12.5);
        assert_eq!(clock.elapsed(), 12.5);
        clock.set_elapsed(f32::NAN);
        assert_eq!(clock.elapsed(), 0.0);
    }

    #[test]
    fn apply_time_updates_the_material_uniform() {
        let mut assets = Assets::<WellMaterial>::default();
        let handle = assets.add(WellMaterial::new(LinearRgba::WHITE, 1.5, 0.5));

        apply_time(&mut assets, &handle, 3.25);
        assert_eq!(assets.get(&handle).map(|m| m.uniforms.time), Some(3.25));
    }
}
