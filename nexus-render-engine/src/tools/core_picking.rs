use bevy::prelude::*;
use bevy::window::PrimaryWindow;

use crate::engine::batching::core_batch::CoreBatch;
use crate::engine::data::records::PopulationId;
use crate::engine::state::scene_store::{HoverTarget, SceneAction, SceneStore};
use crate::engine::wells::spawn::ActiveWell;

/// Nearest positive hit distance of a ray against a sphere.
pub fn ray_sphere_distance(ray: Ray3d, centre: Vec3, radius: f32) -> Option<f32> {
    let direction = *ray.direction;
    let offset = ray.origin - centre;
    let b = offset.dot(direction);
    let c = offset.length_squared() - radius * radius;
    let discriminant = b * b - c;
    if discriminant < 0.0 {
        return None;
    }

    let root = discriminant.sqrt();
    [-b - root, -b + root].into_iter().find(|t| *t >= 0.0)
}

/// Hit distance of a ray against a horizontal disc.
pub fn ray_disc_distance(ray: Ray3d, centre: Vec3, radius: f32) -> Option<f32> {
    let distance = ray.intersect_plane(centre, InfinitePlane3d::new(Vec3::Z))?;
    let hit = ray.get_point(distance);
    (hit.distance_squared(centre) <= radius * radius).then_some(distance)
}

/// Closest core under the ray. Instances are unit spheres scaled by `scale`.
pub fn pick_core(ray: Ray3d, batch: &CoreBatch) -> Option<(PopulationId, f32)> {
    batch
        .iter()
        .filter_map(|(id, instance)| {
            ray_sphere_distance(ray, instance.translation(), instance.scale)
                .map(|distance| (id, distance))
        })
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(id, distance)| (id.clone(), distance))
}

/// Closest target under the ray; cores win ties with wells.
pub fn pick_target(
    ray: Ray3d,
    batch: &CoreBatch,
    wells: impl IntoIterator<Item = (ActiveWell, Vec3)>,
) -> Option<HoverTarget> {
    let core = pick_core(ray, batch);
    let well = wells
        .into_iter()
        .filter_map(|(well, centre)| {
            ray_disc_distance(ray, centre, well.radius).map(|distance| (well.reference, distance))
        })
        .min_by(|a, b| a.1.total_cmp(&b.1));

    match (core, well) {
        (Some((id, core_distance)), Some((_, well_distance))) if core_distance <= well_distance => {
            Some(HoverTarget::Core(id))
        }
        (_, Some((reference, _))) => Some(HoverTarget::Well(reference)),
        (Some((id, _)), None) => Some(HoverTarget::Core(id)),
        (None, None) => None,
    }
}

/// Hover tracking and click selection from the cursor ray.
pub fn core_picking_system(
    windows: Query<&Window, With<PrimaryWindow>>,
    cameras: Query<(&GlobalTransform, &Camera), With<Camera3d>>,
    mouse_button: Res<ButtonInput<MouseButton>>,
    batch: Res<CoreBatch>,
    wells: Query<(&ActiveWell, &GlobalTransform)>,
    store: Res<SceneStore>,
    mut actions: EventWriter<SceneAction>,
) {
    let Ok(window) = windows.single() else {
        return;
    };
    let Ok((camera_transform, camera)) = cameras.single() else {
        return;
    };

    let target = window
        .cursor_position()
        .and_then(|cursor| camera.viewport_to_world(camera_transform, cursor).ok())
        .and_then(|ray| {
            pick_target(
                ray,
                &batch,
                wells
                    .iter()
                    .map(|(well, transform)| (*well, transform.translation())),
            )
        });

    if store.hovered() != target.as_ref() {
        actions.write(SceneAction::SetHovered(target.clone()));
    }

    if mouse_button.just_pressed(MouseButton::Left) {
        match target {
            Some(HoverTarget::Core(id)) => {
                info!("Selected population core {}", id);
                actions.write(SceneAction::SelectEntity(id));
            }
            Some(HoverTarget::Well(_)) => {}
            None => {
                if store.selection().is_some() {
                    actions.write(SceneAction::ClearSelection);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::batching::core_batch::CoreInstance;
    use crate::engine::data::records::{ResourceCategory, ResourceRef};

    fn down_ray(x: f32, y: f32) -> Ray3d {
        Ray3d::new(Vec3::new(x, y, 10_000.0), Dir3::NEG_Z)
    }

    fn batch(cores: &[(&str, Vec3, f32)]) -> CoreBatch {
        CoreBatch {
            instances: cores
                .iter()
                .map(|(_, position, scale)| CoreInstance {
                    position: position.to_array(),
                    scale: *scale,
                    pulse_rate: 1.0,
                    starved: 0.0,
                    size: scale / 100.0,
                    _padding: 0.0,
                })
                .collect(),
            ids: cores.iter().map(|(id, _, _)| PopulationId::new(*id)).collect(),
        }
    }

    #[test]
    fn sphere_hit_returns_the_near_surface() {
        let distance = ray_sphere_distance(down_ray(0.0, 0.0), Vec3::new(0.0, 0.0, 500.0), 100.0);
        assert_eq!(distance, Some(9_400.0));
        assert_eq!(
            ray_sphere_distance(down_ray(150.0, 0.0), Vec3::new(0.0, 0.0, 500.0), 100.0),
            None
        );
    }

    #[test]
    fn picks_the_closest_core() {
        let cores = batch(&[
            ("low", Vec3::new(0.0, 0.0, 400.0), 80.0),
            ("high", Vec3::new(20.0, 0.0, 1_200.0), 160.0),
            ("away", Vec3::new(2_000.0, 0.0, 400.0), 80.0),
        ]);
        let (id, _) = pick_core(down_ray(10.0, 0.0), &cores).expect("hit");
        assert_eq!(id, PopulationId::new("high"));
        assert!(pick_core(down_ray(900.0, 900.0), &cores).is_none());
    }

    #[test]
    fn wells_are_picked_when_no_core_is_closer() {
        let reference = ResourceRef {
            category: ResourceCategory::Health,
            index: 2,
        };
        let wells = [(
            ActiveWell {
                reference,
                radius: 80.0,
            },
            Vec3::new(500.0, 500.0, 5.0),
        )];
        let cores = batch(&[("core", Vec3::new(0.0, 0.0, 400.0), 80.0)]);

        assert_eq!(
            pick_target(down_ray(520.0, 480.0), &cores, wells),
            Some(HoverTarget::Well(reference))
        );
        assert_eq!(
            pick_target(down_ray(0.0, 0.0), &cores, wells),
            Some(HoverTarget::Core(PopulationId::new("core")))
        );
        assert_eq!(pick_target(down_ray(-900.0, 0.0), &cores, wells), None);
    }
}
