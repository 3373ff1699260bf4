use bevy::input::mouse::MouseScrollUnit;
use bevy::{
    input::mouse::{MouseMotion, MouseWheel},
    prelude::*,
};

use crate::engine::state::scene_store::{CameraPose, SceneAction, SceneStore};

const MIN_PITCH: f32 = 0.05;
const MAX_PITCH: f32 = 1.55;
const MIN_DISTANCE: f32 = 200.0;
const MAX_DISTANCE: f32 = 60_000.0;

/// Z-up orbit around a ground target. `pitch` is the elevation angle above
/// the ground plane, `yaw` the heading of the camera offset around +Z.
#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct ViewportCamera {
    pub target: Vec3,
    pub distance: f32,
    pub yaw: f32,
    pub pitch: f32,
}

impl ViewportCamera {
    pub fn from_pose(pose: CameraPose) -> Self {
        let offset = pose.position - pose.target;
        let distance = offset.length().max(MIN_DISTANCE);
        let planar = offset.truncate().length();

        Self {
            target: pose.target,
            distance,
            yaw: offset.y.atan2(offset.x),
            pitch: offset.z.atan2(planar).clamp(MIN_PITCH, MAX_PITCH),
        }
    }

    pub fn pose(&self) -> CameraPose {
        orbit_pose(self.target, self.distance, self.yaw, self.pitch)
    }

    pub fn rotate(&mut self, delta: Vec2) {
        let yaw_sens = 0.0035;
        let pitch_sens = 0.0030;
        self.yaw -= delta.x * yaw_sens;
        self.pitch = (self.pitch + delta.y * pitch_sens).clamp(MIN_PITCH, MAX_PITCH);
    }

    /// Positive steps move closer.
    pub fn zoom(&mut self, steps: f32) {
        self.distance = (self.distance * 0.9_f32.powf(steps)).clamp(MIN_DISTANCE, MAX_DISTANCE);
    }

    /// Pan in the ground plane; `input.y` is forward along the view heading.
    pub fn pan(&mut self, input: Vec2, amount: f32) {
        if input == Vec2::ZERO {
            return;
        }
        let forward = -Vec2::from_angle(self.yaw);
        let right = Vec2::new(forward.y, -forward.x);
        let delta = (right * input.x + forward * input.y).normalize() * amount;
        self.target += delta.extend(0.0);
    }
}

impl Default for ViewportCamera {
    fn default() -> Self {
        Self::from_pose(CameraPose::default())
    }
}

/// Camera position on the orbit sphere around `target`.
pub fn orbit_pose(target: Vec3, distance: f32, yaw: f32, pitch: f32) -> CameraPose {
    let offset = Vec3::new(
        pitch.cos() * yaw.cos(),
        pitch.cos() * yaw.sin(),
        pitch.sin(),
    ) * distance;

    CameraPose {
        position: target + offset,
        target,
    }
}

pub fn spawn_viewport_camera(mut commands: Commands, store: Res<SceneStore>) {
    let pose = store.camera();
    commands.spawn((
        Camera3d::default(),
        Camera {
            clear_color: ClearColorConfig::Custom(Color::srgb(0.0, 0.0, 0.04)),
            ..default()
        },
        Transform::from_translation(pose.position).looking_at(pose.target, Vec3::Z),
    ));
    commands.insert_resource(ViewportCamera::from_pose(pose));
}

pub fn camera_controller(
    mut camera_query: Query<&mut Transform, With<Camera3d>>,
    mut viewport: ResMut<ViewportCamera>,
    mut actions: EventWriter<SceneAction>,
    mouse_button: Res<ButtonInput<MouseButton>>,
    mut mouse_motion: EventReader<MouseMotion>,
    mut scroll_events: EventReader<MouseWheel>,
    keyboard: Res<ButtonInput<KeyCode>>,
    time: Res<Time>,
) {
    let Ok(mut camera_transform) = camera_query.single_mut() else {
        return;
    };
    let before = *viewport;

    let mouse_delta: Vec2 = mouse_motion.read().map(|m| m.delta).sum();
    if mouse_button.pressed(MouseButton::Right) && mouse_delta != Vec2::ZERO {
        viewport.rotate(mouse_delta);
    }

    let mut scroll_accum = 0.0;
    for ev in scroll_events.read() {
        scroll_accum += match ev.unit {
            MouseScrollUnit::Line => ev.y,
            MouseScrollUnit::Pixel => ev.y * 0.05,
        };
    }
    if scroll_accum.abs() > f32::EPSILON {
        viewport.zoom(scroll_accum);
    }

    let mut move_input = Vec2::ZERO;
    if keyboard.pressed(KeyCode::KeyW) {
        move_input.y += 1.0;
    }
    if keyboard.pressed(KeyCode::KeyS) {
        move_input.y -= 1.0;
    }
    if keyboard.pressed(KeyCode::KeyD) {
        move_input.x += 1.0;
    }
    if keyboard.pressed(KeyCode::KeyA) {
        move_input.x -= 1.0;
    }
    if move_input != Vec2::ZERO {
        // Shift = faster
        let mut speed = viewport.distance * 0.5;
        if keyboard.any_pressed([KeyCode::ShiftLeft, KeyCode::ShiftRight]) {
            speed *= 3.0;
        }
        viewport.pan(move_input, speed * time.delta_secs());
    }

    let pose = viewport.pose();
    if *viewport != before {
        actions.write(SceneAction::UpdateCamera(pose));
    }

    let target = Transform::from_translation(pose.position).looking_at(pose.target, Vec3::Z);
    let lerp_speed = (12.0 * time.delta_secs()).min(1.0);
    camera_transform.translation = camera_transform.translation.lerp(target.translation, lerp_speed);
    camera_transform.rotation = camera_transform.rotation.slerp(target.rotation, lerp_speed);
}
