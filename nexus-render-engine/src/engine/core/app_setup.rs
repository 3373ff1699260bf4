use bevy::asset::AssetMetaCheck;
use bevy::diagnostic::FrameTimeDiagnosticsPlugin;
use bevy::prelude::*;
use bevy_common_assets::json::JsonAssetPlugin;

use crate::constants::path::{DATASETS_EXTENSION, MANIFEST_EXTENSION};
use crate::engine::animation::clock::{
    ClockRegistry, SceneClock, drive_scene_clock, tick_scene_clock,
};
use crate::engine::assets::nexus_manifest::NexusManifest;
use crate::engine::batching::core_render::{
    CoreRenderPlugin, rebuild_core_batch, spawn_core_carrier, update_core_shader_params,
};
use crate::engine::camera::viewport_camera::{camera_controller, spawn_viewport_camera};
use crate::engine::connection::thread::rebuild_connection_thread;
use crate::engine::core::app_state::{AppState, FpsText, transition_to_running};
use crate::engine::core::window_config::create_window_config;
use crate::engine::data::datasets::NexusDatasets;
use crate::engine::loading::dataset_loader::monitor_dataset_loading;
use crate::engine::loading::manifest_loader::{
    DatasetLoader, ManifestLoader, load_manifest_system, start_loading,
};
use crate::engine::loading::progress::LoadingProgress;
use crate::engine::matching::nearest::resolve_connection;
use crate::engine::shaders::materials::NexusMaterialsPlugin;
use crate::engine::state::systems::{NexusSet, SceneStatePlugin};
use crate::engine::streams::rebuild_streams;
use crate::engine::systems::fps_tracking::fps_notification_system;
use crate::engine::wells::spawn::rebuild_wells;
use crate::rpc::web_rpc::WebRpcPlugin;
use crate::tools::core_picking::core_picking_system;
use crate::tools::mode_shortcuts::handle_mode_shortcuts;

#[cfg(not(target_arch = "wasm32"))]
use crate::engine::systems::fps_tracking::fps_text_update_system;

pub fn create_app() -> App {
    let mut app = App::new();

    app.add_plugins(create_default_plugins())
        .init_state::<AppState>()
        .add_plugins(SceneStatePlugin)
        .add_plugins(NexusMaterialsPlugin)
        .add_plugins(CoreRenderPlugin)
        .add_plugins(FrameTimeDiagnosticsPlugin::default())
        // Registers the manifest and dataset snapshot as loadable JSON assets.
        .add_plugins(JsonAssetPlugin::<NexusManifest>::new(&[MANIFEST_EXTENSION]))
        .add_plugins(JsonAssetPlugin::<NexusDatasets>::new(&[DATASETS_EXTENSION]))
        .add_plugins(WebRpcPlugin);

    app.init_resource::<LoadingProgress>()
        .init_resource::<ManifestLoader>()
        .init_resource::<DatasetLoader>()
        .init_resource::<SceneClock>()
        .init_resource::<ClockRegistry>();

    app.add_systems(
        Startup,
        (setup, spawn_viewport_camera, spawn_core_carrier, start_loading).chain(),
    );

    // Loading phase: the snapshot is handed to the store as input actions.
    app.add_systems(
        Update,
        (load_manifest_system, monitor_dataset_loading)
            .chain()
            .in_set(NexusSet::Input)
            .run_if(in_state(AppState::Loading)),
    )
    .add_systems(
        Update,
        transition_to_running
            .after(NexusSet::Animate)
            .run_if(in_state(AppState::Loading)),
    );

    // Interactive input only once the scene is running.
    app.add_systems(
        Update,
        (camera_controller, core_picking_system, handle_mode_shortcuts)
            .in_set(NexusSet::Input)
            .run_if(in_state(AppState::Running)),
    );

    // Derived scene content follows store changes in every state.
    app.add_systems(
        Update,
        (
            (resolve_connection, rebuild_connection_thread).chain(),
            rebuild_core_batch,
            update_core_shader_params,
            rebuild_wells,
            rebuild_streams,
        )
            .in_set(NexusSet::Derive),
    );

    app.add_systems(
        Update,
        ((tick_scene_clock, drive_scene_clock).chain(), fps_notification_system)
            .in_set(NexusSet::Animate),
    );

    // The text overlay only exists natively; the web page draws its own.
    #[cfg(not(target_arch = "wasm32"))]
    {
        app.add_systems(Update, fps_text_update_system.in_set(NexusSet::Animate));
    }

    app
}

fn spawn_lighting(commands: &mut Commands) {
    commands.spawn((
        DirectionalLight {
            shadows_enabled: false,
            ..default()
        },
        Transform::from_xyz(0.0, -1.0, 2.0).looking_at(Vec3::ZERO, Vec3::Z),
    ));
}

fn setup(mut commands: Commands) {
    spawn_lighting(&mut commands);

    #[cfg(not(target_arch = "wasm32"))]
    {
        create_native_overlays(&mut commands);
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn create_native_overlays(commands: &mut Commands) {
    commands
        .spawn(Node {
            width: Val::Percent(100.0),
            height: Val::Percent(100.0),
            ..default()
        })
        .with_children(|parent| {
            parent.spawn((
                Text::new("FPS: "),
                TextFont {
                    font_size: 16.0,
                    ..default()
                },
                TextColor(Color::srgb(0.27, 0.67, 1.0)),
                Node {
                    position_type: PositionType::Absolute,
                    bottom: Val::Px(12.0),
                    right: Val::Px(12.0),
                    ..default()
                },
                FpsText,
            ));
        });
}

fn create_default_plugins() -> impl PluginGroup {
    let window_config = WindowPlugin {
        primary_window: Some(create_window_config()),
        ..default()
    };

    let asset_config = AssetPlugin {
        meta_check: AssetMetaCheck::Never,
        ..default()
    };

    DefaultPlugins.set(window_config).set(asset_config)
}
