use bevy::asset::LoadState;
use bevy::prelude::*;

use super::progress::LoadingProgress;
use crate::constants::path::RELATIVE_MANIFEST_PATH;
use crate::engine::assets::nexus_manifest::NexusManifest;
use crate::engine::data::datasets::NexusDatasets;
use crate::engine::loading::dataset_loader::{DatasetLoadOutcome, deliver_datasets};
use crate::engine::state::scene_store::SceneAction;

#[derive(Resource, Default)]
pub struct ManifestLoader {
    handle: Option<Handle<NexusManifest>>,
}

/// Handle of the requested dataset snapshot.
#[derive(Resource, Default)]
pub struct DatasetLoader {
    pub handle: Option<Handle<NexusDatasets>>,
}

// Start the loading process
pub fn start_loading(mut manifest_loader: ResMut<ManifestLoader>, asset_server: Res<AssetServer>) {
    manifest_loader.handle = Some(asset_server.load(RELATIVE_MANIFEST_PATH));
    info!("Loading scene manifest: {}", RELATIVE_MANIFEST_PATH);
}

/// Apply the manifest once parsed and request the dataset snapshot it names.
pub fn load_manifest_system(
    mut commands: Commands,
    mut loading_progress: ResMut<LoadingProgress>,
    manifest_loader: Res<ManifestLoader>,
    mut dataset_loader: ResMut<DatasetLoader>,
    mut actions: EventWriter<SceneAction>,
    asset_server: Res<AssetServer>,
    manifests: Res<Assets<NexusManifest>>,
) {
    if loading_progress.manifest_loaded || loading_progress.datasets_delivered {
        return;
    }
    let Some(handle) = manifest_loader.handle.as_ref() else {
        return;
    };

    if let Some(manifest) = manifests.get(handle) {
        info!(
            "✓ Manifest loaded: datasets {}, initial mode {}",
            manifest.datasets,
            manifest.initial_analysis_mode.as_str()
        );
        commands.insert_resource(manifest.clone());
        actions.write(SceneAction::SetAnalysisMode(manifest.initial_analysis_mode));

        dataset_loader.handle = Some(asset_server.load(manifest.datasets.clone()));
        loading_progress.manifest_loaded = true;
        loading_progress.datasets_requested = true;
        return;
    }

    if let Some(LoadState::Failed(error)) = asset_server.get_load_state(handle) {
        error!("Failed to load scene manifest: {}", error);
        deliver_datasets(
            DatasetLoadOutcome::Failed,
            &mut actions,
            &mut loading_progress,
        );
    }
}
