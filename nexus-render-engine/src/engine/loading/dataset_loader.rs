use bevy::asset::LoadState;
use bevy::prelude::*;

use super::manifest_loader::DatasetLoader;
use super::progress::LoadingProgress;
use crate::engine::data::datasets::NexusDatasets;
use crate::engine::state::scene_store::SceneAction;

/// Result of the asynchronous dataset request.
#[derive(Debug, Clone, PartialEq)]
pub enum DatasetLoadOutcome {
    Loaded(NexusDatasets),
    Failed,
}

/// Store actions that hand a load outcome over as one snapshot.
/// A failure installs the empty snapshot, so nothing is rendered.
pub fn dataset_actions(outcome: DatasetLoadOutcome) -> [SceneAction; 2] {
    let datasets = match outcome {
        DatasetLoadOutcome::Loaded(datasets) => Some(datasets),
        DatasetLoadOutcome::Failed => None,
    };
    [SceneAction::SetDatasets(datasets), SceneAction::SetLoading(false)]
}

pub fn deliver_datasets(
    outcome: DatasetLoadOutcome,
    actions: &mut EventWriter<SceneAction>,
    loading_progress: &mut LoadingProgress,
) {
    loading_progress.load_failed = outcome == DatasetLoadOutcome::Failed;
    actions.write_batch(dataset_actions(outcome));
    loading_progress.datasets_delivered = true;
}

/// Deliver the snapshot once the asset server has it.
pub fn monitor_dataset_loading(
    mut loading_progress: ResMut<LoadingProgress>,
    dataset_loader: Res<DatasetLoader>,
    mut actions: EventWriter<SceneAction>,
    asset_server: Res<AssetServer>,
    datasets: Res<Assets<NexusDatasets>>,
) {
    if loading_progress.datasets_delivered || !loading_progress.datasets_requested {
        return;
    }
    let Some(handle) = dataset_loader.handle.as_ref() else {
        return;
    };

    if let Some(snapshot) = datasets.get(handle) {
        info!(
            "✓ Datasets loaded: {} population records, {} resources, {} roads",
            snapshot.population.len(),
            snapshot.infrastructure.resource_count(),
            snapshot.infrastructure.roads.len()
        );
        deliver_datasets(
            DatasetLoadOutcome::Loaded(snapshot.clone()),
            &mut actions,
            &mut loading_progress,
        );
    } else if let Some(LoadState::Failed(error)) = asset_server.get_load_state(handle) {
        error!("Failed to load datasets: {}", error);
        deliver_datasets(
            DatasetLoadOutcome::Failed,
            &mut actions,
            &mut loading_progress,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loaded_snapshot_is_installed_then_loading_cleared() {
        let datasets = NexusDatasets::default();
        let actions = dataset_actions(DatasetLoadOutcome::Loaded(datasets.clone()));
        assert_eq!(
            actions,
            [
                SceneAction::SetDatasets(Some(datasets)),
                SceneAction::SetLoading(false)
            ]
        );
    }

    #[test]
    fn failure_installs_the_empty_snapshot() {
        let actions = dataset_actions(DatasetLoadOutcome::Failed);
        assert_eq!(
            actions,
            [SceneAction::SetDatasets(None), SceneAction::SetLoading(false)]
        );
    }

    #[test]
    fn datasets_json_parses() {
        let json = r#"{
            "population": [
                { "id": "W1-A", "lon": 90.41, "lat": 23.81, "density": 52000, "growthRate": 0.03, "ward": "1" }
            ],
            "infrastructure": {
                "roads": [ { "from": [90.40, 23.80], "to": [90.41, 23.81], "connectivity": 0.8 } ],
                "markets": [ { "lon": 90.405, "lat": 23.805, "radius": 1.5 } ],
                "hospitals": [ { "lon": 90.39, "lat": 23.79 } ],
                "transit": [ { "lon": 90.42, "lat": 23.82, "capacity": 2500 } ]
            },
            "starved": [ { "id": "W1-A", "isStarved": true } ]
        }"#;
        let snapshot: NexusDatasets = serde_json::from_str(json).expect("valid datasets");

        assert_eq!(snapshot.population.len(), 1);
        assert!((snapshot.population[0].growth_rate - 0.03).abs() < 1e-12);
        assert_eq!(snapshot.infrastructure.resource_count(), 3);
        assert_eq!(snapshot.starved_set().len(), 1);
    }
}
