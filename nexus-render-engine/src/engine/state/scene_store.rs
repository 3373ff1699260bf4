use bevy::prelude::*;
use serde::Serialize;
use std::collections::HashSet;

use crate::engine::data::datasets::NexusDatasets;
use crate::engine::data::records::{PopulationId, PopulationRecord, ResourceRef};
use crate::engine::state::analysis_mode::AnalysisMode;

/// Link from a starved core to its nearest resource of the active mode.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Connection {
    /// Population the link starts from, held by id only.
    pub source: PopulationId,
    pub from: Vec3,
    pub to: Vec3,
    /// Planar projected distance divided by the units-per-kilometre convention.
    pub distance_km: f32,
    pub resource: ResourceRef,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CameraPose {
    pub position: Vec3,
    pub target: Vec3,
}

impl Default for CameraPose {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, -6000.0, 5000.0),
            target: Vec3::ZERO,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", content = "id", rename_all = "lowercase")]
pub enum HoverTarget {
    Core(PopulationId),
    Well(ResourceRef),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum DatasetState {
    #[default]
    Empty,
    Loaded(NexusDatasets),
}

/// Named transitions of the scene store. Sent as events by input sources
/// (RPC, keyboard, picking, loaders) and applied in arrival order.
#[derive(Event, Debug, Clone, PartialEq)]
pub enum SceneAction {
    SetAnalysisMode(AnalysisMode),
    SelectEntity(PopulationId),
    ClearSelection,
    SetHovered(Option<HoverTarget>),
    UpdateCamera(CameraPose),
    SetConnection(Option<Connection>),
    /// `None` installs the empty snapshot.
    SetDatasets(Option<NexusDatasets>),
    SetLoading(bool),
}

/// Notification published once per applied action, in application order.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SceneChange {
    AnalysisMode,
    Selection,
    Hover,
    Camera,
    Connection,
    Datasets,
    Loading,
}

impl SceneChange {
    /// Changes after which the nearest-resource match must be recomputed.
    pub fn triggers_matching(&self) -> bool {
        matches!(self, Self::AnalysisMode | Self::Selection | Self::Datasets)
    }
}

/// Single source of truth for the visualisation. Fields are private so every
/// mutation goes through [`SceneStore::dispatch`].
#[derive(Resource, Debug, Clone)]
pub struct SceneStore {
    analysis_mode: AnalysisMode,
    selection: Option<PopulationId>,
    hovered: Option<HoverTarget>,
    connection: Option<Connection>,
    loading: bool,
    datasets: DatasetState,
    starved: HashSet<PopulationId>,
    camera: CameraPose,
}

impl Default for SceneStore {
    fn default() -> Self {
        Self::new(AnalysisMode::default())
    }
}

impl SceneStore {
    pub fn new(analysis_mode: AnalysisMode) -> Self {
        Self {
            analysis_mode,
            selection: None,
            hovered: None,
            connection: None,
            loading: true,
            datasets: DatasetState::Empty,
            starved: HashSet::new(),
            camera: CameraPose::default(),
        }
    }

    /// Apply one action. Total: unknown ids and odd values are stored as given.
    pub fn dispatch(&mut self, action: SceneAction) -> SceneChange {
        match action {
            SceneAction::SetAnalysisMode(mode) => {
                self.analysis_mode = mode;
                SceneChange::AnalysisMode
            }
            SceneAction::SelectEntity(id) => {
                self.selection = Some(id);
                SceneChange::Selection
            }
            SceneAction::ClearSelection => {
                self.selection = None;
                SceneChange::Selection
            }
            SceneAction::SetHovered(target) => {
                self.hovered = target;
                SceneChange::Hover
            }
            SceneAction::UpdateCamera(pose) => {
                self.camera = pose;
                SceneChange::Camera
            }
            SceneAction::SetConnection(connection) => {
                self.connection = connection;
                SceneChange::Connection
            }
            SceneAction::SetDatasets(datasets) => {
                match datasets {
                    Some(datasets) => {
                        self.starved = datasets.starved_set();
                        self.datasets = DatasetState::Loaded(datasets);
                    }
                    None => {
                        self.starved.clear();
                        self.datasets = DatasetState::Empty;
                    }
                }
                SceneChange::Datasets
            }
            SceneAction::SetLoading(loading) => {
                self.loading = loading;
                SceneChange::Loading
            }
        }
    }

    pub fn analysis_mode(&self) -> AnalysisMode {
        self.analysis_mode
    }

    pub fn selection(&self) -> Option<&PopulationId> {
        self.selection.as_ref()
    }

    /// Resolve the weak selection against the current population collection.
    pub fn selected_entity(&self) -> Option<&PopulationRecord> {
        let id = self.selection.as_ref()?;
        self.datasets()?.population_by_id(id)
    }

    pub fn hovered(&self) -> Option<&HoverTarget> {
        self.hovered.as_ref()
    }

    pub fn connection(&self) -> Option<&Connection> {
        self.connection.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Loaded snapshot, if any.
    pub fn datasets(&self) -> Option<&NexusDatasets> {
        match &self.datasets {
            DatasetState::Loaded(datasets) => Some(datasets),
            DatasetState::Empty => None,
        }
    }

    pub fn starved(&self) -> &HashSet<PopulationId> {
        &self.starved
    }

    pub fn is_starved(&self, id: &PopulationId) -> bool {
        self.starved.contains(id)
    }

    pub fn camera(&self) -> CameraPose {
        self.camera
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::data::records::{ResourceCategory, StarvedRecord};

    fn datasets_with_starved(ids: &[&str]) -> NexusDatasets {
        NexusDatasets {
            starved: ids
                .iter()
                .map(|id| StarvedRecord {
                    id: PopulationId::new(*id),
                    is_starved: true,
                })
                .collect(),
            ..Default::default()
        }
    }

    #[test]
    fn new_store_is_loading_with_empty_datasets() {
        let store = SceneStore::default();
        assert!(store.is_loading());
        assert!(store.datasets().is_none());
        assert!(store.selection().is_none());
        assert!(store.connection().is_none());
        assert_eq!(store.analysis_mode(), AnalysisMode::Food);
    }

    #[test]
    fn every_action_reports_its_change() {
        let mut store = SceneStore::default();
        let actions = [
            (SceneAction::SetAnalysisMode(AnalysisMode::All), SceneChange::AnalysisMode),
            (SceneAction::SelectEntity(PopulationId::new("a")), SceneChange::Selection),
            (SceneAction::ClearSelection, SceneChange::Selection),
            (SceneAction::SetHovered(None), SceneChange::Hover),
            (SceneAction::UpdateCamera(CameraPose::default()), SceneChange::Camera),
            (SceneAction::SetConnection(None), SceneChange::Connection),
            (SceneAction::SetDatasets(None), SceneChange::Datasets),
            (SceneAction::SetLoading(false), SceneChange::Loading),
        ];

        for (action, expected) in actions {
            assert_eq!(store.dispatch(action), expected);
        }
    }

    #[test]
    fn unknown_selection_is_stored_as_given() {
        let mut store = SceneStore::default();
        store.dispatch(SceneAction::SetDatasets(Some(NexusDatasets::default())));
        store.dispatch(SceneAction::SelectEntity(PopulationId::new("ghost")));

        assert_eq!(store.selection(), Some(&PopulationId::new("ghost")));
        assert!(store.selected_entity().is_none());
    }

    #[test]
    fn datasets_replace_the_starved_set() {
        let mut store = SceneStore::default();
        store.dispatch(SceneAction::SetDatasets(Some(datasets_with_starved(&["a", "b"]))));
        assert!(store.is_starved(&PopulationId::new("a")));

        store.dispatch(SceneAction::SetDatasets(Some(datasets_with_starved(&["c"]))));
        assert!(!store.is_starved(&PopulationId::new("a")));
        assert!(store.is_starved(&PopulationId::new("c")));

        store.dispatch(SceneAction::SetDatasets(None));
        assert!(store.starved().is_empty());
        assert!(store.datasets().is_none());
    }

    #[test]
    fn connection_is_owned_by_the_store() {
        let mut store = SceneStore::default();
        let connection = Connection {
            source: PopulationId::new("a"),
            from: Vec3::ZERO,
            to: Vec3::new(1000.0, 0.0, 10.0),
            distance_km: 1.0,
            resource: ResourceRef {
                category: ResourceCategory::Food,
                index: 0,
            },
        };
        store.dispatch(SceneAction::SetConnection(Some(connection.clone())));
        assert_eq!(store.connection(), Some(&connection));

        store.dispatch(SceneAction::SetConnection(None));
        assert!(store.connection().is_none());
    }

    #[test]
    fn only_selection_mode_and_dataset_changes_trigger_matching() {
        assert!(SceneChange::Selection.triggers_matching());
        assert!(SceneChange::AnalysisMode.triggers_matching());
        assert!(SceneChange::Datasets.triggers_matching());
        assert!(!SceneChange::Connection.triggers_matching());
        assert!(!SceneChange::Hover.triggers_matching());
        assert!(!SceneChange::Camera.triggers_matching());
        assert!(!SceneChange::Loading.triggers_matching());
    }
}
