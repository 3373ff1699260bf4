use bevy::prelude::*;

/// Loading milestones checked by the state transition into `Running`.
#[derive(Resource, Debug, Default, Clone, PartialEq)]
pub struct LoadingProgress {
    pub manifest_loaded: bool,
    pub datasets_requested: bool,
    /// Set once a snapshot, real or empty, has been handed to the store.
    pub datasets_delivered: bool,
    pub load_failed: bool,
}

impl LoadingProgress {
    pub fn is_complete(&self) -> bool {
        self.datasets_delivered
    }
}
