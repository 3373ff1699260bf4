use bevy::prelude::*;

use crate::engine::loading::progress::LoadingProgress;

#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Hash, States, Resource)]
pub enum AppState {
    #[default]
    Loading,
    Running,
}

#[derive(Component)]
pub struct FpsText;

/// Leave `Loading` once a dataset snapshot, real or empty, is in the store.
pub fn transition_to_running(
    loading_progress: Res<LoadingProgress>,
    mut next_state: ResMut<NextState<AppState>>,
) {
    if loading_progress.is_complete() {
        if loading_progress.load_failed {
            warn!("→ Transitioning to Running state without datasets");
        } else {
            info!("→ All datasets delivered, transitioning to Running state");
        }
        next_state.set(AppState::Running);
    }
}
