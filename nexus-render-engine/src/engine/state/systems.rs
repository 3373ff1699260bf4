use bevy::prelude::*;

use super::scene_store::{SceneAction, SceneChange, SceneStore};

/// Per-frame ordering of the scene pipeline. Chained, so all actions of a
/// frame settle before anything derived from them is recomputed.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum NexusSet {
    /// Input sources emit `SceneAction`s.
    Input,
    /// Actions are applied to the store.
    Settle,
    /// Matching, batches, wells and geometry are rebuilt.
    Derive,
    /// Clock-driven uniform and transform updates.
    Animate,
}

/// Registers the store, its events and the system ordering. Needs no window or
/// renderer, so it is also what system-level tests build on.
pub struct SceneStatePlugin;

impl Plugin for SceneStatePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<SceneStore>()
            .add_event::<SceneAction>()
            .add_event::<SceneChange>()
            .configure_sets(
                Update,
                (
                    NexusSet::Input,
                    NexusSet::Settle,
                    NexusSet::Derive,
                    NexusSet::Animate,
                )
                    .chain(),
            )
            .add_systems(Update, apply_scene_actions.in_set(NexusSet::Settle));
    }
}

/// Apply queued actions in call order, publishing one change per action.
pub fn apply_scene_actions(
    mut actions: EventReader<SceneAction>,
    mut store: ResMut<SceneStore>,
    mut changes: EventWriter<SceneChange>,
) {
    for action in actions.read() {
        let change = store.dispatch(action.clone());
        changes.write(change);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::data::records::PopulationId;
    use crate::engine::state::analysis_mode::AnalysisMode;
    use bevy::ecs::event::Events;

    #[test]
    fn actions_are_applied_and_announced_in_order() {
        let mut app = App::new();
        app.add_plugins(SceneStatePlugin);

        app.world_mut()
            .send_event(SceneAction::SetAnalysisMode(AnalysisMode::Housing));
        app.world_mut()
            .send_event(SceneAction::SelectEntity(PopulationId::new("core-9")));
        app.update();

        let store = app.world().resource::<SceneStore>();
        assert_eq!(store.analysis_mode(), AnalysisMode::Housing);
        assert_eq!(store.selection(), Some(&PopulationId::new("core-9")));

        let events = app.world().resource::<Events<SceneChange>>();
        let mut cursor = events.get_cursor();
        let changes: Vec<SceneChange> = cursor.read(events).copied().collect();
        assert_eq!(changes, vec![SceneChange::AnalysisMode, SceneChange::Selection]);
    }
}
