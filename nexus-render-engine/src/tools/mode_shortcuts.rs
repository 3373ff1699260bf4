use bevy::prelude::*;

use crate::engine::state::analysis_mode::AnalysisMode;
use crate::engine::state::scene_store::SceneAction;

/// Number key to analysis mode mapping.
pub fn mode_for_key(key: KeyCode) -> Option<AnalysisMode> {
    match key {
        KeyCode::Digit1 => Some(AnalysisMode::Food),
        KeyCode::Digit2 => Some(AnalysisMode::Housing),
        KeyCode::Digit3 => Some(AnalysisMode::Transportation),
        KeyCode::Digit4 => Some(AnalysisMode::All),
        _ => None,
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub fn handle_mode_shortcuts(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut actions: EventWriter<SceneAction>,
) {
    for key in keyboard.get_just_pressed() {
        if let Some(mode) = mode_for_key(*key) {
            info!("Analysis mode shortcut: {}", mode.as_str());
            actions.write(SceneAction::SetAnalysisMode(mode));
        }
    }

    if keyboard.just_pressed(KeyCode::Escape) {
        actions.write(SceneAction::ClearSelection);
    }
}

/// Placeholder system for WASM builds where the mode is driven over RPC.
#[cfg(target_arch = "wasm32")]
pub fn handle_mode_shortcuts() {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn number_keys_map_to_modes() {
        assert_eq!(mode_for_key(KeyCode::Digit1), Some(AnalysisMode::Food));
        assert_eq!(mode_for_key(KeyCode::Digit2), Some(AnalysisMode::Housing));
        assert_eq!(
            mode_for_key(KeyCode::Digit3),
            Some(AnalysisMode::Transportation)
        );
        assert_eq!(mode_for_key(KeyCode::Digit4), Some(AnalysisMode::All));
        assert_eq!(mode_for_key(KeyCode::Digit5), None);
    }
}
