//! Process-wide scene state.
//!
//! One injectable store resource mutated only through `SceneAction` events,
//! with every applied action announced as a `SceneChange`.

/// Analysis lenses and the mode to resource-category dispatch table.
pub mod analysis_mode;

/// Store resource, action set and change notifications.
pub mod scene_store;

/// Action application system and the chained per-frame system sets.
pub mod systems;
