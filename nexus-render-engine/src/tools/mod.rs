//! Interactive input sources feeding the scene store.
//!
//! Tools never mutate the store directly: they emit `SceneAction` events in the
//! `NexusSet::Input` set and the store applies them in arrival order.
//!
//! ## Available Tools
//!
//! ### Core Picking
//! - **Hover**: the cursor ray is tested against every core sphere and well disc;
//!   the closest hit becomes the hovered target (`SetHovered`)
//! - **Select**: left click on a core sends `SelectEntity`, left click on empty
//!   space clears the selection
//!
//! ### Mode Shortcuts (native only)
//! - `1` food, `2` housing, `3` transportation, `4` all
//! - `Escape` clears the selection
//!
//! ## Cross-Platform Considerations
//!
//! WASM builds take analysis modes and selection over JSON-RPC from the host
//! page instead of the keyboard; picking works on both targets.

/// Cursor ray picking of cores and wells for hover and selection.
pub mod core_picking;

/// Keyboard shortcuts for analysis modes and clearing the selection.
pub mod mode_shortcuts;
