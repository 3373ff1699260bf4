//! JSON-RPC 2.0 communication layer for the host dashboard.
//!
//! Implements bidirectional messaging between the Bevy engine and the host page via
//! iframe postMessage, supporting both request-response and notification patterns.
//!
//! ## Architecture
//!
//! The RPC system uses standard JSON-RPC 2.0 protocol with:
//! - **Requests**: Expect responses with matching IDs
//! - **Notifications**: One-way messages without responses
//! - **Responses**: Reply to requests with results or errors
//!
//! ## Message Flow
//!
//! ```text
//! Host (Parent Window)   <──postMessage──>  Bevy (iframe)
//!        │                                        │
//!        ├─ Request (with ID) ──────────────────> │
//!        │                                        ├─ Process request
//!        │ <───────────────── Response (with ID) ─┤
//!        │                                        │
//!        │ <────────── Notification (no ID) ─────┤
//! ```
//!
//! ## Adding New RPC Methods
//!
//! Add a match arm in `dispatch_method()` returning `Result<Value, RpcError>`.
//! Methods never touch the store: anything that changes scene state is pushed
//! as a `SceneAction` and applied in the `NexusSet::Settle` set with the rest
//! of the frame's input.
//!
//! ```rust,ignore
//! "clear_selection" => {
//!     actions.push(SceneAction::ClearSelection);
//!     Ok(serde_json::json!({ "success": true }))
//! }
//! ```
//!
//! From the host page:
//!
//! ```typescript
//! iframe.contentWindow.postMessage(JSON.stringify({
//!   jsonrpc: "2.0",
//!   method: "set_analysis_mode",
//!   params: { mode: "housing" },
//!   id: 1
//! }), "*");
//! ```
//!
//! ## Error Handling
//!
//! Standard JSON-RPC 2.0 error codes:
//! - `-32600`: Invalid request
//! - `-32601`: Method not found
//! - `-32602`: Invalid params
//! - `-32603`: Internal error
//!
//! ## Existing Methods
//!
//! ### Scene Control
//! - `set_analysis_mode`: Switch lens (`food`, `housing`, `transportation`, `all`)
//! - `select_entity`: Select a population core by id
//! - `clear_selection`: Drop the current selection and its connection
//!
//! ### Queries
//! - `get_scene_state`: Mode, selection, hover, connection, loading flag and camera
//! - `get_fps`: Retrieve current frame rate
//!
//! ## Notifications
//!
//! - `analysis_mode_changed`: `{ mode }`
//! - `selection_changed`: `{ id }` (null when cleared)
//! - `connection_changed`: `{ source, distance_km, resource }` or null
//! - `loading_changed`: `{ loading }`
//! - `fps_update`: `{ fps }`, every half second

/// Wire types of the JSON-RPC 2.0 messages and their error codes.
pub mod protocol;

/// postMessage transport between the page and the engine; inert on native builds.
pub mod host_bridge;

/// Request handling, store change notifications and the plugin tying them to
/// the frame schedule.
pub mod web_rpc;
