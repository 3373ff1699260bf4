use bevy::diagnostic::DiagnosticsStore;
use bevy::prelude::*;
use serde::Deserialize;

use super::host_bridge::{HostInbox, install_host_listener, post_to_host};
use super::protocol::{
    INVALID_REQUEST, JSONRPC_VERSION, METHOD_NOT_FOUND, OutgoingMessage, RpcError,
    RpcNotification, RpcRequest, RpcResponse,
};
use crate::engine::data::records::PopulationId;
use crate::engine::state::analysis_mode::AnalysisMode;
use crate::engine::state::scene_store::{SceneAction, SceneChange, SceneStore};
use crate::engine::state::systems::NexusSet;
use crate::engine::systems::fps_tracking::smoothed_fps;

/// Outbox of responses and notifications for the host page, flushed at the
/// end of every frame.
#[derive(Resource, Default)]
pub struct WebRpcInterface {
    outbox: Vec<OutgoingMessage>,
}

impl WebRpcInterface {
    pub fn send_notification(&mut self, method: &str, params: serde_json::Value) {
        self.outbox
            .push(OutgoingMessage::Notification(RpcNotification::new(method, params)));
    }

    fn queue_response(&mut self, response: RpcResponse) {
        self.outbox.push(OutgoingMessage::Response(response));
    }

    pub fn pending(&self) -> &[OutgoingMessage] {
        &self.outbox
    }
}

/// Host page bridge: requests are read in `NexusSet::Input`, replies and
/// store change notifications leave in `NexusSet::Animate`.
pub struct WebRpcPlugin;

impl Plugin for WebRpcPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<WebRpcInterface>()
            .init_resource::<HostInbox>()
            .add_systems(Startup, install_host_listener)
            .add_systems(Update, receive_rpc_requests.in_set(NexusSet::Input))
            .add_systems(
                Update,
                (notify_scene_changes, flush_rpc_outbox)
                    .chain()
                    .in_set(NexusSet::Animate),
            );
    }
}

fn receive_rpc_requests(
    inbox: Res<HostInbox>,
    diagnostics: Res<DiagnosticsStore>,
    store: Res<SceneStore>,
    mut rpc_interface: ResMut<WebRpcInterface>,
    mut scene_actions: EventWriter<SceneAction>,
) {
    let messages = inbox.drain();
    if messages.is_empty() {
        return;
    }
    let fps = smoothed_fps(&diagnostics).unwrap_or(0.0) as f32;

    for message in messages {
        let request = match serde_json::from_str::<RpcRequest>(&message) {
            Ok(request) => request,
            Err(err) => {
                warn!("Discarding malformed RPC message: {}", err);
                continue;
            }
        };

        let mut actions = Vec::new();
        if let Some(response) = handle_rpc_request(&request, &store, fps, &mut actions) {
            rpc_interface.queue_response(response);
        }
        scene_actions.write_batch(actions);
    }
}

fn flush_rpc_outbox(mut rpc_interface: ResMut<WebRpcInterface>) {
    for message in rpc_interface.outbox.drain(..) {
        post_to_host(&message);
    }
}

/// Answer one request. Store mutations are pushed to `actions` so they settle
/// with the rest of the frame's input; the store itself is only read.
pub fn handle_rpc_request(
    request: &RpcRequest,
    store: &SceneStore,
    fps: f32,
    actions: &mut Vec<SceneAction>,
) -> Option<RpcResponse> {
    let outcome = if request.jsonrpc != JSONRPC_VERSION {
        Err(RpcError::new(INVALID_REQUEST, "Invalid request"))
    } else {
        dispatch_method(request, store, fps, actions)
    };

    // Requests without an id are notifications and never answered.
    let id = request.id.clone()?;
    Some(match outcome {
        Ok(result) => RpcResponse::success(id, result),
        Err(error) => RpcResponse::failure(id, error),
    })
}

fn dispatch_method(
    request: &RpcRequest,
    store: &SceneStore,
    fps: f32,
    actions: &mut Vec<SceneAction>,
) -> Result<serde_json::Value, RpcError> {
    match request.method.as_str() {
        "set_analysis_mode" => {
            let params: ModeParams = parse_params(&request.params, "Expected 'mode' parameter")?;
            let mode = AnalysisMode::from_string(&params.mode)
                .ok_or_else(|| RpcError::invalid_params(format!("Unknown mode: {}", params.mode)))?;
            info!("Analysis mode requested over RPC: {}", mode.as_str());
            actions.push(SceneAction::SetAnalysisMode(mode));
            Ok(serde_json::json!({ "success": true, "analysis_mode": mode.as_str() }))
        }
        "select_entity" => {
            let params: SelectParams = parse_params(&request.params, "Expected 'id' parameter")?;
            // Unknown ids are stored as given; the matcher simply finds nothing.
            actions.push(SceneAction::SelectEntity(PopulationId::new(params.id.clone())));
            Ok(serde_json::json!({ "success": true, "selected": params.id }))
        }
        "clear_selection" => {
            actions.push(SceneAction::ClearSelection);
            Ok(serde_json::json!({ "success": true }))
        }
        "get_scene_state" => scene_state_json(store),
        "get_fps" => Ok(serde_json::json!({ "fps": fps })),
        unknown => {
            warn!("Unknown RPC method: {}", unknown);
            Err(RpcError::new(METHOD_NOT_FOUND, "Method not found")
                .with_data(serde_json::json!({ "method": unknown })))
        }
    }
}

#[derive(Deserialize)]
struct ModeParams {
    mode: String,
}

#[derive(Deserialize)]
struct SelectParams {
    id: String,
}

fn parse_params<T: serde::de::DeserializeOwned>(
    params: &serde_json::Value,
    expectation: &str,
) -> Result<T, RpcError> {
    T::deserialize(params).map_err(|_| RpcError::invalid_params(expectation))
}

fn scene_state_json(store: &SceneStore) -> Result<serde_json::Value, RpcError> {
    let to_value = |value: serde_json::Result<serde_json::Value>| {
        value.map_err(|e| RpcError::internal_error(format!("Serialisation failed: {e}")))
    };

    Ok(serde_json::json!({
        "analysis_mode": store.analysis_mode().as_str(),
        "selected": store.selection(),
        "hovered": to_value(serde_json::to_value(store.hovered()))?,
        "connection": to_value(serde_json::to_value(store.connection()))?,
        "loading": store.is_loading(),
        "camera": to_value(serde_json::to_value(store.camera()))?,
        "population_count": store.datasets().map_or(0, |d| d.population.len()),
        "starved_count": store.starved().len(),
    }))
}

/// Notification for a store change, if the host page cares about it.
pub fn change_notification(
    change: SceneChange,
    store: &SceneStore,
) -> Option<(&'static str, serde_json::Value)> {
    match change {
        SceneChange::AnalysisMode => Some((
            "analysis_mode_changed",
            serde_json::json!({ "mode": store.analysis_mode().as_str() }),
        )),
        SceneChange::Selection => Some((
            "selection_changed",
            serde_json::json!({ "id": store.selection() }),
        )),
        SceneChange::Connection => Some((
            "connection_changed",
            match store.connection() {
                Some(connection) => serde_json::json!({
                    "source": connection.source,
                    "distance_km": connection.distance_km,
                    "resource": connection.resource,
                }),
                None => serde_json::Value::Null,
            },
        )),
        SceneChange::Loading => Some((
            "loading_changed",
            serde_json::json!({ "loading": store.is_loading() }),
        )),
        SceneChange::Hover | SceneChange::Camera | SceneChange::Datasets => None,
    }
}

/// Push store changes to the host page once the frame has settled.
pub fn notify_scene_changes(
    mut changes: EventReader<SceneChange>,
    store: Res<SceneStore>,
    mut rpc_interface: ResMut<WebRpcInterface>,
) {
    for change in changes.read() {
        if let Some((method, params)) = change_notification(*change, &store) {
            rpc_interface.send_notification(method, params);
        }
    }
}
