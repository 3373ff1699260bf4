use bevy::prelude::*;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use super::protocol::OutgoingMessage;

/// Raw messages posted by the host page. Filled from the browser event loop,
/// drained once per frame.
#[derive(Resource, Clone, Default)]
pub struct HostInbox(Arc<Mutex<VecDeque<String>>>);

impl HostInbox {
    pub fn push(&self, message: String) {
        match self.0.lock() {
            Ok(mut queue) => queue.push_back(message),
            Err(_) => error!("Host inbox poisoned, dropping message"),
        }
    }

    pub fn drain(&self) -> Vec<String> {
        self.0
            .lock()
            .map(|mut queue| queue.drain(..).collect())
            .unwrap_or_default()
    }
}

/// Forward `message` events of the page window into the inbox.
#[cfg(target_arch = "wasm32")]
pub fn install_host_listener(inbox: Res<HostInbox>) {
    use wasm_bindgen::JsCast;
    use wasm_bindgen::prelude::Closure;
    use web_sys::MessageEvent;

    let Some(window) = web_sys::window() else {
        error!("No browser window, host bridge disabled");
        return;
    };

    let inbox = HostInbox::clone(&inbox);
    let on_message = Closure::<dyn FnMut(MessageEvent)>::new(move |event: MessageEvent| {
        let Ok(text) = event.data().dyn_into::<js_sys::JsString>() else {
            return;
        };
        let text = String::from(text);
        if text.contains("jsonrpc") {
            inbox.push(text);
        }
    });

    if let Err(err) =
        window.add_event_listener_with_callback("message", on_message.as_ref().unchecked_ref())
    {
        error!("Failed to register host message listener: {:?}", err);
        return;
    }
    // Owned by the page from here on.
    on_message.forget();
}

#[cfg(not(target_arch = "wasm32"))]
pub fn install_host_listener() {}

/// Post one message to the parent frame.
pub fn post_to_host(message: &OutgoingMessage) {
    #[cfg(target_arch = "wasm32")]
    {
        let json = match serde_json::to_string(message) {
            Ok(json) => json,
            Err(err) => {
                error!("Unserialisable RPC message: {}", err);
                return;
            }
        };
        let Some(parent) = web_sys::window().and_then(|window| window.parent().ok().flatten())
        else {
            warn!("No host frame to receive RPC message");
            return;
        };
        if let Err(err) = parent.post_message(&wasm_bindgen::JsValue::from_str(&json), "*") {
            error!("postMessage to host failed: {:?}", err);
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    let _ = message;
}
