//! Event router: normalizes raw updates and dispatches them to handlers.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::client::ClientHandle;
use crate::handler::EventHandler;
use crate::normalizer;

/// Owns the ordered list of registered handlers. Per update: normalize,
/// then run every handler whose `can_handle` accepts the event, isolating
/// per-handler failures.
#[derive(Default)]
pub struct EventRouter {
    handlers: Vec<Arc<dyn EventHandler>>,
}

impl EventRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a handler. Dispatch order is insertion order.
    pub fn add_handler(&mut self, handler: Arc<dyn EventHandler>) {
        info!(handler = handler.name(), "registered handler");
        self.handlers.push(handler);
    }

    /// Single entry point per inbound update. Dropped (unrecognized)
    /// updates are expected and harmless; nothing is surfaced upward.
    pub async fn route(&self, update: Value, client: ClientHandle) {
        let Some(event) = normalizer::normalize(&update, &client).await else {
            warn!(update = %compact(&update), "could not normalize update");
            return;
        };

        debug!(kind = event.kind(), "routing event");

        for handler in &self.handlers {
            if !handler.can_handle(&event) {
                continue;
            }
            if let Err(e) = handler.handle(&event).await {
                // One handler failing must not block the rest of the pass.
                error!(handler = handler.name(), error = %e, "handler failed");
            }
        }
    }
}

/// Truncated single-line rendering of a raw update for warn logs.
fn compact(update: &Value) -> String {
    let s = update.to_string();
    if s.chars().count() > 200 {
        let mut truncated: String = s.chars().take(200).collect();
        truncated.push_str("...");
        return truncated;
    }
    s
}
