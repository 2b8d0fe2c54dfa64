//! Lifecycle registry for multiple concurrent client connections.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{info, warn};

use crate::client::TelegramClient;

/// Holds named clients and starts/stops them as a group. Each client's
/// start/stop is attempted independently; one failure never blocks the
/// others.
#[derive(Default)]
pub struct ClientManager {
    clients: HashMap<String, Arc<dyn TelegramClient>>,
}

impl ClientManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a client under a name. Duplicate names are skipped.
    pub fn add_client(&mut self, name: &str, client: Arc<dyn TelegramClient>) {
        if self.clients.contains_key(name) {
            warn!(name, "client with this name already exists, skipping");
            return;
        }
        self.clients.insert(name.to_string(), client);
        info!(name, "added client");
    }

    pub async fn start_all(&self) {
        for (name, client) in &self.clients {
            if client.start().await {
                info!(name, "started client");
            } else {
                warn!(name, "failed to start client");
            }
        }
        info!("all clients have been started");
    }

    pub async fn stop_all(&self) {
        for (name, client) in &self.clients {
            if client.stop().await {
                info!(name, "stopped client");
            } else {
                warn!(name, "failed to stop client");
            }
        }
        info!("all clients have been stopped");
    }

    pub fn get_client(&self, name: &str) -> Option<Arc<dyn TelegramClient>> {
        let client = self.clients.get(name).cloned();
        if client.is_none() {
            warn!(name, "client not found");
        }
        client
    }

    /// Iterates over all registered clients.
    pub fn clients(&self) -> impl Iterator<Item = (&String, &Arc<dyn TelegramClient>)> {
        self.clients.iter()
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }
}
