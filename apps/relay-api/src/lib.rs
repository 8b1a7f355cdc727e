pub mod config;
pub mod error;
pub mod relay;
pub mod routes;

use std::sync::Arc;

use config::Config;
use relay::fanout::RelayBroadcast;
use relay::registry::SubscriberRegistry;

/// Shared application state available to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub registry: Arc<SubscriberRegistry>,
    pub broadcast: RelayBroadcast,
}

impl AppState {
    /// Build the subscriber registry and dispatcher for a process.
    pub fn new(config: Config) -> Self {
        let registry = Arc::new(SubscriberRegistry::new(config.queue_capacity));
        let broadcast = RelayBroadcast::new(registry.clone());
        Self {
            config: Arc::new(config),
            registry,
            broadcast,
        }
    }
}
