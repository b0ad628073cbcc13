use std::sync::Arc;

use crate::auth::JwtVerifier;
use crate::config::WebSocketConfig;
use crate::services::{NotificationStore, Notifier};
use crate::websocket::{ConnectionRegistry, NotificationDispatcher};

/// Shared handles for every request handler and WebSocket session
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn NotificationStore>,
    pub registry: ConnectionRegistry,
    pub notifier: Notifier,
    pub jwt: Arc<JwtVerifier>,
    pub websocket: WebSocketConfig,
}

impl AppState {
    /// Wire a fresh registry and a notifier dispatching over it
    pub fn new(
        store: Arc<dyn NotificationStore>,
        jwt: JwtVerifier,
        websocket: WebSocketConfig,
    ) -> Self {
        let registry = ConnectionRegistry::new();
        let notifier = Notifier::new(store.clone(), NotificationDispatcher::new(registry.clone()));

        Self {
            store,
            registry,
            notifier,
            jwt: Arc::new(jwt),
            websocket,
        }
    }
}
