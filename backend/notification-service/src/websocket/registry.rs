/// WebSocket Connection Registry
///
/// Tracks which live connections belong to which user in this process.
/// Supports:
/// - Multiple concurrent connections per user
/// - Idempotent disconnection (close and error paths may both report it)
/// - Point-in-time snapshots for fan-out outside the lock
///
/// Every operation takes the same mutex over the whole map. The guard is
/// never held across network I/O: callers receive a copied snapshot and
/// send after the guard is released.
use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{mpsc, Mutex};
use tracing::debug;
use uuid::Uuid;

use crate::metrics;
use crate::models::UserId;

/// Unique identifier for one live connection
///
/// A reconnecting client presents a new connection with a new id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Failure to push a frame to one connection
#[derive(Debug, Error)]
pub enum SendError {
    #[error("connection closed")]
    Closed,

    #[error("transport error: {0}")]
    Transport(String),
}

/// One open, message-framed channel to a client process
#[async_trait]
pub trait Connection: Send + Sync {
    fn id(&self) -> ConnectionId;

    /// Push one UTF-8 text frame
    async fn send_text(&self, text: &str) -> Result<(), SendError>;
}

pub type SharedConnection = Arc<dyn Connection>;

/// Connection backed by an unbounded channel
///
/// Whoever holds the receiver owns the socket; dropping it makes every
/// later send fail with `SendError::Closed`.
pub struct ChannelConnection {
    id: ConnectionId,
    sender: mpsc::UnboundedSender<String>,
}

impl ChannelConnection {
    pub fn new(sender: mpsc::UnboundedSender<String>) -> Self {
        Self {
            id: ConnectionId::new(),
            sender,
        }
    }

    /// Create a connection together with the receiving end of its channel
    pub fn pair() -> (Arc<Self>, mpsc::UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Arc::new(Self::new(tx)), rx)
    }
}

#[async_trait]
impl Connection for ChannelConnection {
    fn id(&self) -> ConnectionId {
        self.id
    }

    async fn send_text(&self, text: &str) -> Result<(), SendError> {
        self.sender
            .send(text.to_owned())
            .map_err(|_| SendError::Closed)
    }
}

#[derive(Default)]
struct RegistryState {
    /// user_id -> live connections; never holds an empty Vec
    by_user: HashMap<UserId, Vec<SharedConnection>>,
    /// connection_id -> owning user
    owners: HashMap<ConnectionId, UserId>,
}

impl RegistryState {
    fn remove(&mut self, connection_id: ConnectionId, user_id: UserId) -> bool {
        let Some(connections) = self.by_user.get_mut(&user_id) else {
            return false;
        };

        let before = connections.len();
        connections.retain(|c| c.id() != connection_id);
        let removed = connections.len() != before;

        if connections.is_empty() {
            self.by_user.remove(&user_id);
        }
        if removed {
            self.owners.remove(&connection_id);
        }
        removed
    }
}

/// Registry of live connections, keyed by user
///
/// Cheap to clone; clones share the same state. Construct one per server
/// and hand it to the transport and the dispatcher.
#[derive(Clone, Default)]
pub struct ConnectionRegistry {
    inner: Arc<Mutex<RegistryState>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `connection` under `user_id`
    ///
    /// Registering the same connection twice for one user is a no-op. A
    /// connection filed under another user is moved, so it never appears
    /// under two users at once.
    pub async fn connect(&self, connection: SharedConnection, user_id: UserId) {
        let connection_id = connection.id();
        let mut guard = self.inner.lock().await;

        if let Some(previous) = guard.owners.get(&connection_id).copied() {
            if previous == user_id {
                return;
            }
            guard.remove(connection_id, previous);
        }

        guard.owners.insert(connection_id, user_id);
        guard.by_user.entry(user_id).or_default().push(connection);

        let total = guard.owners.len();
        debug!(
            user_id,
            connection_id = %connection_id,
            user_connections = guard.by_user.get(&user_id).map(|v| v.len()).unwrap_or(0),
            total,
            "connection registered"
        );
        metrics::set_active_connections(total);
    }

    /// Remove `connection_id` from `user_id`'s set
    ///
    /// Returns whether anything was removed. Unknown pairs are a no-op.
    pub async fn disconnect(&self, connection_id: ConnectionId, user_id: UserId) -> bool {
        let mut guard = self.inner.lock().await;
        let removed = guard.remove(connection_id, user_id);

        if removed {
            let total = guard.owners.len();
            debug!(
                user_id,
                connection_id = %connection_id,
                online = guard.by_user.contains_key(&user_id),
                total,
                "connection removed"
            );
            metrics::set_active_connections(total);
        }
        removed
    }

    pub async fn is_online(&self, user_id: UserId) -> bool {
        self.inner.lock().await.by_user.contains_key(&user_id)
    }

    /// Snapshot of `user_id`'s live connections
    pub async fn connections_for(&self, user_id: UserId) -> Vec<SharedConnection> {
        let guard = self.inner.lock().await;
        guard.by_user.get(&user_id).cloned().unwrap_or_default()
    }

    /// Snapshot of every live connection across all users
    pub async fn all_connections(&self) -> Vec<SharedConnection> {
        let guard = self.inner.lock().await;
        guard.by_user.values().flatten().cloned().collect()
    }

    pub async fn connection_count(&self, user_id: UserId) -> usize {
        let guard = self.inner.lock().await;
        guard.by_user.get(&user_id).map(|v| v.len()).unwrap_or(0)
    }

    pub async fn total_connections(&self) -> usize {
        self.inner.lock().await.owners.len()
    }

    pub async fn connected_users_count(&self) -> usize {
        self.inner.lock().await.by_user.len()
    }

    pub async fn connected_user_ids(&self) -> Vec<UserId> {
        let guard = self.inner.lock().await;
        guard.by_user.keys().copied().collect()
    }
}
