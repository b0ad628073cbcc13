/// Notification Dispatcher
///
/// Pushes encoded payloads to live connections taken from the registry.
/// The caller persists the underlying record first; an offline user is a
/// deliberate no-op because the record stays retrievable from history.
///
/// Payloads are encoded once per call. Sends run after the registry guard
/// is released, so a slow client never stalls connect or disconnect.
use futures::future::join_all;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

use super::messages::DispatchPayload;
use super::registry::{ConnectionRegistry, SharedConnection};
use crate::metrics;
use crate::models::UserId;

/// Every `DispatchPayload` variant currently encodes infallibly, so this
/// is unreachable today; it is kept for payloads with fallible fields.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// Producer bug; raised before any send is attempted
    #[error("failed to encode {payload_type} payload: {source}")]
    Serialize {
        payload_type: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// Outcome of one fan-out
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DispatchReport {
    pub attempted: usize,
    pub delivered: usize,
    pub failed: usize,
}

impl DispatchReport {
    /// No connection was found, nothing was sent
    pub fn is_offline(&self) -> bool {
        self.attempted == 0
    }
}

#[derive(Clone)]
pub struct NotificationDispatcher {
    registry: ConnectionRegistry,
}

impl NotificationDispatcher {
    pub fn new(registry: ConnectionRegistry) -> Self {
        Self { registry }
    }

    /// Push `payload` to every live connection of `user_id`
    ///
    /// Per-connection failures are logged and counted, never returned.
    /// Stale connections are left for the transport's own receive loop
    /// to disconnect.
    pub async fn notify_user(
        &self,
        user_id: UserId,
        payload: &DispatchPayload,
    ) -> Result<DispatchReport, DispatchError> {
        let payload_type = payload.payload_type();
        let text = encode(payload)?;

        let targets = self.registry.connections_for(user_id).await;
        if targets.is_empty() {
            debug!(user_id, payload_type, "user offline, skipping live push");
            return Ok(DispatchReport::default());
        }

        let report = fan_out(&targets, &text, payload_type, Some(user_id)).await;
        debug!(
            user_id,
            payload_type,
            delivered = report.delivered,
            failed = report.failed,
            "notification pushed"
        );
        Ok(report)
    }

    /// Push `payload` to every connection currently registered
    ///
    /// Connections registered after the snapshot is taken are not reached.
    pub async fn broadcast(&self, payload: &DispatchPayload) -> Result<DispatchReport, DispatchError> {
        let payload_type = payload.payload_type();
        let text = encode(payload)?;

        let targets = self.registry.all_connections().await;
        let report = fan_out(&targets, &text, payload_type, None).await;
        debug!(
            payload_type,
            attempted = report.attempted,
            failed = report.failed,
            "broadcast pushed"
        );
        Ok(report)
    }
}

fn encode(payload: &DispatchPayload) -> Result<String, DispatchError> {
    payload.to_json().map_err(|source| DispatchError::Serialize {
        payload_type: payload.payload_type(),
        source,
    })
}

async fn fan_out(
    targets: &[SharedConnection],
    text: &str,
    payload_type: &'static str,
    user_id: Option<UserId>,
) -> DispatchReport {
    let results = join_all(targets.iter().map(|conn| async move {
        (conn.id(), conn.send_text(text).await)
    }))
    .await;

    let mut report = DispatchReport {
        attempted: targets.len(),
        ..Default::default()
    };

    for (connection_id, result) in results {
        match result {
            Ok(()) => {
                report.delivered += 1;
                metrics::record_push(payload_type, metrics::PushOutcome::Delivered);
            }
            Err(e) => {
                report.failed += 1;
                metrics::record_push(payload_type, metrics::PushOutcome::Failed);
                warn!(
                    user_id = ?user_id,
                    connection_id = %connection_id,
                    payload_type,
                    error = %e,
                    "failed to push to connection"
                );
            }
        }
    }

    report
}
