/// Producer-facing entry point
///
/// Persists first, pushes second: by the time a client sees a
/// `new_notification` frame the record is already in history, and an
/// offline recipient finds it there on the next fetch.
use std::sync::Arc;
use tracing::info;

use super::store::NotificationStore;
use crate::error::Result;
use crate::models::{Actor, NewNotification, NotificationRecord};
use crate::websocket::{DispatchError, DispatchPayload, DispatchReport, NotificationDispatcher};

#[derive(Clone)]
pub struct Notifier {
    store: Arc<dyn NotificationStore>,
    dispatcher: NotificationDispatcher,
}

impl Notifier {
    pub fn new(store: Arc<dyn NotificationStore>, dispatcher: NotificationDispatcher) -> Self {
        Self { store, dispatcher }
    }

    /// Store `new` and push it to the recipient's live connections
    ///
    /// `actor` is the user whose action raised the notification; it is only
    /// copied into the live frame, never stored.
    pub async fn publish(
        &self,
        new: NewNotification,
        actor: Option<Actor>,
    ) -> Result<NotificationRecord> {
        let record = self.store.insert(new).await?;

        let payload = DispatchPayload::new_notification(&record, actor.as_ref());
        let report = self.dispatcher.notify_user(record.user_id, &payload).await?;

        info!(
            notification_id = record.id,
            user_id = record.user_id,
            notification_type = %record.notification_type,
            live_deliveries = report.delivered,
            "notification published"
        );
        Ok(record)
    }

    /// Tell every connected viewer a plan's vote count changed
    pub async fn vote_update(
        &self,
        business_plan_id: i64,
        vote_count: i64,
    ) -> std::result::Result<DispatchReport, DispatchError> {
        self.dispatcher
            .broadcast(&DispatchPayload::vote_update(business_plan_id, vote_count))
            .await
    }
}
