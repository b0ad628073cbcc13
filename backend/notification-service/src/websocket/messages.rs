/// WebSocket message types for real-time notifications
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{Actor, NotificationKind, NotificationRecord, UserId};

/// Frames pushed from the server to connected clients
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DispatchPayload {
    /// A durable notification was stored for the recipient
    NewNotification { notification_data: NotificationData },

    /// A business plan's vote count changed; sent to every viewer
    VoteUpdate {
        business_plan_id: i64,
        vote_count: i64,
    },
}

/// Body of a `new_notification` frame
///
/// Mirrors the stored record so the client can render it without a
/// follow-up fetch. `applicant_*` are only set for application requests.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NotificationData {
    pub id: i64,
    pub title: String,
    pub message: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
    pub notification_type: NotificationKind,
    pub related_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub applicant_id: Option<UserId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub applicant_name: Option<String>,
}

impl NotificationData {
    pub fn from_record(record: &NotificationRecord, actor: Option<&Actor>) -> Self {
        Self {
            id: record.id,
            title: record.title.clone(),
            message: record.message.clone(),
            is_read: record.is_read,
            created_at: record.created_at,
            notification_type: record.notification_type.clone(),
            related_id: record.related_id,
            applicant_id: actor.map(|a| a.id),
            applicant_name: actor.map(|a| a.name.clone()),
        }
    }
}

impl DispatchPayload {
    /// Create a `new_notification` frame for a stored record
    pub fn new_notification(record: &NotificationRecord, actor: Option<&Actor>) -> Self {
        DispatchPayload::NewNotification {
            notification_data: NotificationData::from_record(record, actor),
        }
    }

    /// Create a `vote_update` frame
    pub fn vote_update(business_plan_id: i64, vote_count: i64) -> Self {
        DispatchPayload::VoteUpdate {
            business_plan_id,
            vote_count,
        }
    }

    /// Wire discriminator, also used as a log field and metric label
    pub fn payload_type(&self) -> &'static str {
        match self {
            DispatchPayload::NewNotification { .. } => "new_notification",
            DispatchPayload::VoteUpdate { .. } => "vote_update",
        }
    }

    /// Serialize to JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
