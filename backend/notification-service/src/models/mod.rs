use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// User identifier issued by the authentication system
pub type UserId = i64;

/// Notification type tag
///
/// Closed set of the kinds the ideathon producers emit. Tags outside the set
/// are kept verbatim in `Unknown` so newer producers do not break older readers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum NotificationKind {
    /// Someone voted for the recipient's business plan
    Vote,
    /// Someone joined the recipient's PoC team
    TeamJoin,
    /// Someone left the recipient's PoC team
    TeamLeave,
    /// The recipient was removed from a PoC team
    TeamRemove,
    /// The recipient's business plan was selected
    Selection,
    /// Someone applied to join the recipient's business plan
    Application,
    /// Any tag this build does not know about
    Unknown(String),
}

impl NotificationKind {
    pub fn as_str(&self) -> &str {
        match self {
            NotificationKind::Vote => "vote",
            NotificationKind::TeamJoin => "team_join",
            NotificationKind::TeamLeave => "team_leave",
            NotificationKind::TeamRemove => "team_remove",
            NotificationKind::Selection => "selection",
            NotificationKind::Application => "application_request",
            NotificationKind::Unknown(tag) => tag.as_str(),
        }
    }
}

impl From<String> for NotificationKind {
    fn from(tag: String) -> Self {
        match tag.as_str() {
            "vote" => NotificationKind::Vote,
            "team_join" => NotificationKind::TeamJoin,
            "team_leave" => NotificationKind::TeamLeave,
            "team_remove" => NotificationKind::TeamRemove,
            "selection" => NotificationKind::Selection,
            "application_request" | "application" => NotificationKind::Application,
            _ => NotificationKind::Unknown(tag),
        }
    }
}

impl From<&str> for NotificationKind {
    fn from(tag: &str) -> Self {
        NotificationKind::from(tag.to_string())
    }
}

impl From<NotificationKind> for String {
    fn from(kind: NotificationKind) -> Self {
        match kind {
            NotificationKind::Unknown(tag) => tag,
            other => other.as_str().to_string(),
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Durable notification as stored and returned by the history API
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NotificationRecord {
    pub id: i64,
    pub user_id: UserId,
    pub title: String,
    pub message: String,
    pub notification_type: NotificationKind,
    pub related_id: Option<i64>,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

/// Notification to persist; the store assigns id, read flag and timestamp
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewNotification {
    pub user_id: UserId,
    pub title: String,
    pub message: String,
    pub notification_type: NotificationKind,
    pub related_id: Option<i64>,
}

/// Partial update sent by the recipient
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NotificationUpdate {
    pub is_read: Option<bool>,
}

pub const DEFAULT_PAGE_SIZE: i64 = 100;

/// History query parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub skip: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub unread_only: bool,
}

fn default_limit() -> i64 {
    DEFAULT_PAGE_SIZE
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            skip: 0,
            limit: DEFAULT_PAGE_SIZE,
            unread_only: false,
        }
    }
}

impl ListQuery {
    /// Offset and page size clamped to sane bounds
    pub fn window(&self) -> (i64, i64) {
        (self.skip.max(0), self.limit.clamp(1, DEFAULT_PAGE_SIZE))
    }
}

/// The user whose action triggered a notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub id: UserId,
    pub name: String,
}

impl Actor {
    pub fn new(id: UserId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_kinds_use_wire_tags() {
        assert_eq!(NotificationKind::Vote.as_str(), "vote");
        assert_eq!(NotificationKind::TeamRemove.as_str(), "team_remove");
        assert_eq!(
            serde_json::to_string(&NotificationKind::Application).unwrap(),
            "\"application_request\""
        );
    }

    #[test]
    fn test_application_alias() {
        let kind: NotificationKind = serde_json::from_str("\"application\"").unwrap();
        assert_eq!(kind, NotificationKind::Application);
    }

    #[test]
    fn test_unknown_kind_is_preserved() {
        let kind: NotificationKind = serde_json::from_str("\"hackathon_reminder\"").unwrap();
        assert_eq!(kind, NotificationKind::Unknown("hackathon_reminder".to_string()));
        assert_eq!(
            serde_json::to_string(&kind).unwrap(),
            "\"hackathon_reminder\""
        );
    }

    #[test]
    fn test_list_query_defaults_and_clamp() {
        let query: ListQuery = serde_json::from_str("{}").unwrap();
        assert_eq!(query.window(), (0, 100));

        let query = ListQuery {
            skip: -5,
            limit: 1000,
            unread_only: true,
        };
        assert_eq!(query.window(), (0, 100));

        let query = ListQuery {
            skip: 10,
            limit: 0,
            unread_only: false,
        };
        assert_eq!(query.window(), (10, 1));
    }
}
