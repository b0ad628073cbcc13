/// Notifications raised by ideathon actions
///
/// Each constructor builds the record for the user who should hear about
/// the action; persistence and delivery are the `Notifier`'s job.
use crate::models::{NewNotification, NotificationKind, UserId};

/// Someone voted for `recipient`'s business plan
pub fn vote_cast(recipient: UserId, voter_name: &str, plan_title: &str, plan_id: i64) -> NewNotification {
    NewNotification {
        user_id: recipient,
        title: "New Vote".to_string(),
        message: format!("{voter_name} voted for your business plan: {plan_title}"),
        notification_type: NotificationKind::Vote,
        related_id: Some(plan_id),
    }
}

/// Someone joined `recipient`'s PoC team
pub fn team_joined(recipient: UserId, member_name: &str, poc_title: &str, poc_id: i64) -> NewNotification {
    NewNotification {
        user_id: recipient,
        title: "New Team Member".to_string(),
        message: format!("{member_name} joined your PoC team for: {poc_title}"),
        notification_type: NotificationKind::TeamJoin,
        related_id: Some(poc_id),
    }
}

/// Someone left `recipient`'s PoC team
pub fn team_left(recipient: UserId, member_name: &str, poc_title: &str, poc_id: i64) -> NewNotification {
    NewNotification {
        user_id: recipient,
        title: "Team Member Left".to_string(),
        message: format!("{member_name} left your PoC team for: {poc_title}"),
        notification_type: NotificationKind::TeamLeave,
        related_id: Some(poc_id),
    }
}

/// `recipient` was removed from a PoC team
pub fn team_member_removed(recipient: UserId, poc_title: &str, poc_id: i64) -> NewNotification {
    NewNotification {
        user_id: recipient,
        title: "Removed from Team".to_string(),
        message: format!("You have been removed from the PoC team for: {poc_title}"),
        notification_type: NotificationKind::TeamRemove,
        related_id: Some(poc_id),
    }
}

/// `recipient`'s business plan was selected for the next phase
pub fn plan_selected(recipient: UserId, plan_title: &str, plan_id: i64) -> NewNotification {
    NewNotification {
        user_id: recipient,
        title: "Business Plan Selected".to_string(),
        message: format!("Your business plan '{plan_title}' has been selected for the next phase!"),
        notification_type: NotificationKind::Selection,
        related_id: Some(plan_id),
    }
}

/// Someone asked to join `recipient`'s business plan
///
/// Publish together with the applicant as `Actor` so the live frame
/// carries `applicant_id` and `applicant_name`.
pub fn application_requested(
    recipient: UserId,
    applicant_name: &str,
    plan_title: &str,
    plan_id: i64,
) -> NewNotification {
    NewNotification {
        user_id: recipient,
        title: "New Application".to_string(),
        message: format!("{applicant_name} would like to join your business plan \"{plan_title}\"."),
        notification_type: NotificationKind::Application,
        related_id: Some(plan_id),
    }
}
