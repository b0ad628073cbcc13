/// Notification history handlers
///
/// The durable side of delivery: whatever was pushed live (or would have
/// been, for offline users) is listed, read-marked and deleted here.
use actix_web::{web, HttpResponse};
use serde::Deserialize;

use crate::auth::AuthUser;
use crate::error::{AppError, Result};
use crate::models::{
    Actor, ListQuery, NewNotification, NotificationKind, NotificationUpdate, UserId,
};
use crate::state::AppState;

/// Request to create and push a notification
#[derive(Debug, Deserialize)]
pub struct CreateNotificationRequest {
    pub user_id: UserId,
    pub title: String,
    pub message: String,
    pub notification_type: NotificationKind,
    #[serde(default)]
    pub related_id: Option<i64>,
    /// Display name of the caller; when set the live frame carries
    /// `applicant_id`/`applicant_name` for the caller
    #[serde(default)]
    pub actor_name: Option<String>,
}

impl CreateNotificationRequest {
    fn into_parts(self, caller: UserId) -> Result<(NewNotification, Option<Actor>)> {
        if self.title.trim().is_empty() {
            return Err(AppError::BadRequest("title must not be empty".to_string()));
        }
        if self.message.trim().is_empty() {
            return Err(AppError::BadRequest("message must not be empty".to_string()));
        }

        let actor = self.actor_name.map(|name| Actor::new(caller, name));
        let new = NewNotification {
            user_id: self.user_id,
            title: self.title,
            message: self.message,
            notification_type: self.notification_type,
            related_id: self.related_id,
        };
        Ok((new, actor))
    }
}

/// Store a notification and push it to the recipient's live sockets
///
/// POST /api/v1/notifications
pub async fn create_notification(
    user: AuthUser,
    state: web::Data<AppState>,
    body: web::Json<CreateNotificationRequest>,
) -> Result<HttpResponse> {
    let (new, actor) = body.into_inner().into_parts(user.id)?;
    let record = state.notifier.publish(new, actor).await?;
    Ok(HttpResponse::Created().json(record))
}

/// List the caller's notifications, newest first
///
/// GET /api/v1/notifications?skip=&limit=&unread_only=
pub async fn list_notifications(
    user: AuthUser,
    state: web::Data<AppState>,
    query: web::Query<ListQuery>,
) -> Result<HttpResponse> {
    let notifications = state.store.list(user.id, &query).await?;
    Ok(HttpResponse::Ok().json(notifications))
}

/// GET /api/v1/notifications/unread-count
pub async fn unread_count(user: AuthUser, state: web::Data<AppState>) -> Result<HttpResponse> {
    let count = state.store.unread_count(user.id).await?;
    Ok(HttpResponse::Ok().json(count))
}

/// GET /api/v1/notifications/{id}
pub async fn get_notification(
    user: AuthUser,
    state: web::Data<AppState>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let notification = state
        .store
        .get(user.id, path.into_inner())
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(HttpResponse::Ok().json(notification))
}

/// Mark one notification read or unread
///
/// PUT /api/v1/notifications/{id}
pub async fn update_notification(
    user: AuthUser,
    state: web::Data<AppState>,
    path: web::Path<i64>,
    body: web::Json<NotificationUpdate>,
) -> Result<HttpResponse> {
    let notification = state
        .store
        .update(user.id, path.into_inner(), &body)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(HttpResponse::Ok().json(notification))
}

/// PUT /api/v1/notifications
pub async fn mark_all_as_read(user: AuthUser, state: web::Data<AppState>) -> Result<HttpResponse> {
    let notifications = state.store.mark_all_read(user.id).await?;
    Ok(HttpResponse::Ok().json(notifications))
}

/// DELETE /api/v1/notifications/{id}
pub async fn delete_notification(
    user: AuthUser,
    state: web::Data<AppState>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    if !state.store.delete(user.id, path.into_inner()).await? {
        return Err(AppError::NotFound);
    }
    Ok(HttpResponse::NoContent().finish())
}

/// DELETE /api/v1/notifications
pub async fn delete_all_notifications(
    user: AuthUser,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let removed = state.store.delete_all(user.id).await?;
    tracing::debug!(user_id = user.id, removed, "cleared notification history");
    Ok(HttpResponse::NoContent().finish())
}

/// Register routes
pub fn register_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/notifications")
            .route("", web::post().to(create_notification))
            .route("", web::get().to(list_notifications))
            .route("", web::put().to(mark_all_as_read))
            .route("", web::delete().to(delete_all_notifications))
            .route("/unread-count", web::get().to(unread_count))
            .route("/{id}", web::get().to(get_notification))
            .route("/{id}", web::put().to(update_notification))
            .route("/{id}", web::delete().to(delete_notification)),
    );
}
