/// WebSocket handlers for real-time notifications
///
/// `/ws` upgrades an authenticated request into a `WsSession`; the
/// `/api/v1/ws/*` endpoints report registry state and broadcast vote counts.
use actix_web::{web, Error, HttpRequest, HttpResponse};
use actix_web_actors::ws;
use serde::Deserialize;
use serde_json::json;
use tracing::{info, warn};

use crate::auth::{bearer_token, AuthUser};
use crate::error::{AppError, Result};
use crate::models::UserId;
use crate::state::AppState;
use crate::websocket::WsSession;

#[derive(Debug, Deserialize)]
pub struct WsParams {
    pub token: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct VoteUpdateRequest {
    pub business_plan_id: i64,
    pub vote_count: i64,
}

/// Upgrade to a notification socket
///
/// Endpoint: GET /ws?token={jwt} (or `Authorization: Bearer`)
pub async fn ws_index(
    req: HttpRequest,
    stream: web::Payload,
    state: web::Data<AppState>,
    query: web::Query<WsParams>,
) -> std::result::Result<HttpResponse, Error> {
    let token = query
        .token
        .as_deref()
        .or_else(|| bearer_token(&req))
        .ok_or_else(|| {
            warn!("WebSocket connection rejected: no token");
            AppError::Unauthorized
        })?;

    let user_id = state.jwt.verify(token).map_err(|e| {
        warn!("WebSocket connection rejected: invalid token");
        e
    })?;

    let session = WsSession::new(user_id, state.registry.clone(), &state.websocket);
    info!(
        user_id,
        connection_id = %session.connection_id(),
        "WebSocket upgrade accepted"
    );
    ws::start(session, &req, stream)
}

/// Get WebSocket connection status for a user
///
/// Endpoint: GET /api/v1/ws/status/{user_id}
pub async fn ws_status(
    _user: AuthUser,
    path: web::Path<UserId>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let user_id = path.into_inner();
    let connection_count = state.registry.connection_count(user_id).await;

    Ok(HttpResponse::Ok().json(json!({
        "user_id": user_id,
        "connected": connection_count > 0,
        "connection_count": connection_count
    })))
}

/// Get connection metrics
///
/// Endpoint: GET /api/v1/ws/metrics
pub async fn ws_metrics(state: web::Data<AppState>) -> Result<HttpResponse> {
    let total_connections = state.registry.total_connections().await;
    let connected_users = state.registry.connected_users_count().await;

    Ok(HttpResponse::Ok().json(json!({
        "total_connections": total_connections,
        "connected_users": connected_users
    })))
}

/// Get list of all connected user IDs
///
/// Endpoint: GET /api/v1/ws/users
pub async fn list_connected_users(
    _user: AuthUser,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let mut user_ids = state.registry.connected_user_ids().await;
    user_ids.sort_unstable();

    Ok(HttpResponse::Ok().json(json!({
        "count": user_ids.len(),
        "users": user_ids
    })))
}

/// Push a business plan's new vote count to every connected client
///
/// Endpoint: POST /api/v1/ws/broadcast
pub async fn broadcast_vote_update(
    user: AuthUser,
    state: web::Data<AppState>,
    body: web::Json<VoteUpdateRequest>,
) -> Result<HttpResponse> {
    let report = state
        .notifier
        .vote_update(body.business_plan_id, body.vote_count)
        .await?;

    info!(
        user_id = user.id,
        business_plan_id = body.business_plan_id,
        delivered = report.delivered,
        "vote update broadcast"
    );
    Ok(HttpResponse::Ok().json(report))
}

/// Register WebSocket routes
pub fn register_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/ws", web::get().to(ws_index)).service(
        web::scope("/api/v1/ws")
            .route("/status/{user_id}", web::get().to(ws_status))
            .route("/metrics", web::get().to(ws_metrics))
            .route("/users", web::get().to(list_connected_users))
            .route("/broadcast", web::post().to(broadcast_vote_update)),
    );
}
