#![allow(dead_code)]

use ideathon_notification_service::auth::{Claims, JwtVerifier};
use ideathon_notification_service::config::WebSocketConfig;
use ideathon_notification_service::services::InMemoryNotificationStore;
use ideathon_notification_service::AppState;
use jsonwebtoken::{encode, EncodingKey, Header};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

pub const JWT_SECRET: &str = "test-secret-key-min-32-chars-long!!!";

pub fn token_for(user_id: i64) -> String {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs();
    let claims = Claims {
        sub: user_id.to_string(),
        exp: now + 3600,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(JWT_SECRET.as_bytes()),
    )
    .expect("Failed to encode JWT")
}

pub fn bearer(user_id: i64) -> (&'static str, String) {
    ("Authorization", format!("Bearer {}", token_for(user_id)))
}

/// State with an in-memory store and a quiet heartbeat
pub fn test_state() -> AppState {
    AppState::new(
        Arc::new(InMemoryNotificationStore::new()),
        JwtVerifier::new(JWT_SECRET),
        WebSocketConfig {
            heartbeat_interval: Duration::from_secs(60),
            client_timeout: Duration::from_secs(120),
        },
    )
}
