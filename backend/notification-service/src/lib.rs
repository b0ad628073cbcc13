pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod services;
pub mod state;
pub mod websocket;

pub use config::Config;
pub use error::{AppError, Result};
pub use services::{Notifier, NotificationStore};
pub use state::AppState;
pub use websocket::{ConnectionRegistry, DispatchPayload, NotificationDispatcher};

use actix_web::web;

/// Mount every route the service exposes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(|| async { "OK" }))
        .route("/metrics", web::get().to(metrics::serve_metrics));
    handlers::register_notifications(cfg);
    handlers::register_websocket(cfg);
}
