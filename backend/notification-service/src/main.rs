use actix_web::{middleware, web, App, HttpServer};
use anyhow::Context;
use ideathon_notification_service::{
    auth::JwtVerifier,
    configure, logging, metrics,
    services::{InMemoryNotificationStore, NotificationStore, PgNotificationStore},
    AppState, Config,
};
use std::sync::Arc;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env().context("failed to load configuration")?;
    logging::init_tracing(config.is_production());

    tracing::info!(env = %config.app.env, "Starting notification service");

    let store: Arc<dyn NotificationStore> = match &config.database {
        Some(db) => {
            let store = PgNotificationStore::connect(&db.url, db.max_connections)
                .await
                .context("failed to connect to database")?;
            store.migrate().await.context("failed to run migrations")?;
            Arc::new(store)
        }
        None => {
            tracing::warn!("DATABASE_URL not set, notifications are kept in memory only");
            Arc::new(InMemoryNotificationStore::new())
        }
    };

    let state = AppState::new(
        store,
        JwtVerifier::new(&config.auth.jwt_secret),
        config.websocket.clone(),
    );
    tracing::info!("WebSocket connection registry initialized");

    let addr = format!("0.0.0.0:{}", config.app.port);
    tracing::info!("Starting HTTP server on {}", addr);

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(state.clone()))
            .wrap(middleware::Logger::default())
            .wrap(metrics::MetricsMiddleware)
            .route("/", web::get().to(|| async { "Ideathon Notification Service v1.0" }))
            .configure(configure)
    })
    .bind(&addr)
    .with_context(|| format!("failed to bind {addr}"))?
    .run()
    .await
    .context("HTTP server error")
}
