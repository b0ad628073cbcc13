use dotenvy::dotenv;
use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::error::AppError;

const MIN_JWT_SECRET_LEN: usize = 32;

#[derive(Debug, Clone)]
pub struct Config {
    pub app: AppConfig,
    pub database: Option<DatabaseConfig>,
    pub auth: AuthConfig,
    pub websocket: WebSocketConfig,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: String,
    pub port: u16,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
}

#[derive(Debug, Clone)]
pub struct WebSocketConfig {
    /// How often the server pings each client
    pub heartbeat_interval: Duration,
    /// Silence after which a client is considered gone
    pub client_timeout: Duration,
}

impl Default for WebSocketConfig {
    fn default() -> Self {
        Self {
            heartbeat_interval: Duration::from_secs(5),
            client_timeout: Duration::from_secs(30),
        }
    }
}

fn parse_var<T: FromStr>(name: &str, default: T) -> Result<T, AppError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| AppError::Config(format!("{name} is not a valid value: {raw}"))),
        Err(_) => Ok(default),
    }
}

impl Config {
    /// Load configuration from the environment (and `.env` when present)
    ///
    /// Without `DATABASE_URL` the service keeps notifications in memory.
    pub fn from_env() -> Result<Self, AppError> {
        dotenv().ok();

        let app = AppConfig {
            env: env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
            port: parse_var("PORT", 8000)?,
        };

        let database = match env::var("DATABASE_URL") {
            Ok(url) if !url.trim().is_empty() => Some(DatabaseConfig {
                url,
                max_connections: parse_var("DATABASE_MAX_CONNECTIONS", 10)?,
            }),
            _ => None,
        };

        let jwt_secret = env::var("JWT_SECRET")
            .map_err(|_| AppError::Config("JWT_SECRET missing".into()))?;
        if jwt_secret.len() < MIN_JWT_SECRET_LEN {
            return Err(AppError::Config(format!(
                "JWT_SECRET must be at least {MIN_JWT_SECRET_LEN} bytes"
            )));
        }

        let websocket = WebSocketConfig {
            heartbeat_interval: Duration::from_secs(parse_var("WS_HEARTBEAT_INTERVAL_SECS", 5)?),
            client_timeout: Duration::from_secs(parse_var("WS_CLIENT_TIMEOUT_SECS", 30)?),
        };
        if websocket.client_timeout <= websocket.heartbeat_interval {
            return Err(AppError::Config(
                "WS_CLIENT_TIMEOUT_SECS must exceed WS_HEARTBEAT_INTERVAL_SECS".into(),
            ));
        }

        Ok(Config {
            app,
            database,
            auth: AuthConfig { jwt_secret },
            websocket,
        })
    }

    pub fn is_production(&self) -> bool {
        self.app.env.eq_ignore_ascii_case("production")
    }
}
