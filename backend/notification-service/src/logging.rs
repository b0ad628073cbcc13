use tracing_subscriber::{fmt, EnvFilter};

/// Install the global subscriber; `RUST_LOG` overrides the default filter.
/// Production emits JSON lines.
pub fn init_tracing(json: bool) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn,actix_web=info"));

    let builder = fmt().with_env_filter(env_filter).with_target(false);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}
