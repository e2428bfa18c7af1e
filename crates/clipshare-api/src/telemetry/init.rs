use tracing_subscriber::{
    fmt::format::Format, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};

/// Initialize tracing.
///
/// Compact console output by default; `LOG_FORMAT=json` emits one JSON object per event.
/// Calling this more than once keeps the first subscriber.
pub fn init_telemetry(environment: &str) {
    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let console_fmt = (!json).then(|| {
        tracing_subscriber::fmt::layer().event_format(
            Format::default()
                .compact()
                .with_target(false)
                .without_time(),
        )
    });
    let json_fmt = json.then(|| tracing_subscriber::fmt::layer().json());

    let result = tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "clipshare=debug,tower_http=debug".into()),
        )
        .with(console_fmt)
        .with(json_fmt)
        .try_init();

    match result {
        Ok(()) => tracing::info!(environment = %environment, json, "Tracing initialized"),
        Err(_) => tracing::debug!("Tracing subscriber already installed"),
    }
}
