use tracing::info;
use tracing_subscriber::EnvFilter;

/// Initialize telemetry with debug logging
pub fn init_telemetry() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,lapse_panel=debug"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .init();

    info!("📊 Telemetry initialized");
}
