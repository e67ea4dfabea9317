use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::client::DeviceClient;
use crate::config::AppConfig;
use crate::panel::ControlPanel;

mod client;
mod config;
mod controls;
mod panel;
mod status;
mod telemetry;
mod web;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // Initialize telemetry
    telemetry::init_telemetry();

    // Load configuration
    let config = AppConfig::load()?;
    info!("⚙️ Configuration loaded: {:?}", config);

    // Build the device client and the panel
    let client = DeviceClient::new(
        &config.device_url,
        config.request_timeout(),
        config.connect_timeout(),
    )?;
    let mut panel = ControlPanel::new(client);

    // Initial status load. A failure leaves the panel unloaded; the web
    // interface reports that and a later refresh performs the first load.
    match panel.load().await {
        Ok(()) => info!("📷 Connected to camera at {}", config.device_url),
        Err(e) => warn!(
            "Initial status load from {} failed, panel stays unloaded: {}",
            config.device_url, e
        ),
    }

    let panel = Arc::new(RwLock::new(panel));

    // Serve the panel web interface
    web::start_web_server(panel, config.web_port).await?;

    Ok(())
}
