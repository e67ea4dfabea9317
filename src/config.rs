use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Base URL of the camera device, e.g. "http://192.168.1.50:9000".
    pub device_url: String,
    /// Port the panel's own web interface listens on.
    pub web_port: u16,

    pub request_timeout_ms: u64,
    pub connect_timeout_ms: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            device_url: "http://127.0.0.1:9000".to_string(),
            web_port: 8080,
            request_timeout_ms: 5000,
            connect_timeout_ms: 2000,
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        // Try to load from config.json first
        if let Ok(config_str) = fs::read_to_string("config.json") {
            let config: AppConfig = serde_json::from_str(&config_str)?;
            return Ok(config);
        }

        // Fall back to default configuration
        tracing::warn!("config.json not found, using default configuration");
        Ok(AppConfig::default())
    }

    pub fn save(&self) -> Result<()> {
        let config_str = serde_json::to_string_pretty(self)?;
        fs::write("config.json", config_str)?;
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }
}
