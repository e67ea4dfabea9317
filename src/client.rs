use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use reqwest::{Client, StatusCode};
use thiserror::Error;
use tracing::debug;

use crate::status::{Patch, StatusDocument};

/// Errors from talking to the camera device.
///
/// The original panel fired requests and never looked back; every failure is
/// still observable here so callers can decide to ignore it.
#[derive(Debug, Error)]
pub enum DeviceError {
    #[error("cannot connect to {0}")]
    Connection(String),
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("device returned status {0}")]
    Status(StatusCode),
    #[error("failed to decode status document: {0}")]
    Decode(String),
}

/// HTTP client for one camera device.
pub struct DeviceClient {
    http: Client,
    base_url: String,
    last_cache_buster: AtomicU64,
}

impl DeviceClient {
    /// Create a client for the device at `base_url` (no trailing slash needed).
    pub fn new(
        base_url: &str,
        request_timeout: Duration,
        connect_timeout: Duration,
    ) -> Result<Self, DeviceError> {
        let http = Client::builder()
            .timeout(request_timeout)
            .connect_timeout(connect_timeout)
            .build()
            .map_err(DeviceError::Http)?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            last_cache_buster: AtomicU64::new(0),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    /// Fetch the device's status document.
    pub async fn load_status(&self) -> Result<StatusDocument, DeviceError> {
        let response = self
            .http
            .get(self.endpoint("status"))
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        if !response.status().is_success() {
            return Err(DeviceError::Status(response.status()));
        }

        response
            .json::<StatusDocument>()
            .await
            .map_err(|e| DeviceError::Decode(e.to_string()))
    }

    /// Push a one-field patch to the device root. The response body is ignored.
    pub async fn send_patch(&self, patch: &Patch) -> Result<(), DeviceError> {
        debug!("📤 Sending patch: {}", patch.body());
        let response = self
            .http
            .post(format!("{}/", self.base_url))
            .json(patch)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        if !response.status().is_success() {
            return Err(DeviceError::Status(response.status()));
        }
        Ok(())
    }

    /// Ask the device to shut down. No payload, response ignored.
    pub async fn shutdown(&self) -> Result<(), DeviceError> {
        let response = self
            .http
            .get(self.endpoint("shutdown"))
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        if !response.status().is_success() {
            return Err(DeviceError::Status(response.status()));
        }
        Ok(())
    }

    /// MJPEG stream URL with a fresh cache-buster.
    ///
    /// The buster starts from the wall clock in milliseconds and is forced
    /// strictly monotonic, so two calls inside the same millisecond still
    /// produce distinct URLs.
    pub fn stream_url(&self) -> String {
        format!("{}/stream.mjpg?{}", self.base_url, self.next_cache_buster())
    }

    fn next_cache_buster(&self) -> u64 {
        let now = chrono::Utc::now().timestamp_millis().max(0) as u64;
        let mut prev = self.last_cache_buster.load(Ordering::Relaxed);
        loop {
            let next = now.max(prev + 1);
            match self.last_cache_buster.compare_exchange_weak(
                prev,
                next,
                Ordering::Relaxed,
                Ordering::Relaxed,
            ) {
                Ok(_) => return next,
                Err(observed) => prev = observed,
            }
        }
    }

    fn classify(&self, error: reqwest::Error) -> DeviceError {
        if error.is_connect() {
            DeviceError::Connection(self.base_url.clone())
        } else {
            DeviceError::Http(error)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> DeviceClient {
        DeviceClient::new(
            "http://127.0.0.1:9000/",
            Duration::from_secs(5),
            Duration::from_secs(2),
        )
        .unwrap()
    }

    #[test]
    fn test_base_url_trailing_slash_stripped() {
        assert_eq!(client().base_url(), "http://127.0.0.1:9000");
    }

    #[test]
    fn test_stream_urls_differ_within_one_millisecond() {
        let client = client();
        let a = client.stream_url();
        let b = client.stream_url();
        assert_ne!(a, b);
    }

    #[test]
    fn test_cache_buster_strictly_increases() {
        let client = client();
        let mut previous = 0u64;
        for _ in 0..1000 {
            let tick = client.next_cache_buster();
            assert!(tick > previous);
            previous = tick;
        }
    }

    #[test]
    fn test_stream_url_shape() {
        let url = client().stream_url();
        assert!(url.starts_with("http://127.0.0.1:9000/stream.mjpg?"));
    }
}
