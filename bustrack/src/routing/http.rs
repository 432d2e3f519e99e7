//! HTTP client abstraction for testability

use std::time::Duration;

use super::types::RoutingError;

/// Default request timeout for routing oracle calls.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Trait for async HTTP client operations.
///
/// This abstraction allows the directions oracle to be exercised with a
/// mock client in tests.
pub trait AsyncHttpClient {
    /// Performs an HTTP GET request and returns the response body.
    async fn get(&self, url: &str) -> Result<Vec<u8>, RoutingError>;
}

/// Real HTTP client implementation using reqwest.
#[derive(Debug, Clone)]
pub struct ReqwestClient {
    client: reqwest::Client,
}

impl ReqwestClient {
    /// Creates a new ReqwestClient with the default timeout.
    pub fn new() -> Result<Self, RoutingError> {
        Self::with_timeout(DEFAULT_TIMEOUT_SECS)
    }

    /// Creates a new ReqwestClient with custom timeout.
    pub fn with_timeout(timeout_secs: u64) -> Result<Self, RoutingError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| RoutingError::HttpError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client })
    }
}

impl AsyncHttpClient for ReqwestClient {
    async fn get(&self, url: &str) -> Result<Vec<u8>, RoutingError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| RoutingError::HttpError(format!("Request failed: {}", e)))?;

        // Check HTTP status
        if !response.status().is_success() {
            return Err(RoutingError::HttpError(format!(
                "HTTP {}",
                response.status()
            )));
        }

        response
            .bytes()
            .await
            .map(|b| b.to_vec())
            .map_err(|e| RoutingError::HttpError(format!("Failed to read response: {}", e)))
    }
}
