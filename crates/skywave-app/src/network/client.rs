//! Shared HTTP client wrapper
//!
//! Thin wrapper around `reqwest::blocking::Client` that centralizes
//! user-agent and timeout configuration.

use std::time::Duration;

use serde::de::DeserializeOwned;
use skywave::config::network::{CONNECT_TIMEOUT_SECS, READ_TIMEOUT_SECS, USER_AGENT};

use crate::error::Result;

/// Shared HTTP client with standard configuration
pub struct HttpClient {
    inner: reqwest::blocking::Client,
}

impl HttpClient {
    /// Create a new client with default Skywave settings
    pub fn new() -> Result<Self> {
        let inner = reqwest::blocking::Client::builder()
            .user_agent(USER_AGENT)
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .timeout(Duration::from_secs(READ_TIMEOUT_SECS))
            .build()?;
        Ok(Self { inner })
    }

    /// GET a URL and deserialize the JSON response
    pub fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let resp = self.inner.get(url).send()?.error_for_status()?;
        Ok(resp.json::<T>()?)
    }

    /// GET a URL with query parameters and deserialize the JSON response
    pub fn get_json_query<T: DeserializeOwned>(
        &self,
        url: &str,
        params: &[(&str, &str)],
    ) -> Result<T> {
        let resp = self.inner.get(url).query(params).send()?.error_for_status()?;
        Ok(resp.json::<T>()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        assert!(HttpClient::new().is_ok());
    }

    #[test]
    fn test_get_json_unresolvable_host_is_error() {
        let client = HttpClient::new().unwrap();
        let result: Result<serde_json::Value> = client.get_json("http://invalid.invalid.invalid");
        assert!(result.is_err());
    }
}
