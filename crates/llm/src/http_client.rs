//! HTTP Client Factory
//!
//! Builds the `reqwest::Client` shared by the HTTP backends.

use std::time::Duration;

use crate::types::{BackendError, BackendResult};

/// Build a `reqwest::Client` whose requests time out after `timeout`.
///
/// Proxy settings from the environment are ignored; backends are usually local.
pub fn build_http_client(timeout: Duration) -> BackendResult<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .connect_timeout(timeout.min(Duration::from_secs(10)))
        .no_proxy()
        .build()
        .map_err(|e| BackendError::malformed(format!("failed to build HTTP client: {}", e)))
}
