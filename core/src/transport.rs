//! Pluggable HTTP round-trip.
//!
//! `Transport` is the only place that performs I/O. The default
//! implementation wraps a reqwest client; tests can substitute anything that
//! turns an `HttpRequest` into an `HttpResponse`. Dropping the returned
//! future aborts the request.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use crate::error::{ConfigError, FetchError};
use crate::http::{HttpRequest, HttpResponse};

/// Executes one GET request and returns the raw response.
///
/// Non-2xx statuses are returned as data, not errors; status interpretation
/// belongs to `ResourceClient`.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, FetchError>;
}

/// Reqwest-backed transport with a per-request timeout.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration) -> Result<Self, ConfigError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ConfigError::Client(e.to_string()))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, FetchError> {
        let response = self
            .client
            .get(&request.path)
            .query(&request.query)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(map_transport_error)?;
        Ok(HttpResponse { status, body })
    }
}

fn map_transport_error(error: reqwest::Error) -> FetchError {
    if error.is_timeout() {
        FetchError::Network(format!("timed out: {error}"))
    } else {
        FetchError::Network(error.to_string())
    }
}
