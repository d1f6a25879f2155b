//! Authenticated HTTP round trips

use std::time::Duration;

use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Method, StatusCode};
use tracing::{debug, trace};
use url::Url;

use crate::auth::Credentials;
use crate::context::CallContext;
use crate::error::{BuildClientError, Result};

/// A response the transport did not classify as a failure
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: StatusCode,
    pub body: Bytes,
}

/// Sends requests with the Build API headers and classifies the outcome
///
/// Only 504 Gateway Timeout is treated as a failure here. Every other
/// status, 4xx and 5xx included, hands its body to the envelope decoder.
#[derive(Debug, Clone)]
pub struct Transport {
    client: Client,
}

impl Transport {
    pub fn new(
        credentials: &Credentials,
        timeout: Duration,
        connect_timeout: Duration,
    ) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, credentials.header_value().clone());
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(connect_timeout)
            .default_headers(headers)
            .build()?;

        Ok(Self { client })
    }

    /// Perform one round trip: no retry, no redirect handling beyond reqwest's defaults
    pub async fn execute(
        &self,
        ctx: &CallContext,
        method: Method,
        url: Url,
        body: Option<Vec<u8>>,
    ) -> Result<RawResponse> {
        ctx.run(self.round_trip(method, url, body)).await
    }

    async fn round_trip(
        &self,
        method: Method,
        url: Url,
        body: Option<Vec<u8>>,
    ) -> Result<RawResponse> {
        debug!("{} {}", method, url);

        let mut request = self.client.request(method, url);
        if let Some(body) = body {
            request = request.body(body);
        }

        let response = request.send().await?;
        let status = response.status();

        if status == StatusCode::GATEWAY_TIMEOUT {
            debug!("Gateway timeout from {}", response.url());
            return Err(BuildClientError::Timeout);
        }

        let body = response.bytes().await?;
        trace!(
            "HTTP {} response body: {}",
            status,
            String::from_utf8_lossy(&body)
        );

        Ok(RawResponse { status, body })
    }
}
