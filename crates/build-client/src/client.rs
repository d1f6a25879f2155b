//! Build API HTTP client

use std::sync::Arc;

use reqwest::Method;
use serde::de::DeserializeOwned;
use url::Url;

use crate::auth::Credentials;
use crate::config::{ClientConfig, EndpointsConfig};
use crate::context::CallContext;
use crate::envelope::{self, Envelope};
use crate::error::{BuildClientError, Result};
use crate::transport::Transport;
use crate::types::PollCursor;

/// Build API client
///
/// Holds only immutable state: the encoded credential, the endpoint table
/// and a pooled HTTP client. Cloning is cheap and clones share the
/// connection pool, so one client can serve many tasks.
///
/// Resource operations live in `impl BuildClient` blocks next to their
/// types: models and code revisions, devices, and device logs.
#[derive(Debug, Clone)]
pub struct BuildClient {
    transport: Transport,
    api_url: Url,
    base_url: Url,
    paths: Arc<EndpointsConfig>,
    context: CallContext,
}

impl BuildClient {
    /// Create a client for the public Build API
    ///
    /// # Arguments
    /// * `api_key` - Build API key; sent as `Authorization: Basic base64(api_key)`
    pub fn new(api_key: &str) -> Result<Self> {
        Self::with_config(api_key, ClientConfig::default())
    }

    /// Create a client with custom hosts, paths or timeouts
    pub fn with_config(api_key: &str, config: ClientConfig) -> Result<Self> {
        let credentials = Credentials::from_api_key(api_key)?;
        Self::from_credentials(&credentials, config)
    }

    pub fn from_credentials(credentials: &Credentials, config: ClientConfig) -> Result<Self> {
        let api_url = config.api_url()?;
        let base_url = config.base_url()?;
        let transport = Transport::new(
            credentials,
            config.timeouts.request(),
            config.timeouts.connect(),
        )?;

        Ok(Self {
            transport,
            api_url,
            base_url,
            paths: Arc::new(config.endpoints),
            context: CallContext::default(),
        })
    }

    /// A client whose calls all run under `context`
    ///
    /// Shares the connection pool with `self`.
    pub fn with_context(&self, context: CallContext) -> Self {
        Self {
            context,
            ..self.clone()
        }
    }

    /// Versioned API root
    pub fn api_url(&self) -> &Url {
        &self.api_url
    }

    /// Host that poll cursors are resolved against
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn context(&self) -> &CallContext {
        &self.context
    }

    pub(crate) fn paths(&self) -> &EndpointsConfig {
        &self.paths
    }

    // =========================================================================
    // Helper Methods
    // =========================================================================

    /// API root joined with `segments`, each percent-encoded as one segment
    pub(crate) fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.api_url.clone();
        url.path_segments_mut()
            .map_err(|_| url::ParseError::RelativeUrlWithCannotBeABaseBase)?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Resolve a poll cursor against the base host
    ///
    /// The cursor may or may not start with `/`; either way it lands under
    /// the base host's path, never under the API root.
    pub fn resolve_cursor(&self, cursor: &PollCursor) -> Result<Url> {
        let relative = cursor.as_str().trim().trim_start_matches('/');
        if relative.is_empty() {
            return Err(BuildClientError::InvalidCursor(cursor.to_string()));
        }
        Ok(self.base_url.join(relative)?)
    }

    /// One round trip, decoded into the envelope for `P`
    pub(crate) async fn call<P: DeserializeOwned>(
        &self,
        method: Method,
        url: Url,
        body: Option<Vec<u8>>,
    ) -> Result<Envelope<P>> {
        let response = self
            .transport
            .execute(&self.context, method, url, body)
            .await?;
        envelope::decode(&response)
    }
}
