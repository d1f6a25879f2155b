//! API key credentials

use std::fmt;

use base64::{engine::general_purpose, Engine as _};
use reqwest::header::HeaderValue;

use crate::error::{BuildClientError, Result};

/// Basic-auth credentials derived from an API key
///
/// The key is the whole credential: the header carries `base64(key)` with
/// no `:password` part. Encoded once and never changed afterwards.
#[derive(Clone)]
pub struct Credentials {
    header: HeaderValue,
}

impl Credentials {
    pub fn from_api_key(api_key: &str) -> Result<Self> {
        let api_key = api_key.trim();
        if api_key.is_empty() {
            return Err(BuildClientError::InvalidCredentials(
                "API key is empty".to_string(),
            ));
        }

        let token = general_purpose::STANDARD.encode(api_key.as_bytes());
        let mut header = HeaderValue::from_str(&format!("Basic {}", token))
            .map_err(|e| BuildClientError::InvalidCredentials(e.to_string()))?;
        header.set_sensitive(true);

        Ok(Self { header })
    }

    /// Value for the `Authorization` header
    pub fn header_value(&self) -> &HeaderValue {
        &self.header
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credentials(<redacted>)")
    }
}
