//! Envelope codec
//!
//! Every Build API response is wrapped as `{"success": bool, <payload>,
//! "error": {...}}`. The payload key differs per call (`model`, `models`,
//! `revision`, `logs` + `poll_url`, ...), so the payload is flattened into a
//! per-call struct.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{ApiError, BuildClientError, Result};
use crate::transport::RawResponse;
use crate::types::{null_as_default, CodeRevisionLong, CodeRevisionShort, Device, Model};

/// A decoded response envelope
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<P> {
    pub success: bool,
    #[serde(flatten)]
    pub payload: P,
    /// Only meaningful when `success` is false
    #[serde(default)]
    pub error: Option<ApiError>,
}

impl<P> Envelope<P> {
    /// The payload, or the server's error when `success` is false
    ///
    /// A failed envelope without an error body yields [`ApiError::generic`].
    pub fn into_result(self) -> Result<P> {
        if self.success {
            Ok(self.payload)
        } else {
            let err = self.error.unwrap_or_else(ApiError::generic);
            warn!("Unsuccessful envelope: {}", err);
            Err(BuildClientError::Api(err))
        }
    }

    /// Success check for calls whose failures carry no usable detail
    ///
    /// Delete and restart calls do not get a distinguishing message from the
    /// server, so any failure maps to [`ApiError::generic`].
    pub fn into_ack(self) -> Result<()> {
        if self.success {
            Ok(())
        } else {
            warn!("Unsuccessful envelope (no detail): {:?}", self.error);
            Err(BuildClientError::Api(ApiError::generic()))
        }
    }
}

/// Serialize a request body
pub fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    let body = serde_json::to_vec(value).map_err(BuildClientError::Encode)?;
    debug!("Request body: {}", String::from_utf8_lossy(&body));
    Ok(body)
}

/// Deserialize a response body into the envelope for `P`
pub fn decode<P: DeserializeOwned>(response: &RawResponse) -> Result<Envelope<P>> {
    serde_json::from_slice(&response.body).map_err(|source| {
        warn!(
            "Failed to decode response (HTTP {}): {}",
            response.status, source
        );
        BuildClientError::Decode {
            status: response.status.as_u16(),
            source,
        }
    })
}

// =============================================================================
// Payload shapes
// =============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ModelPayload {
    #[serde(default, deserialize_with = "null_as_default")]
    pub model: Model,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ModelsPayload {
    #[serde(default, deserialize_with = "null_as_default")]
    pub models: Vec<Model>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DevicePayload {
    #[serde(default, deserialize_with = "null_as_default")]
    pub device: Device,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DevicesPayload {
    #[serde(default, deserialize_with = "null_as_default")]
    pub devices: Vec<Device>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RevisionPayload {
    #[serde(default, deserialize_with = "null_as_default")]
    pub revision: CodeRevisionLong,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RevisionsPayload {
    #[serde(default, deserialize_with = "null_as_default")]
    pub revisions: Vec<CodeRevisionShort>,
}

/// For calls that only report success
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NoPayload {}
