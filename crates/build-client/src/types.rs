//! Request and response types for the Build API

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Deserialize a missing-or-null field as its default value
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

// =============================================================================
// Model Types
// =============================================================================

/// A named deployable unit
///
/// `id` is assigned by the server on creation and is empty before that.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Model {
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    /// Ids of the devices currently assigned to this model
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "Vec::is_empty")]
    pub devices: Vec<String>,
}

impl Model {
    /// A model payload for Create/Update
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

// =============================================================================
// Device Types
// =============================================================================

/// A physical endpoint, optionally bound to a model
///
/// Every field is optional on the wire; update payloads only send the
/// fields that are set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// `None` (or an empty string from the server) means unassigned
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_id: Option<String>,
    #[serde(
        default,
        rename = "powerstate",
        skip_serializing_if = "Option::is_none"
    )]
    pub power_state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rssi: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_status: Option<String>,
}

impl Device {
    /// The model this device is bound to, if any
    pub fn assigned_model(&self) -> Option<&str> {
        self.model_id.as_deref().filter(|id| !id.is_empty())
    }

    /// Update payload that moves a device to `model_id`
    pub fn assign_to(model_id: impl Into<String>) -> Self {
        Self {
            model_id: Some(model_id.into()),
            ..Default::default()
        }
    }

    /// Update payload that renames a device
    pub fn rename(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }
}

// =============================================================================
// Code Revision Types
// =============================================================================

/// Revision listing entry
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeRevisionShort {
    #[serde(default, deserialize_with = "null_as_default")]
    pub version: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub created_at: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub release_notes: String,
}

/// A full code revision, including both source blobs
///
/// Also used as the upload payload, in which case `version` and
/// `created_at` are left unset for the server to assign.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeRevisionLong {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_notes: Option<String>,
}

impl CodeRevisionLong {
    /// Upload payload with device and agent source
    pub fn upload(device_code: impl Into<String>, agent_code: impl Into<String>) -> Self {
        Self {
            device_code: Some(device_code.into()),
            agent_code: Some(agent_code.into()),
            ..Default::default()
        }
    }

    pub fn with_release_notes(mut self, notes: impl Into<String>) -> Self {
        self.release_notes = Some(notes.into());
        self
    }
}

// =============================================================================
// Device Log Types
// =============================================================================

/// One device log line
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceLogEntry {
    #[serde(default, deserialize_with = "null_as_default")]
    pub timestamp: String,
    #[serde(default, deserialize_with = "null_as_default", rename = "type")]
    pub log_type: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub message: String,
}

/// Server-issued relative URL for the next batch of logs
///
/// Opaque to the client. Only meaningful for the device and polling
/// session that produced it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PollCursor(String);

impl PollCursor {
    pub fn new(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for PollCursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PollCursor {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for PollCursor {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// One batch of log entries and the cursor for the next one
///
/// Entries are in chronological order within the batch. Nothing is
/// promised across batches: duplicates or gaps are passed through as the
/// server sent them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogBatch {
    #[serde(default, deserialize_with = "null_as_default", rename = "logs")]
    pub entries: Vec<DeviceLogEntry>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub poll_url: PollCursor,
}
