//! Wire protocol for Rust <-> E-IMZO communication
//!
//! Requests are JSON objects with the keys `plugin`, `name` and, when the
//! operation takes any, `arguments` (an array of strings), in that order.
//! Replies are JSON objects carrying at least a boolean `success`.

use eimzo_core::{EimzoError, Result};
use serde::Serialize;
use tracing::debug;

/// Plugin for certificate-container operations
pub const PLUGIN_PFX: &str = "pfx";
/// Plugin for PKCS#7 signing
pub const PLUGIN_PKCS7: &str = "pkcs7";

/// Third `create_pkcs7` argument: produce an attached signature
const ATTACHED: &str = "no";

/// Request frame sent to the service
///
/// Field order is part of the wire contract; serde keeps declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequestEnvelope {
    pub plugin: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arguments: Option<Vec<String>>,
}

impl RequestEnvelope {
    fn new(plugin: &str, name: &str, arguments: Option<Vec<String>>) -> Self {
        Self {
            plugin: plugin.to_string(),
            name: name.to_string(),
            arguments,
        }
    }
}

/// Operations the service understands
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    /// Every certificate container on every disk
    ListAllCertificates,

    /// Certificate containers on one disk
    ListCertificates { disk: String },

    /// Unlock a key; the service prompts for the container password
    LoadKey {
        disk: String,
        path: String,
        name: String,
        alias: String,
    },

    /// Sign base64 data with a previously loaded key
    CreatePkcs7 { data_base64: String, key_id: String },
}

impl Request {
    /// Protocol-level operation name
    pub fn name(&self) -> &'static str {
        match self {
            Request::ListAllCertificates => "list_all_certificates",
            Request::ListCertificates { .. } => "list_certificates",
            Request::LoadKey { .. } => "load_key",
            Request::CreatePkcs7 { .. } => "create_pkcs7",
        }
    }

    /// Build the envelope for this request
    pub fn envelope(&self) -> RequestEnvelope {
        match self {
            Request::ListAllCertificates => RequestEnvelope::new(PLUGIN_PFX, self.name(), None),
            Request::ListCertificates { disk } => {
                RequestEnvelope::new(PLUGIN_PFX, self.name(), Some(vec![disk.clone()]))
            }
            Request::LoadKey {
                disk,
                path,
                name,
                alias,
            } => RequestEnvelope::new(
                PLUGIN_PFX,
                self.name(),
                Some(vec![disk.clone(), path.clone(), name.clone(), alias.clone()]),
            ),
            Request::CreatePkcs7 {
                data_base64,
                key_id,
            } => RequestEnvelope::new(
                PLUGIN_PKCS7,
                self.name(),
                Some(vec![
                    data_base64.clone(),
                    key_id.clone(),
                    ATTACHED.to_string(),
                ]),
            ),
        }
    }
}

/// Serialize an envelope to its wire text
pub fn serialize(envelope: &RequestEnvelope) -> Result<String> {
    serde_json::to_string(envelope).map_err(Into::into)
}

/// Parse a reply frame.
///
/// The value is passed through untouched as long as it is a JSON object with a
/// boolean `success`.
pub fn decode_response(text: &str) -> Result<serde_json::Value> {
    let value: serde_json::Value = serde_json::from_str(text).map_err(|e| {
        EimzoError::ProtocolError(format!("Reply is not valid JSON: {}", e))
    })?;

    let object = value
        .as_object()
        .ok_or_else(|| EimzoError::ProtocolError("Reply is not a JSON object".into()))?;

    match object.get("success") {
        Some(serde_json::Value::Bool(_)) => Ok(value),
        Some(other) => Err(EimzoError::ProtocolError(format!(
            "Reply field 'success' is not a boolean: {}",
            other
        ))),
        None => Err(EimzoError::ProtocolError(
            "Reply has no 'success' field".into(),
        )),
    }
}

/// Turn a `success: false` reply into [`EimzoError::RemoteError`]
pub fn check_success(value: serde_json::Value) -> Result<serde_json::Value> {
    if value.get("success").and_then(|s| s.as_bool()) == Some(true) {
        return Ok(value);
    }

    let reason = value
        .get("reason")
        .and_then(|r| r.as_str())
        .unwrap_or("service reported failure")
        .to_string();
    debug!("Service refused request: {}", reason);

    Err(EimzoError::RemoteError {
        reason,
        payload: value,
    })
}
