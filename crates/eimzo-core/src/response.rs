//! Reply bodies returned by the E-IMZO service
//!
//! The bridge hands replies back as raw JSON. These types are typed views for
//! callers that want them; nothing here is validated locally.

use crate::error::{EimzoError, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Common reply envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    pub success: bool,
    /// Error text supplied by the service when `success` is false
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Operation-specific fields
    #[serde(flatten)]
    pub fields: serde_json::Map<String, serde_json::Value>,
}

impl ResponseEnvelope {
    /// Parse a typed view out of a reply value
    pub fn parse<T: DeserializeOwned>(value: &serde_json::Value) -> Result<T> {
        T::deserialize(value).map_err(|e| {
            EimzoError::ProtocolError(format!("Unexpected reply shape: {}", e))
        })
    }
}

/// A certificate container found by the service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertificateDescriptor {
    /// Drive root, e.g. `C:\`
    pub disk: String,
    /// Directory on the disk, e.g. `DSKEYS`
    pub path: String,
    /// Container file name
    pub name: String,
    /// DN-style identity string (`cn=...,serialnumber=...,validto=...`)
    pub alias: String,
}

/// Body of `list_all_certificates` / `list_certificates`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CertificateList {
    #[serde(default)]
    pub certificates: Vec<CertificateDescriptor>,
}

/// Handle to a key unlocked inside the service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyHandle {
    #[serde(rename = "keyId")]
    pub key_id: String,
    #[serde(rename = "type")]
    pub key_type: String,
}

/// Body of `create_pkcs7`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignatureResult {
    /// Base64 PKCS#7 structure
    pub pkcs7_64: String,
    pub signer_serial_number: String,
    pub signature_hex: String,
}
