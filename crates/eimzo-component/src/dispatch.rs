//! Name-dispatched entry points for host adapters
//!
//! A host that can only call `name(arg, arg, ...)` binds into this table.
//! Replies come back as JSON text; errors as a [`Fault`] with a stable code.

use crate::component::EimzoComponent;
use eimzo_bridge::Request;
use eimzo_core::{EimzoError, Result};
use serde::Serialize;
use tracing::debug;

/// Operation definition for the dispatch table
#[derive(Debug, Clone)]
pub struct OperationDef {
    pub name: &'static str,
    pub description: &'static str,
    pub arguments: &'static [&'static str],
    /// Trailing arguments that may be left out
    pub optional: usize,
}

impl OperationDef {
    pub fn accepts(&self, count: usize) -> bool {
        count <= self.arguments.len() && count + self.optional >= self.arguments.len()
    }
}

/// Every operation the component exposes
pub const OPERATIONS: &[OperationDef] = &[
    OperationDef {
        name: "get_author",
        description: "Identify the component. No service call.",
        arguments: &[],
        optional: 0,
    },
    OperationDef {
        name: "get_all_certificates",
        description: "List certificate containers on all disks.",
        arguments: &[],
        optional: 0,
    },
    OperationDef {
        name: "get_certificates",
        description: "List certificate containers on one disk. Example: C:\\",
        arguments: &["disk"],
        optional: 0,
    },
    OperationDef {
        name: "load_key",
        description: "Unlock a key (the service prompts for its password). Returns keyId.",
        arguments: &["disk", "path", "name", "alias"],
        optional: 0,
    },
    OperationDef {
        name: "create_pkcs",
        description: "Sign base64 text with a loaded key. Returns pkcs7_64.",
        arguments: &["text_base64", "key_id"],
        optional: 0,
    },
    OperationDef {
        name: "send",
        description: "Send a raw JSON payload and return the raw reply.",
        arguments: &["message", "wait_iterations"],
        optional: 1,
    },
];

/// Look up an operation by host-facing name
pub fn find_operation(name: &str) -> Option<&'static OperationDef> {
    OPERATIONS.iter().find(|op| op.name == name)
}

/// Something a host can call by name with string arguments
pub trait Dispatcher {
    /// Invoke `name` and return its reply as text
    fn invoke(&self, name: &str, args: &[String]) -> Result<String>;
}

impl Dispatcher for EimzoComponent {
    fn invoke(&self, name: &str, args: &[String]) -> Result<String> {
        let op = find_operation(name)
            .ok_or_else(|| EimzoError::UnknownOperation(name.to_string()))?;
        if !op.accepts(args.len()) {
            return Err(EimzoError::InvalidArguments(format!(
                "{} expects ({}), got {} argument(s)",
                op.name,
                op.arguments.join(", "),
                args.len()
            )));
        }
        debug!("Dispatching {} with {} argument(s)", op.name, args.len());

        // Reply text is returned as the service sent it
        let request = match (op.name, args) {
            ("get_author", []) => return Ok(self.get_author().to_string()),
            ("get_all_certificates", []) => Request::ListAllCertificates,
            ("get_certificates", [disk]) => Request::ListCertificates { disk: disk.clone() },
            ("load_key", [disk, path, name, alias]) => Request::LoadKey {
                disk: disk.clone(),
                path: path.clone(),
                name: name.clone(),
                alias: alias.clone(),
            },
            ("create_pkcs", [text, key_id]) => Request::CreatePkcs7 {
                data_base64: text.clone(),
                key_id: key_id.clone(),
            },
            ("send", [message]) => return self.send(message, None),
            ("send", [message, wait]) => {
                let wait = wait.parse::<u32>().map_err(|_| {
                    EimzoError::InvalidArguments(format!(
                        "wait_iterations must be a non-negative integer, got {:?}",
                        wait
                    ))
                })?;
                return self.send(message, Some(wait));
            }
            _ => {
                return Err(EimzoError::InvalidArguments(format!(
                    "{} cannot take {} argument(s)",
                    op.name,
                    args.len()
                )));
            }
        };

        self.call_text(request)
    }
}

/// Error as seen across the host boundary
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Fault {
    pub code: i32,
    pub message: String,
    /// Service reply for remote failures
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<serde_json::Value>,
}

impl From<&EimzoError> for Fault {
    fn from(err: &EimzoError) -> Self {
        let payload = match err {
            EimzoError::RemoteError { payload, .. } => Some(payload.clone()),
            _ => None,
        };
        Self {
            code: err.code(),
            message: err.to_string(),
            payload,
        }
    }
}

impl From<EimzoError> for Fault {
    fn from(err: EimzoError) -> Self {
        Fault::from(&err)
    }
}
