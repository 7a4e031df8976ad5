//! Error types for the E-IMZO bridge

use crate::phase::ExchangePhase;
use std::time::Duration;
use thiserror::Error;

/// Result type for bridge operations
pub type Result<T> = std::result::Result<T, EimzoError>;

/// Bridge error types
#[derive(Debug, Error)]
pub enum EimzoError {
    /// Channel could not be established (service not running, TLS failure)
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Channel failed after it was opened
    #[error("Channel error: {0}")]
    ChannelError(String),

    /// Reply frame is not JSON or violates the envelope shape
    #[error("Protocol error: {0}")]
    ProtocolError(String),

    /// Service answered with `success: false`
    #[error("Remote error: {reason}")]
    RemoteError {
        reason: String,
        payload: serde_json::Value,
    },

    /// A bounded wait ran out
    #[error("Timed out after {after:?} while {phase}")]
    Timeout {
        phase: ExchangePhase,
        after: Duration,
    },

    /// Exchange was cancelled before it completed
    #[error("Exchange cancelled")]
    Cancelled,

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Operation name not in the dispatch table
    #[error("Unknown operation: {0}")]
    UnknownOperation(String),

    /// Wrong number of arguments for an operation
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),
}

impl EimzoError {
    /// Stable fault code for host adapters
    pub fn code(&self) -> i32 {
        match self {
            EimzoError::ConnectionError(_) => error_codes::CONNECTION,
            EimzoError::ChannelError(_) => error_codes::CHANNEL,
            EimzoError::ProtocolError(_) => error_codes::PROTOCOL,
            EimzoError::RemoteError { .. } => error_codes::REMOTE,
            EimzoError::Timeout { .. } => error_codes::TIMEOUT,
            EimzoError::Cancelled => error_codes::CANCELLED,
            EimzoError::SerializationError(_) => error_codes::SERIALIZATION,
            EimzoError::UnknownOperation(_) => error_codes::UNKNOWN_OPERATION,
            EimzoError::InvalidArguments(_) => error_codes::INVALID_ARGUMENTS,
        }
    }
}

impl From<serde_json::Error> for EimzoError {
    fn from(err: serde_json::Error) -> Self {
        EimzoError::SerializationError(err.to_string())
    }
}

/// Fault codes surfaced across the host boundary
pub mod error_codes {
    pub const CONNECTION: i32 = -32010;
    pub const CHANNEL: i32 = -32011;
    pub const PROTOCOL: i32 = -32012;
    pub const REMOTE: i32 = -32013;
    pub const TIMEOUT: i32 = -32014;
    pub const CANCELLED: i32 = -32015;
    pub const SERIALIZATION: i32 = -32016;
    pub const UNKNOWN_OPERATION: i32 = -32601;
    pub const INVALID_ARGUMENTS: i32 = -32602;
}
