//! # eimzo-core
//!
//! Core types and errors for the E-IMZO signing bridge.
//!
//! This crate provides the foundational types shared by the bridge and the
//! component facade:
//! - The service endpoint and its origin header
//! - Reply bodies (certificates, key handles, signatures)
//! - The per-call exchange state machine
//! - Error types and host-facing fault codes

pub mod endpoint;
pub mod error;
pub mod phase;
pub mod response;

pub use endpoint::{ConnectionEndpoint, DEFAULT_ORIGIN, DEFAULT_URI};
pub use error::{EimzoError, Result, error_codes};
pub use phase::ExchangePhase;
pub use response::{
    CertificateDescriptor, CertificateList, KeyHandle, ResponseEnvelope, SignatureResult,
};
