//! Bridge between synchronous callers and the E-IMZO WebSocket service
//!
//! This crate provides:
//! - Wire protocol: request envelopes and reply validation
//! - Transport abstractions (Transport/Channel traits)
//! - WebSocket transport over rustls
//! - A blocking bridge that runs one exchange per call

pub mod config;
pub mod exchange;
pub mod protocol;
pub mod sync;
pub mod transport;
pub mod ws;

pub use config::BridgeConfig;
pub use exchange::run_exchange;
pub use protocol::{Request, RequestEnvelope, check_success, decode_response, serialize};
pub use sync::SyncBridge;
pub use transport::{Channel, Transport};
pub use ws::WsTransport;

pub use tokio_util::sync::CancellationToken;
