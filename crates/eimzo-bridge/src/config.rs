//! Bridge configuration

use eimzo_core::ConnectionEndpoint;
use std::time::Duration;

/// Configuration for the bridge
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    /// Service endpoint (default: local E-IMZO)
    pub endpoint: ConnectionEndpoint,
    /// Limit on TCP + TLS + WebSocket handshake
    pub connect_timeout: Duration,
    /// Limit on sending the request and receiving the reply.
    /// `load_key` waits for the user to type a password, so this is generous.
    pub response_timeout: Duration,
    /// Limit on the closing handshake
    pub close_timeout: Duration,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            endpoint: ConnectionEndpoint::default(),
            connect_timeout: Duration::from_secs(10),
            response_timeout: Duration::from_secs(120),
            close_timeout: Duration::from_secs(2),
        }
    }
}

impl BridgeConfig {
    pub fn with_endpoint(mut self, endpoint: ConnectionEndpoint) -> Self {
        self.endpoint = endpoint;
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn with_response_timeout(mut self, timeout: Duration) -> Self {
        self.response_timeout = timeout;
        self
    }

    pub fn with_close_timeout(mut self, timeout: Duration) -> Self {
        self.close_timeout = timeout;
        self
    }
}
