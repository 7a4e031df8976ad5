//! E-IMZO service endpoint

use std::fmt;

/// Local E-IMZO WebSocket API
pub const DEFAULT_URI: &str = "wss://127.0.0.1:64443/service/cryptapi";

/// Origin the service expects on the upgrade request
pub const DEFAULT_ORIGIN: &str = "https://e-imzo.soliq.uz/";

/// Where the bridge connects and which origin it presents.
///
/// Fields are fixed once built. `Default` is the process-wide E-IMZO endpoint;
/// other values only come from [`ConnectionEndpoint::new`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionEndpoint {
    uri: String,
    origin: String,
}

impl ConnectionEndpoint {
    pub fn new(uri: impl Into<String>, origin: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            origin: origin.into(),
        }
    }

    /// WebSocket URI (`ws://` or `wss://`)
    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// Value of the `Origin` header
    pub fn origin(&self) -> &str {
        &self.origin
    }

    pub fn is_secure(&self) -> bool {
        self.uri.starts_with("wss://")
    }
}

impl Default for ConnectionEndpoint {
    fn default() -> Self {
        Self::new(DEFAULT_URI, DEFAULT_ORIGIN)
    }
}

impl fmt::Display for ConnectionEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (origin {})", self.uri, self.origin)
    }
}
