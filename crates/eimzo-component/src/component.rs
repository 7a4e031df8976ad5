//! Blocking facade over the E-IMZO service

use eimzo_bridge::{BridgeConfig, CancellationToken, Request, SyncBridge};
use eimzo_core::Result;
use tracing::{debug, info};

/// Returned by `get_author`
pub const AUTHOR: &str = "Asadbek Muxtorov | https://github.com/bekmuxtorov";

/// Signing component exposed to the host.
///
/// Each method blocks the calling thread for one exchange with the service.
/// Calls share nothing except the shutdown token, so the component can be used
/// from several threads at once.
#[derive(Clone)]
pub struct EimzoComponent {
    bridge: SyncBridge,
    shutdown: CancellationToken,
}

impl EimzoComponent {
    /// Component talking to the local E-IMZO service
    pub fn new() -> Self {
        Self::with_config(BridgeConfig::default())
    }

    pub fn with_config(config: BridgeConfig) -> Self {
        Self::with_bridge(SyncBridge::new(config))
    }

    pub fn with_bridge(bridge: SyncBridge) -> Self {
        Self {
            bridge,
            shutdown: CancellationToken::new(),
        }
    }

    /// Identify the component. No network call.
    pub fn get_author(&self) -> &'static str {
        AUTHOR
    }

    /// All certificate containers on all disks
    pub fn get_all_certificates(&self) -> Result<serde_json::Value> {
        self.call(Request::ListAllCertificates)
    }

    /// Certificate containers on `disk` (e.g. `C:\`)
    pub fn get_certificates(&self, disk: &str) -> Result<serde_json::Value> {
        self.call(Request::ListCertificates {
            disk: disk.to_string(),
        })
    }

    /// Unlock a key; the reply carries `keyId` for [`Self::create_pkcs`]
    pub fn load_key(
        &self,
        disk: &str,
        path: &str,
        name: &str,
        alias: &str,
    ) -> Result<serde_json::Value> {
        self.call(Request::LoadKey {
            disk: disk.to_string(),
            path: path.to_string(),
            name: name.to_string(),
            alias: alias.to_string(),
        })
    }

    /// Sign base64 text with a loaded key, producing an attached PKCS#7
    pub fn create_pkcs(&self, text_base64: &str, key_id: &str) -> Result<serde_json::Value> {
        self.call(Request::CreatePkcs7 {
            data_base64: text_base64.to_string(),
            key_id: key_id.to_string(),
        })
    }

    /// Forward a caller-built payload verbatim and return the raw reply.
    ///
    /// The reply is not validated. `wait_iterations` has no effect.
    pub fn send(&self, message: &str, wait_iterations: Option<u32>) -> Result<String> {
        if let Some(n) = wait_iterations {
            debug!("Ignoring wait_iterations={}", n);
        }
        self.bridge
            .exchange(message.to_string(), &self.shutdown.child_token())
    }

    /// Abort in-flight calls and refuse new ones
    pub fn shutdown(&self) {
        info!("Component shutting down");
        self.shutdown.cancel();
    }

    pub fn is_shut_down(&self) -> bool {
        self.shutdown.is_cancelled()
    }

    fn call(&self, request: Request) -> Result<serde_json::Value> {
        self.bridge.call(&request, &self.shutdown.child_token())
    }

    /// Validated reply, as the exact text the service sent
    pub(crate) fn call_text(&self, request: Request) -> Result<String> {
        self.bridge.call_text(&request, &self.shutdown.child_token())
    }
}

impl Default for EimzoComponent {
    fn default() -> Self {
        Self::new()
    }
}
