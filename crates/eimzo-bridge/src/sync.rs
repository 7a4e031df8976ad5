//! Blocking bridge over the async exchange
//!
//! Every call gets its own channel and its own single-threaded runtime. When
//! the caller is already inside a tokio runtime, the exchange moves to a
//! dedicated worker thread and the caller blocks until it finishes, so a
//! shared event loop is never re-entered.

use crate::config::BridgeConfig;
use crate::exchange::run_exchange;
use crate::protocol::{self, Request};
use crate::transport::Transport;
use crate::ws::WsTransport;
use eimzo_core::{EimzoError, Result};
use std::future::Future;
use std::sync::Arc;
use std::thread;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Runs one exchange per call and returns its outcome on the calling thread
#[derive(Clone)]
pub struct SyncBridge {
    config: BridgeConfig,
    transport: Arc<dyn Transport>,
}

impl SyncBridge {
    /// Bridge over the WebSocket transport
    pub fn new(config: BridgeConfig) -> Self {
        Self::with_transport(config, Arc::new(WsTransport::new()))
    }

    /// Bridge over a custom transport
    pub fn with_transport(config: BridgeConfig, transport: Arc<dyn Transport>) -> Self {
        Self { config, transport }
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// Send raw payload text and return the raw reply text, blocking
    pub fn exchange(&self, payload: String, cancel: &CancellationToken) -> Result<String> {
        let transport = self.transport.clone();
        let config = self.config.clone();
        let cancel = cancel.clone();

        let job = move || {
            block_on_fresh(async move {
                run_exchange(transport.as_ref(), &config, &payload, &cancel).await
            })
        };

        if tokio::runtime::Handle::try_current().is_err() {
            return job();
        }

        debug!("Caller is inside a runtime, handing exchange to a worker thread");
        let worker = thread::Builder::new()
            .name("eimzo-exchange".into())
            .spawn(job)
            .map_err(|e| EimzoError::ChannelError(format!("Failed to spawn worker: {}", e)))?;
        worker
            .join()
            .map_err(|_| EimzoError::ChannelError("Exchange worker panicked".into()))?
    }

    /// Send a request and return its validated reply, blocking.
    ///
    /// A `success: false` reply becomes [`EimzoError::RemoteError`].
    pub fn call(&self, request: &Request, cancel: &CancellationToken) -> Result<serde_json::Value> {
        self.call_checked(request, cancel).map(|(_, value)| value)
    }

    /// Like [`Self::call`], but return the reply text exactly as received
    pub fn call_text(&self, request: &Request, cancel: &CancellationToken) -> Result<String> {
        self.call_checked(request, cancel).map(|(text, _)| text)
    }

    fn call_checked(
        &self,
        request: &Request,
        cancel: &CancellationToken,
    ) -> Result<(String, serde_json::Value)> {
        debug!("Calling {}", request.name());
        let payload = protocol::serialize(&request.envelope())?;
        let reply = self.exchange(payload, cancel)?;
        let value = protocol::check_success(protocol::decode_response(&reply)?)?;
        Ok((reply, value))
    }
}

fn block_on_fresh<T>(fut: impl Future<Output = Result<T>>) -> Result<T> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| EimzoError::ChannelError(format!("Failed to start runtime: {}", e)))?;
    runtime.block_on(fut)
}
