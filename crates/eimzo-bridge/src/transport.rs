//! Transport abstractions for the bridge
//!
//! A [`Transport`] opens single-use [`Channel`]s. A channel carries exactly one
//! request frame and one reply frame, then is closed.

use async_trait::async_trait;
use eimzo_core::{ConnectionEndpoint, Result};

/// Opens channels to the service
#[async_trait]
pub trait Transport: Send + Sync {
    /// Establish a channel, presenting the endpoint's origin header
    async fn open(&self, endpoint: &ConnectionEndpoint) -> Result<Box<dyn Channel>>;
}

/// One open connection to the service
#[async_trait]
pub trait Channel: Send {
    /// Write a complete payload as a single frame
    async fn send(&mut self, payload: &str) -> Result<()>;

    /// Wait for the next data frame
    async fn receive(&mut self) -> Result<String>;

    /// Release the channel. Must be called on every exit path once opened.
    async fn close(&mut self) -> Result<()>;

    /// Write one frame and wait for one reply
    async fn send_and_receive(&mut self, payload: &str) -> Result<String> {
        self.send(payload).await?;
        self.receive().await
    }
}
