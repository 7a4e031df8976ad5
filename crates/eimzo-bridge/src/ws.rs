//! WebSocket transport implementation
//!
//! Used for the E-IMZO service, which listens for secure WebSocket upgrades on
//! loopback and rejects requests without its expected `Origin` header.

use crate::transport::{Channel, Transport};
use async_trait::async_trait;
use eimzo_core::{ConnectionEndpoint, EimzoError, Result};
use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::http::header::ORIGIN;
use tokio_tungstenite::tungstenite::{Error as WsError, Message};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{debug, info};

/// Opens WebSocket channels (`ws://` or `wss://`)
#[derive(Debug, Clone, Default)]
pub struct WsTransport;

impl WsTransport {
    pub fn new() -> Self {
        // rustls needs a process-wide crypto provider for wss:// endpoints.
        // Fails harmlessly when one is already installed.
        let _ = rustls::crypto::ring::default_provider().install_default();
        Self
    }
}

#[async_trait]
impl Transport for WsTransport {
    async fn open(&self, endpoint: &ConnectionEndpoint) -> Result<Box<dyn Channel>> {
        let mut request = endpoint.uri().into_client_request().map_err(|e| {
            EimzoError::ConnectionError(format!("Invalid endpoint {}: {}", endpoint.uri(), e))
        })?;
        let origin = HeaderValue::from_str(endpoint.origin()).map_err(|e| {
            EimzoError::ConnectionError(format!("Invalid origin {}: {}", endpoint.origin(), e))
        })?;
        request.headers_mut().insert(ORIGIN, origin);

        info!("Opening channel to {}", endpoint);
        let (stream, response) = connect_async(request).await.map_err(|e| {
            EimzoError::ConnectionError(format!("Failed to connect to {}: {}", endpoint.uri(), e))
        })?;
        debug!("WebSocket handshake complete (HTTP {})", response.status());

        Ok(Box::new(WsChannel { stream }))
    }
}

/// One WebSocket connection
pub struct WsChannel {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

#[async_trait]
impl Channel for WsChannel {
    async fn send(&mut self, payload: &str) -> Result<()> {
        self.stream
            .send(Message::Text(payload.to_string()))
            .await
            .map_err(|e| EimzoError::ChannelError(format!("WebSocket send failed: {}", e)))
    }

    async fn receive(&mut self) -> Result<String> {
        loop {
            match self.stream.next().await {
                Some(Ok(Message::Text(text))) => return Ok(text),
                Some(Ok(Message::Binary(data))) => {
                    return Err(EimzoError::ProtocolError(format!(
                        "Expected a text frame, got {} binary bytes",
                        data.len()
                    )));
                }
                Some(Ok(Message::Close(frame))) => {
                    return Err(EimzoError::ChannelError(format!(
                        "Service closed the channel before replying: {:?}",
                        frame
                    )));
                }
                // Ping/pong are answered by tungstenite itself
                Some(Ok(other)) => debug!("Skipping control frame: {:?}", other),
                Some(Err(e)) => {
                    return Err(EimzoError::ChannelError(format!(
                        "WebSocket receive failed: {}",
                        e
                    )));
                }
                None => {
                    return Err(EimzoError::ChannelError(
                        "Channel ended before a reply arrived".into(),
                    ));
                }
            }
        }
    }

    async fn close(&mut self) -> Result<()> {
        match self.stream.close(None).await {
            Ok(()) => {}
            Err(WsError::ConnectionClosed | WsError::AlreadyClosed) => return Ok(()),
            Err(e) => {
                return Err(EimzoError::ChannelError(format!(
                    "WebSocket close failed: {}",
                    e
                )));
            }
        }

        // Drain until the peer acknowledges the close
        while let Some(Ok(_)) = self.stream.next().await {}
        info!("Channel closed");
        Ok(())
    }
}
