//! Mock E-IMZO service for integration tests.
//!
//! Listens on an ephemeral loopback port with plain `ws://`, checks the
//! `Origin` header, records each request frame, answers through a responder
//! and counts closing handshakes.

#![allow(dead_code)]

use futures::{SinkExt, StreamExt};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio_tungstenite::accept_hdr_async;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};
use tokio_tungstenite::tungstenite::http::StatusCode;

use eimzo_bridge::BridgeConfig;
use eimzo_component::EimzoComponent;
use eimzo_core::ConnectionEndpoint;

pub const ORIGIN: &str = "https://e-imzo.soliq.uz/";

/// What the mock does with a request
pub enum Reply {
    Text(String),
    Silent,
}

type Responder = dyn Fn(&str) -> Reply + Send + Sync;

#[derive(Default)]
pub struct Stats {
    pub accepted: AtomicUsize,
    pub rejected: AtomicUsize,
    pub closed: AtomicUsize,
    pub requests: Mutex<Vec<String>>,
}

impl Stats {
    pub fn accepted(&self) -> usize {
        self.accepted.load(Ordering::SeqCst)
    }

    pub fn rejected(&self) -> usize {
        self.rejected.load(Ordering::SeqCst)
    }

    pub fn closed(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

pub struct MockService {
    pub addr: SocketAddr,
    pub stats: Arc<Stats>,
}

impl MockService {
    /// Reply to every request with the same text
    pub fn replying(text: &str) -> Self {
        let text = text.to_string();
        Self::start(ORIGIN, move |_| Reply::Text(text.clone()))
    }

    /// Read requests but never answer
    pub fn silent() -> Self {
        Self::start(ORIGIN, |_| Reply::Silent)
    }

    /// Run the service on its own thread and runtime
    pub fn start(origin: &str, responder: impl Fn(&str) -> Reply + Send + Sync + 'static) -> Self {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.set_nonblocking(true).unwrap();
        let addr = listener.local_addr().unwrap();
        let stats = Arc::new(Stats::default());

        let origin = origin.to_string();
        let responder: Arc<Responder> = Arc::new(responder);
        let thread_stats = stats.clone();
        std::thread::spawn(move || {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .unwrap();
            runtime.block_on(async move {
                let listener = tokio::net::TcpListener::from_std(listener).unwrap();
                loop {
                    let Ok((stream, _)) = listener.accept().await else {
                        break;
                    };
                    tokio::spawn(serve(
                        stream,
                        origin.clone(),
                        responder.clone(),
                        thread_stats.clone(),
                    ));
                }
            });
        });

        Self { addr, stats }
    }

    pub fn endpoint(&self) -> ConnectionEndpoint {
        ConnectionEndpoint::new(format!("ws://{}/service/cryptapi", self.addr), ORIGIN)
    }

    pub fn config(&self) -> BridgeConfig {
        BridgeConfig::default()
            .with_endpoint(self.endpoint())
            .with_connect_timeout(Duration::from_secs(2))
            .with_response_timeout(Duration::from_secs(2))
            .with_close_timeout(Duration::from_secs(1))
    }

    pub fn component(&self) -> EimzoComponent {
        EimzoComponent::with_config(self.config())
    }
}

async fn serve(
    stream: tokio::net::TcpStream,
    origin: String,
    responder: Arc<Responder>,
    stats: Arc<Stats>,
) {
    let check = |req: &Request, response: Response| -> Result<Response, ErrorResponse> {
        let presented = req.headers().get("origin").and_then(|v| v.to_str().ok());
        if presented == Some(origin.as_str()) {
            Ok(response)
        } else {
            let mut denied = ErrorResponse::new(Some("origin not allowed".into()));
            *denied.status_mut() = StatusCode::FORBIDDEN;
            Err(denied)
        }
    };

    let mut ws = match accept_hdr_async(stream, check).await {
        Ok(ws) => ws,
        Err(_) => {
            stats.rejected.fetch_add(1, Ordering::SeqCst);
            return;
        }
    };
    stats.accepted.fetch_add(1, Ordering::SeqCst);

    while let Some(Ok(msg)) = ws.next().await {
        match msg {
            Message::Text(text) => {
                stats.requests.lock().unwrap().push(text.clone());
                if let Reply::Text(reply) = responder(&text) {
                    if ws.send(Message::Text(reply)).await.is_err() {
                        break;
                    }
                }
            }
            Message::Close(_) => {
                // Counted before the close reply goes out on the next read
                stats.closed.fetch_add(1, Ordering::SeqCst);
            }
            _ => {}
        }
    }
}

/// Loopback address with nothing listening
pub fn unreachable_endpoint() -> ConnectionEndpoint {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    ConnectionEndpoint::new(format!("ws://{}/service/cryptapi", addr), ORIGIN)
}
