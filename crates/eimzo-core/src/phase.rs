//! Per-call exchange state machine

use std::fmt;

/// Where a single request/response exchange currently is.
///
/// Every call walks `Idle → Connecting → Sending → AwaitingResponse → Closed`
/// at most once. It stops at the first reply or the first error; there is no
/// way back to an earlier phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExchangePhase {
    /// Nothing has happened yet
    Idle,
    /// Opening the channel (TCP, TLS, WebSocket handshake)
    Connecting,
    /// Writing the request frame
    Sending,
    /// Waiting for the single reply frame
    AwaitingResponse,
    /// Channel released
    Closed,
}

impl ExchangePhase {
    /// Next phase in the walk. `Closed` is terminal.
    pub fn next(self) -> Self {
        match self {
            ExchangePhase::Idle => ExchangePhase::Connecting,
            ExchangePhase::Connecting => ExchangePhase::Sending,
            ExchangePhase::Sending => ExchangePhase::AwaitingResponse,
            ExchangePhase::AwaitingResponse | ExchangePhase::Closed => ExchangePhase::Closed,
        }
    }

    pub fn is_terminal(self) -> bool {
        self == ExchangePhase::Closed
    }
}

impl fmt::Display for ExchangePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ExchangePhase::Idle => "idle",
            ExchangePhase::Connecting => "connecting",
            ExchangePhase::Sending => "sending",
            ExchangePhase::AwaitingResponse => "awaiting response",
            ExchangePhase::Closed => "closed",
        };
        f.write_str(s)
    }
}
