//! One request/response exchange over a fresh channel

use crate::config::BridgeConfig;
use crate::transport::{Channel, Transport};
use eimzo_core::{EimzoError, ExchangePhase, Result};
use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Drive a single exchange: open, send, receive, close.
///
/// The channel is closed on every path once it has been opened, including
/// timeouts and cancellation. Nothing is retried.
pub async fn run_exchange(
    transport: &dyn Transport,
    config: &BridgeConfig,
    payload: &str,
    cancel: &CancellationToken,
) -> Result<String> {
    let mut phase = ExchangePhase::Idle;

    advance(&mut phase);
    let mut channel = bounded(
        cancel,
        phase,
        config.connect_timeout,
        transport.open(&config.endpoint),
    )
    .await?;

    let outcome = talk(channel.as_mut(), config, payload, cancel, &mut phase).await;

    phase = ExchangePhase::Closed;
    match tokio::time::timeout(config.close_timeout, channel.close()).await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => warn!("Channel close failed: {}", e),
        Err(_) => warn!(
            "Channel close did not finish within {:?}",
            config.close_timeout
        ),
    }
    debug!(
        "Exchange {} ({})",
        phase,
        if outcome.is_ok() { "success" } else { "failure" }
    );

    outcome
}

async fn talk(
    channel: &mut dyn Channel,
    config: &BridgeConfig,
    payload: &str,
    cancel: &CancellationToken,
    phase: &mut ExchangePhase,
) -> Result<String> {
    advance(phase);
    let preview: String = payload.chars().take(200).collect();
    debug!("[Bridge→Service] len={} json={}", payload.len(), preview);
    bounded(cancel, *phase, config.response_timeout, channel.send(payload)).await?;

    advance(phase);
    let reply = bounded(cancel, *phase, config.response_timeout, channel.receive()).await?;
    let preview: String = reply.chars().take(200).collect();
    debug!("[Service→Bridge] len={} json={}", reply.len(), preview);

    Ok(reply)
}

fn advance(phase: &mut ExchangePhase) {
    let next = phase.next();
    debug!("Exchange {} -> {}", phase, next);
    *phase = next;
}

/// Run `fut` unless it outlives `limit` or `cancel` fires first
async fn bounded<T>(
    cancel: &CancellationToken,
    phase: ExchangePhase,
    limit: Duration,
    fut: impl Future<Output = Result<T>>,
) -> Result<T> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(EimzoError::Cancelled),
        res = tokio::time::timeout(limit, fut) => {
            res.map_err(|_| EimzoError::Timeout { phase, after: limit })
                .and_then(|inner| inner)
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use async_trait::async_trait;
    use eimzo_core::ConnectionEndpoint;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// How the scripted service behaves
    #[derive(Debug, Clone)]
    pub(crate) enum Script {
        Reply(String),
        Refuse,
        HangOnOpen,
        Silent,
        DropOnSend,
    }

    #[derive(Debug, Default)]
    pub(crate) struct Counters {
        pub opens: AtomicUsize,
        pub sends: AtomicUsize,
        pub receives: AtomicUsize,
        pub closes: AtomicUsize,
    }

    impl Counters {
        pub fn snapshot(&self) -> [usize; 4] {
            [
                self.opens.load(Ordering::SeqCst),
                self.sends.load(Ordering::SeqCst),
                self.receives.load(Ordering::SeqCst),
                self.closes.load(Ordering::SeqCst),
            ]
        }
    }

    /// In-memory transport that counts channel operations
    pub(crate) struct ScriptedTransport {
        pub script: Script,
        pub counters: Arc<Counters>,
        pub sent: Arc<std::sync::Mutex<Vec<String>>>,
    }

    impl ScriptedTransport {
        pub fn new(script: Script) -> Self {
            Self {
                script,
                counters: Arc::new(Counters::default()),
                sent: Arc::new(std::sync::Mutex::new(Vec::new())),
            }
        }
    }

    struct ScriptedChannel {
        script: Script,
        counters: Arc<Counters>,
        sent: Arc<std::sync::Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl Transport for ScriptedTransport {
        async fn open(&self, _endpoint: &ConnectionEndpoint) -> Result<Box<dyn Channel>> {
            match self.script {
                Script::Refuse => return Err(EimzoError::ConnectionError("refused".into())),
                Script::HangOnOpen => std::future::pending::<()>().await,
                _ => {}
            }
            self.counters.opens.fetch_add(1, Ordering::SeqCst);
            Ok(Box::new(ScriptedChannel {
                script: self.script.clone(),
                counters: self.counters.clone(),
                sent: self.sent.clone(),
            }))
        }
    }

    #[async_trait]
    impl Channel for ScriptedChannel {
        async fn send(&mut self, payload: &str) -> Result<()> {
            self.counters.sends.fetch_add(1, Ordering::SeqCst);
            if let Script::DropOnSend = self.script {
                return Err(EimzoError::ChannelError("broken pipe".into()));
            }
            self.sent.lock().unwrap().push(payload.to_string());
            Ok(())
        }

        async fn receive(&mut self) -> Result<String> {
            self.counters.receives.fetch_add(1, Ordering::SeqCst);
            match &self.script {
                Script::Reply(text) => Ok(text.clone()),
                _ => std::future::pending().await,
            }
        }

        async fn close(&mut self) -> Result<()> {
            self.counters.closes.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    pub(crate) fn fast_config() -> BridgeConfig {
        BridgeConfig::default()
            .with_connect_timeout(Duration::from_millis(200))
            .with_response_timeout(Duration::from_millis(100))
            .with_close_timeout(Duration::from_millis(100))
    }

    #[tokio::test]
    async fn test_one_of_each_on_success() {
        let transport = ScriptedTransport::new(Script::Reply(r#"{"success":true}"#.into()));
        let reply = run_exchange(
            &transport,
            &fast_config(),
            r#"{"plugin":"pfx","name":"list_all_certificates"}"#,
            &CancellationToken::new(),
        )
        .await
        .unwrap();

        assert_eq!(reply, r#"{"success":true}"#);
        assert_eq!(transport.counters.snapshot(), [1, 1, 1, 1]);
        assert_eq!(
            transport.sent.lock().unwrap().as_slice(),
            [r#"{"plugin":"pfx","name":"list_all_certificates"}"#]
        );
    }

    #[tokio::test]
    async fn test_silent_service_times_out_and_closes() {
        let transport = ScriptedTransport::new(Script::Silent);
        let err = run_exchange(&transport, &fast_config(), "{}", &CancellationToken::new())
            .await
            .unwrap_err();

        match err {
            EimzoError::Timeout { phase, .. } => {
                assert_eq!(phase, ExchangePhase::AwaitingResponse)
            }
            other => panic!("Expected timeout, got {:?}", other),
        }
        assert_eq!(transport.counters.snapshot(), [1, 1, 1, 1]);
    }

    #[tokio::test]
    async fn test_send_failure_still_closes() {
        let transport = ScriptedTransport::new(Script::DropOnSend);
        let err = run_exchange(&transport, &fast_config(), "{}", &CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(err, EimzoError::ChannelError(_)));
        assert_eq!(transport.counters.snapshot(), [1, 1, 0, 1]);
    }

    #[tokio::test]
    async fn test_refused_opens_nothing() {
        let transport = ScriptedTransport::new(Script::Refuse);
        let err = run_exchange(&transport, &fast_config(), "{}", &CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(err, EimzoError::ConnectionError(_)));
        assert_eq!(transport.counters.snapshot(), [0, 0, 0, 0]);
    }

    #[tokio::test]
    async fn test_connect_timeout_opens_nothing() {
        let transport = ScriptedTransport::new(Script::HangOnOpen);
        let err = run_exchange(&transport, &fast_config(), "{}", &CancellationToken::new())
            .await
            .unwrap_err();

        match err {
            EimzoError::Timeout { phase, after } => {
                assert_eq!(phase, ExchangePhase::Connecting);
                assert_eq!(after, Duration::from_millis(200));
            }
            other => panic!("Expected timeout, got {:?}", other),
        }
        assert_eq!(transport.counters.snapshot(), [0, 0, 0, 0]);
    }

    #[tokio::test]
    async fn test_cancel_while_waiting_closes_channel() {
        let transport = ScriptedTransport::new(Script::Silent);
        let config = fast_config().with_response_timeout(Duration::from_secs(30));
        let cancel = CancellationToken::new();

        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            trigger.cancel();
        });

        let err = run_exchange(&transport, &config, "{}", &cancel)
            .await
            .unwrap_err();
        assert!(matches!(err, EimzoError::Cancelled));
        assert_eq!(transport.counters.snapshot(), [1, 1, 1, 1]);
    }
}
