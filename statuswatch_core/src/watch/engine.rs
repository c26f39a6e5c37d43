use crate::watch::models::{Cursor, Snapshot, interpret};
use crate::watch::traits::{Notifier, StatusSource};
use crate::{Error, Result};
use std::sync::Arc;
use std::time::Duration;

/// Prefix for diagnostics sent when a poll cycle fails.
pub const FAILURE_PREFIX: &str = "Сбой в работе программы: ";

/// The poll-detect-notify loop.
///
/// Owns the time cursor and the text of the last delivered notification.
/// Only the first homework in a snapshot is interpreted each cycle: the
/// engine tracks the single most recent item and silently ignores older
/// entries further down the sequence.
///
/// Verdicts and failure diagnostics share one de-duplication slot, so a
/// repeated identical error is reported once until the state changes or a
/// different error occurs.
pub struct WatchEngine {
    source: Arc<dyn StatusSource>,
    notifier: Arc<dyn Notifier>,
    cursor: Cursor,
    last_message: Option<String>,
    retry_period: Duration,
}

impl std::fmt::Debug for WatchEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatchEngine")
            .field("source", &self.source.id())
            .field("notifier", &self.notifier.id())
            .field("cursor", &self.cursor)
            .field("last_message", &self.last_message)
            .field("retry_period", &self.retry_period)
            .finish()
    }
}

impl WatchEngine {
    #[tracing::instrument(level = "debug", skip(source, notifier))]
    pub fn new(
        source: Arc<dyn StatusSource>,
        notifier: Arc<dyn Notifier>,
        cursor: Cursor,
        retry_period: Duration,
    ) -> Result<Self> {
        if retry_period.is_zero() {
            return Err(Error::InvalidInput("retry_period must be > 0".to_string()));
        }
        Ok(Self {
            source,
            notifier,
            cursor,
            last_message: None,
            retry_period,
        })
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    pub fn last_message(&self) -> Option<&str> {
        self.last_message.as_deref()
    }

    /// Run poll cycles until the process is killed.
    ///
    /// The sleep between cycles is unconditional: success, "no change" and
    /// failure all wait out the full retry period.
    #[tracing::instrument(level = "info", skip(self))]
    pub async fn run_loop(&mut self) -> Result<()> {
        tracing::info!(
            source = self.source.id(),
            notifier = self.notifier.id(),
            cursor = %self.cursor,
            retry_period_secs = self.retry_period.as_secs(),
            "entering poll loop"
        );
        loop {
            self.cycle().await;
            tokio::time::sleep(self.retry_period).await;
        }
    }

    /// One poll cycle. Every error is absorbed here: it is logged, rendered
    /// into a diagnostic and offered to the notifier under the same
    /// de-duplication slot as regular verdicts.
    #[tracing::instrument(level = "info", skip(self))]
    pub async fn cycle(&mut self) {
        if let Err(err) = self.poll_once().await {
            tracing::error!(error = %err, "poll cycle failed");
            let diagnostic = format!("{FAILURE_PREFIX}{err}");
            self.notify_if_new(&diagnostic).await;
        }
    }

    async fn poll_once(&mut self) -> Result<()> {
        let raw = self.source.fetch(self.cursor).await?;
        let snapshot = Snapshot::validate(raw)?;

        match snapshot.first() {
            None => {
                tracing::debug!("no new statuses in response");
            }
            Some(item) => {
                let verdict = interpret(item)?;
                if !self.notify_if_new(&verdict).await {
                    // Delivery failed: keep the cursor so the same window is
                    // fetched again next cycle.
                    return Ok(());
                }
            }
        }

        self.cursor.advance(snapshot.current_date());
        Ok(())
    }

    /// Send `text` unless it matches the last delivered message.
    ///
    /// Returns false only when a send was attempted and failed. The
    /// last-message slot is updated strictly on confirmed delivery.
    async fn notify_if_new(&mut self, text: &str) -> bool {
        if self.last_message.as_deref() == Some(text) {
            tracing::debug!("message unchanged, send suppressed");
            return true;
        }

        match self.notifier.send(text).await {
            Ok(()) => {
                tracing::debug!(notifier = self.notifier.id(), text, "notification delivered");
                self.last_message = Some(text.to_string());
                true
            }
            Err(err) => {
                tracing::warn!(notifier = self.notifier.id(), error = %err, "notification delivery failed");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::{Value, json};
    use std::collections::VecDeque;
    use tokio::sync::Mutex;

    /// Scripted source: hands out queued responses in order.
    struct ScriptedSource {
        script: Mutex<VecDeque<Result<Value>>>,
    }

    impl ScriptedSource {
        fn new(script: Vec<Result<Value>>) -> Self {
            Self {
                script: Mutex::new(script.into()),
            }
        }
    }

    #[async_trait]
    impl StatusSource for ScriptedSource {
        fn id(&self) -> &'static str {
            "scripted"
        }

        async fn fetch(&self, _cursor: Cursor) -> Result<Value> {
            self.script.lock().await.pop_front().expect("script exhausted")
        }
    }

    /// Records delivered messages; can simulate an outage.
    #[derive(Default)]
    struct RecordingNotifier {
        sent: Mutex<Vec<String>>,
        failing: Mutex<bool>,
    }

    impl RecordingNotifier {
        async fn deliveries(&self) -> Vec<String> {
            self.sent.lock().await.clone()
        }

        async fn set_failing(&self, failing: bool) {
            *self.failing.lock().await = failing;
        }
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        fn id(&self) -> &'static str {
            "recording"
        }

        async fn send(&self, text: &str) -> Result<()> {
            if *self.failing.lock().await {
                return Err(Error::Delivery("simulated outage".to_string()));
            }
            self.sent.lock().await.push(text.to_string());
            Ok(())
        }
    }

    const APPROVED_VERDICT: &str =
        "Изменился статус проверки работы \"hw1\". Работа проверена: ревьюеру всё понравилось. Ура!";

    fn approved_snapshot() -> Value {
        json!({
            "homeworks": [{"homework_name": "hw1", "status": "approved"}],
            "current_date": 1000
        })
    }

    fn server_error() -> Error {
        Error::ResponseCode {
            status: 500,
            reason: "Internal Server Error".to_string(),
            body: "boom".to_string(),
        }
    }

    fn network_error() -> Error {
        Error::connectivity(
            "GET http://localhost:9999/statuses",
            std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "connection refused"),
        )
    }

    fn new_engine(source: ScriptedSource, notifier: Arc<RecordingNotifier>) -> WatchEngine {
        WatchEngine::new(
            Arc::new(source),
            notifier,
            Cursor::from_timestamp(0),
            Duration::from_secs(600),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn empty_snapshot_sends_nothing() {
        let notifier = Arc::new(RecordingNotifier::default());
        let source = ScriptedSource::new(vec![Ok(json!({"homeworks": [], "current_date": 42}))]);
        let mut engine = new_engine(source, notifier.clone());

        engine.cycle().await;

        assert!(notifier.deliveries().await.is_empty());
        assert_eq!(engine.last_message(), None);
        assert_eq!(engine.cursor().timestamp(), 42);
    }

    #[tokio::test]
    async fn status_change_notifies_and_advances_cursor() {
        let notifier = Arc::new(RecordingNotifier::default());
        let source = ScriptedSource::new(vec![Ok(approved_snapshot())]);
        let mut engine = new_engine(source, notifier.clone());

        engine.cycle().await;

        assert_eq!(notifier.deliveries().await, vec![APPROVED_VERDICT.to_string()]);
        assert_eq!(engine.last_message(), Some(APPROVED_VERDICT));
        assert_eq!(engine.cursor().timestamp(), 1000);
    }

    #[tokio::test]
    async fn identical_verdict_is_sent_once() {
        let notifier = Arc::new(RecordingNotifier::default());
        let source =
            ScriptedSource::new(vec![Ok(approved_snapshot()), Ok(approved_snapshot())]);
        let mut engine = new_engine(source, notifier.clone());

        engine.cycle().await;
        engine.cycle().await;

        assert_eq!(notifier.deliveries().await.len(), 1);
    }

    #[tokio::test]
    async fn unknown_status_reports_diagnostic_and_keeps_cursor() {
        let notifier = Arc::new(RecordingNotifier::default());
        let source = ScriptedSource::new(vec![Ok(json!({
            "homeworks": [{"homework_name": "hw1", "status": "weird"}],
            "current_date": 1000
        }))]);
        let mut engine = new_engine(source, notifier.clone());

        engine.cycle().await;

        let deliveries = notifier.deliveries().await;
        assert_eq!(deliveries.len(), 1);
        assert!(deliveries[0].starts_with(FAILURE_PREFIX));
        assert!(deliveries[0].contains("weird"));
        assert_eq!(engine.cursor().timestamp(), 0);
    }

    #[tokio::test]
    async fn response_code_failure_reports_status_reason_and_body() {
        let notifier = Arc::new(RecordingNotifier::default());
        let source = ScriptedSource::new(vec![Err(server_error())]);
        let mut engine = new_engine(source, notifier.clone());

        engine.cycle().await;

        let deliveries = notifier.deliveries().await;
        assert_eq!(deliveries.len(), 1);
        assert!(deliveries[0].contains("500"));
        assert!(deliveries[0].contains("Internal Server Error"));
        assert!(deliveries[0].contains("boom"));
        assert_eq!(engine.cursor().timestamp(), 0);
    }

    #[tokio::test]
    async fn repeated_identical_failure_is_reported_once() {
        let notifier = Arc::new(RecordingNotifier::default());
        let source = ScriptedSource::new(vec![Err(server_error()), Err(server_error())]);
        let mut engine = new_engine(source, notifier.clone());

        engine.cycle().await;
        engine.cycle().await;

        assert_eq!(notifier.deliveries().await.len(), 1);
    }

    #[tokio::test]
    async fn repeated_network_failure_is_reported_once() {
        let notifier = Arc::new(RecordingNotifier::default());
        let source = ScriptedSource::new(vec![Err(network_error()), Err(network_error())]);
        let mut engine = new_engine(source, notifier.clone());

        engine.cycle().await;
        engine.cycle().await;

        let deliveries = notifier.deliveries().await;
        assert_eq!(deliveries.len(), 1);
        assert!(deliveries[0].starts_with(FAILURE_PREFIX));
        assert_eq!(engine.cursor().timestamp(), 0);
    }

    #[tokio::test]
    async fn failure_then_recovery_sends_the_new_verdict() {
        let notifier = Arc::new(RecordingNotifier::default());
        let source =
            ScriptedSource::new(vec![Err(server_error()), Ok(approved_snapshot())]);
        let mut engine = new_engine(source, notifier.clone());

        engine.cycle().await;
        engine.cycle().await;

        let deliveries = notifier.deliveries().await;
        assert_eq!(deliveries.len(), 2);
        assert!(deliveries[0].starts_with(FAILURE_PREFIX));
        assert_eq!(deliveries[1], APPROVED_VERDICT);
        assert_eq!(engine.cursor().timestamp(), 1000);
    }

    #[tokio::test]
    async fn failed_delivery_keeps_state_and_retries_next_occurrence() {
        let notifier = Arc::new(RecordingNotifier::default());
        let source =
            ScriptedSource::new(vec![Ok(approved_snapshot()), Ok(approved_snapshot())]);
        let mut engine = new_engine(source, notifier.clone());

        notifier.set_failing(true).await;
        engine.cycle().await;

        assert!(notifier.deliveries().await.is_empty());
        assert_eq!(engine.last_message(), None);
        assert_eq!(engine.cursor().timestamp(), 0);

        notifier.set_failing(false).await;
        engine.cycle().await;

        assert_eq!(notifier.deliveries().await, vec![APPROVED_VERDICT.to_string()]);
        assert_eq!(engine.cursor().timestamp(), 1000);
    }

    #[tokio::test]
    async fn zero_retry_period_is_rejected() {
        let err = WatchEngine::new(
            Arc::new(ScriptedSource::new(vec![])),
            Arc::new(RecordingNotifier::default()),
            Cursor::from_timestamp(0),
            Duration::ZERO,
        )
        .unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }
}
