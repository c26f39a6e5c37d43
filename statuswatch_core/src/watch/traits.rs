use crate::Result;
use crate::watch::models::Cursor;
use async_trait::async_trait;
use serde_json::Value;

/// A status source fetches the current state snapshot from a remote API.
///
/// Implementations live in `statuswatch_integrations` or test code.
#[async_trait]
pub trait StatusSource: Send + Sync {
    /// Source identifier (used in logs).
    fn id(&self) -> &'static str;

    /// Fetch the raw snapshot for everything newer than `cursor`.
    ///
    /// No internal retries: recovery is the watch engine's responsibility.
    async fn fetch(&self, cursor: Cursor) -> Result<Value>;
}

/// A notifier delivers a text message to a fixed destination.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Notifier identifier (used in logs).
    fn id(&self) -> &'static str;

    /// Deliver `text` to the configured destination.
    ///
    /// An error here must never abort the watch loop; the engine logs it and
    /// leaves its de-duplication state unchanged so the same content is
    /// retried on its next occurrence.
    async fn send(&self, text: &str) -> Result<()>;
}
