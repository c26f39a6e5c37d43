use crate::{Error, Result};
use std::time::Duration;

/// Sleep between poll cycles when no override is configured.
pub const DEFAULT_RETRY_PERIOD: Duration = Duration::from_secs(600);

/// Immutable bot configuration, built once at startup and passed into the
/// source/notifier constructors.
#[derive(Debug, Clone)]
pub struct BotConfig {
    pub practicum_token: String,
    pub telegram_token: String,
    pub telegram_chat_id: String,
    /// Optional status API endpoint override; the production default lives
    /// with the Practicum connector.
    pub endpoint: Option<String>,
    pub retry_period: Duration,
}

impl BotConfig {
    #[tracing::instrument(level = "debug")]
    pub fn from_env() -> Result<Self> {
        let practicum_token = require_env("PRACTICUM_TOKEN")?;
        let telegram_token = require_env("TELEGRAM_TOKEN")?;
        let telegram_chat_id = require_env("TELEGRAM_CHAT_ID")?;

        let endpoint = std::env::var("STATUSWATCH_ENDPOINT")
            .ok()
            .filter(|v| !v.trim().is_empty());
        let retry_secs = std::env::var("STATUSWATCH_RETRY_PERIOD_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(DEFAULT_RETRY_PERIOD.as_secs());

        let cfg = Self {
            practicum_token,
            telegram_token,
            telegram_chat_id,
            endpoint,
            retry_period: Duration::from_secs(retry_secs),
        };
        cfg.validate()?;
        Ok(cfg)
    }

    #[tracing::instrument(level = "debug", skip(self))]
    pub fn validate(&self) -> Result<()> {
        if self.practicum_token.trim().is_empty() {
            return Err(Error::MissingCredential("PRACTICUM_TOKEN".to_string()));
        }
        if self.telegram_token.trim().is_empty() {
            return Err(Error::MissingCredential("TELEGRAM_TOKEN".to_string()));
        }
        if self.telegram_chat_id.trim().is_empty() {
            return Err(Error::MissingCredential("TELEGRAM_CHAT_ID".to_string()));
        }
        if self.retry_period.is_zero() {
            return Err(Error::InvalidInput("retry_period must be > 0".to_string()));
        }
        Ok(())
    }
}

fn require_env(name: &'static str) -> Result<String> {
    std::env::var(name).map_err(|_| Error::MissingCredential(name.to_string()))
}
