//! Statuswatch core library: the poll-detect-notify loop and its seams.

pub mod config;
pub mod error;
pub mod watch;

pub use config::{BotConfig, DEFAULT_RETRY_PERIOD};
pub use error::{Error, Result};
pub use watch::engine::{FAILURE_PREFIX, WatchEngine};
pub use watch::models::{Cursor, ReviewStatus, Snapshot, interpret};
pub use watch::traits::{Notifier, StatusSource};
