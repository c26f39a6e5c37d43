//! Implementations of the statuswatch seams: the Practicum status source
//! and the Telegram notifier.

pub mod connectors;
pub mod notifiers;

pub use connectors::practicum::PracticumSource;
pub use notifiers::telegram::TelegramNotifier;
