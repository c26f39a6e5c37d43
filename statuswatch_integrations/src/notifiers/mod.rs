//! Notifiers implementing the core `Notifier` trait.

pub mod telegram;
