//! Connectors implementing the core `StatusSource` trait.

pub mod practicum;
