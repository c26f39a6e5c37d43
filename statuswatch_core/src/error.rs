use std::error::Error as StdError;

/// Common error type for `statuswatch_core`.
///
/// Network-facing implementations (status source, notifier) should preserve
/// the underlying error chain where possible via `Error::connectivity`.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("missing required credential: {0}")]
    MissingCredential(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("status api request failed: {context}")]
    Connectivity {
        context: String,
        #[source]
        source: Box<dyn StdError + Send + Sync + 'static>,
    },

    #[error("status api returned {status} ({reason}): {body}")]
    ResponseCode {
        status: u16,
        reason: String,
        body: String,
    },

    #[error("malformed status api response: {0}")]
    Shape(String),

    #[error("unknown homework status: {0}")]
    UnknownStatus(String),

    #[error("notification delivery failed: {0}")]
    Delivery(String),
}

impl Error {
    pub fn connectivity(
        context: impl Into<String>,
        source: impl StdError + Send + Sync + 'static,
    ) -> Self {
        Self::Connectivity {
            context: context.into(),
            source: Box::new(source),
        }
    }

    /// True for the one condition that must abort startup instead of being
    /// retried on the next cycle.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::MissingCredential(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
