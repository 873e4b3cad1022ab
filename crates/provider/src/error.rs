use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProviderError {
    /// The source answered but had no rows for this ticker (delisted or typo).
    /// Recoverable: the engine drops the symbol and proceeds.
    #[error("No data available for symbol '{symbol}'")]
    DataUnavailable { symbol: String },

    /// Transport-level failure (connection, TLS, timeout). Fatal to the
    /// whole request: the source itself is unreachable.
    #[error("Provider transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The source answered with a non-success HTTP status.
    #[error("Provider returned HTTP {status} for '{symbol}'")]
    Status {
        symbol: String,
        status: reqwest::StatusCode,
    },

    #[error("Failed to deserialize the provider response: {0}")]
    Deserialization(String),

    #[error("Invalid data from provider: {0}")]
    InvalidData(String),
}

impl ProviderError {
    /// Whether the engine may drop the affected symbol and carry on.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, ProviderError::DataUnavailable { .. })
    }
}
