use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    /// Caller error: the request failed validation. Nothing was fetched or
    /// computed.
    #[error("{0}")]
    InvalidParameters(#[from] core_types::CoreError),

    /// The data source itself failed (transport, auth, rate limit). Distinct
    /// from a single missing symbol, which is dropped instead.
    #[error("Provider failure: {0}")]
    Provider(#[from] provider::error::ProviderError),

    /// The benchmark has no data; without the denominator nothing can be
    /// computed, so this cannot be recovered by dropping a symbol.
    #[error("Benchmark '{0}' has no available data")]
    BenchmarkUnavailable(String),

    #[error(transparent)]
    Analytics(#[from] analytics::AnalyticsError),

    #[error("Fetch task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}
