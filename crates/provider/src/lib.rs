use crate::error::ProviderError;
use async_trait::async_trait;
use chrono::NaiveDate;
use configuration::ProviderConfig;
use core_types::{DailyBar, DataSource};
use std::sync::Arc;
use std::time::Duration;

pub mod cboe;
pub mod error;
pub mod yahoo;

// --- Public API ---
pub use cboe::CboeProvider;
pub use yahoo::YahooProvider;

/// The generic, abstract interface for a daily-quote source.
///
/// This trait is the contract the rotation engine consumes, allowing the
/// underlying source (consumer feed, exchange feed, or a test double) to be
/// swapped out without the engine knowing which one it is talking to.
#[async_trait]
pub trait QuoteProvider: Send + Sync {
    /// Fetches daily OHLCV history for one ticker over `[start, end]`,
    /// ordered by ascending date.
    ///
    /// A ticker the source knows nothing about yields
    /// `ProviderError::DataUnavailable`; any other error means the source
    /// itself misbehaved and is fatal to the whole request.
    async fn fetch_daily_history(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DailyBar>, ProviderError>;

    /// Which configured source this provider serves.
    fn source(&self) -> DataSource;
}

/// Builds the concrete provider for a selected data source.
///
/// Adding a source means adding a `QuoteProvider` implementation and a match
/// arm here; nothing downstream branches on the source again.
pub fn provider_for(
    source: DataSource,
    config: &ProviderConfig,
) -> Result<Arc<dyn QuoteProvider>, ProviderError> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()?;

    Ok(match source {
        DataSource::Yahoo => Arc::new(YahooProvider::new(client, &config.yahoo_base_url)),
        DataSource::Cboe => Arc::new(CboeProvider::new(client, &config.cboe_base_url)),
    })
}
