use core_types::{DataSource, TailInterval};
use serde::Deserialize;

/// The root configuration structure for the application.
///
/// Every section is optional in `config.toml`; missing values fall back to
/// the conventional defaults below.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default)]
    pub defaults: AnalysisDefaults,
}

/// Endpoints and transport settings for the quote providers.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Base URL of the Yahoo Finance chart API.
    pub yahoo_base_url: String,
    /// Base URL of the Cboe delayed-quotes API.
    pub cboe_base_url: String,
    /// Per-request HTTP timeout. A hung provider must surface as an error,
    /// never stall the whole pipeline.
    pub timeout_secs: u64,
    /// Extra trading days fetched on top of the warm-up requirement so the
    /// relative-strength engine is never starved by holidays or short weeks.
    pub warmup_margin_days: usize,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            yahoo_base_url: "https://query1.finance.yahoo.com".to_string(),
            cboe_base_url: "https://cdn.cboe.com".to_string(),
            timeout_secs: 30,
            warmup_margin_days: 30,
        }
    }
}

/// Default analysis parameters, matching the conventional daily-data setup.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AnalysisDefaults {
    pub benchmark: String,
    pub long_period: usize,
    pub short_period: usize,
    pub window: usize,
    pub trading_periods: usize,
    pub tail_periods: usize,
    pub tail_interval: TailInterval,
    pub source: DataSource,
}

impl Default for AnalysisDefaults {
    fn default() -> Self {
        Self {
            benchmark: "SPY".to_string(),
            long_period: 252,
            short_period: 21,
            window: 21,
            trading_periods: 252,
            tail_periods: 30,
            tail_interval: TailInterval::Week,
            source: DataSource::Yahoo,
        }
    }
}
