use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::enums::{DataSource, Study, TailInterval};
use crate::error::CoreError;

/// The hard cap on basket size. The UI enforces the same limit; the engine
/// rejects larger sets defensively.
pub const MAX_SYMBOLS: usize = 20;

/// The full set of parameters for one rotation-graph computation.
///
/// Immutable once built: a new user request produces a new `RrgRequest` and a
/// new, independent result. Equality is derived so callers can memoize results
/// keyed on the request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RrgRequest {
    /// The basket of tickers to plot (1..=MAX_SYMBOLS entries).
    pub symbols: Vec<String>,
    /// The single ticker every relative-strength ratio is measured against.
    pub benchmark: String,
    pub study: Study,
    /// The last trading date included in the computation.
    pub end_date: NaiveDate,
    /// Lookback for the relative-strength normalization, in trading days.
    pub long_period: usize,
    /// Lookback for the momentum normalization, in trading days.
    pub short_period: usize,
    /// Rolling window for the realized-volatility study, in trading days.
    pub window: usize,
    /// Trading periods per year, used to annualize volatility.
    pub trading_periods: usize,
    /// Number of resampled trail points kept per symbol.
    pub tail_periods: usize,
    pub tail_interval: TailInterval,
    pub source: DataSource,
}

impl RrgRequest {
    /// Builds a request with the conventional defaults for everything except
    /// the basket and benchmark (daily data: 252/21 lookbacks, 21-day
    /// volatility window, 30 weekly tail points).
    pub fn new(symbols: Vec<String>, benchmark: impl Into<String>) -> Self {
        Self {
            symbols,
            benchmark: benchmark.into(),
            study: Study::Price,
            end_date: chrono::Utc::now().date_naive(),
            long_period: 252,
            short_period: 21,
            window: 21,
            trading_periods: 252,
            tail_periods: 30,
            tail_interval: TailInterval::Week,
            source: DataSource::Yahoo,
        }
    }

    /// Checks every constraint from the request contract.
    ///
    /// Called before any fetch or computation; a failure here means no partial
    /// work is performed at all.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.symbols.is_empty() {
            return Err(CoreError::InvalidParameters(
                "at least one symbol is required".to_string(),
            ));
        }
        if self.symbols.len() > MAX_SYMBOLS {
            return Err(CoreError::InvalidParameters(format!(
                "{} symbols requested, maximum is {}",
                self.symbols.len(),
                MAX_SYMBOLS
            )));
        }
        if self.symbols.iter().any(|s| s.trim().is_empty()) {
            return Err(CoreError::InvalidParameters(
                "symbols must not be blank".to_string(),
            ));
        }
        if self.benchmark.trim().is_empty() {
            return Err(CoreError::InvalidParameters(
                "benchmark must not be empty".to_string(),
            ));
        }
        if self.long_period == 0 {
            return Err(CoreError::InvalidParameters(
                "long_period must be a positive integer".to_string(),
            ));
        }
        if self.short_period == 0 {
            return Err(CoreError::InvalidParameters(
                "short_period must be a positive integer".to_string(),
            ));
        }
        if self.study == Study::Volatility && self.window < 2 {
            return Err(CoreError::InvalidParameters(
                "volatility window must be at least 2".to_string(),
            ));
        }
        if self.trading_periods == 0 {
            return Err(CoreError::InvalidParameters(
                "trading_periods must be a positive integer".to_string(),
            ));
        }
        if self.tail_periods == 0 {
            return Err(CoreError::InvalidParameters(
                "tail_periods must be a positive integer".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_request() -> RrgRequest {
        RrgRequest::new(
            vec!["XOM".to_string(), "CVX".to_string()],
            "XLE",
        )
    }

    #[test]
    fn default_request_is_valid() {
        assert!(valid_request().validate().is_ok());
    }

    #[test]
    fn zero_long_period_is_rejected() {
        let mut request = valid_request();
        request.long_period = 0;
        let err = request.validate().unwrap_err();
        assert!(matches!(err, CoreError::InvalidParameters(_)));
    }

    #[test]
    fn empty_symbol_set_is_rejected() {
        let mut request = valid_request();
        request.symbols.clear();
        assert!(request.validate().is_err());
    }

    #[test]
    fn oversized_basket_is_rejected() {
        let mut request = valid_request();
        request.symbols = (0..=MAX_SYMBOLS).map(|i| format!("SYM{}", i)).collect();
        assert!(request.validate().is_err());
    }

    #[test]
    fn blank_benchmark_is_rejected() {
        let mut request = valid_request();
        request.benchmark = "  ".to_string();
        assert!(request.validate().is_err());
    }
}
