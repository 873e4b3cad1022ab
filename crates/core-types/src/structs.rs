use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::enums::Study;

/// A single day of OHLCV history for one ticker.
///
/// Values stay in `Decimal` at the ingestion boundary; they cross to `f64`
/// only when a study series is extracted for the statistics pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyBar {
    pub date: NaiveDate,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub volume: Decimal,
}

impl DailyBar {
    /// Extracts the raw field a study is computed over.
    ///
    /// The volatility study starts from closing prices; the realized-volatility
    /// transform is applied downstream, after alignment.
    pub fn study_value(&self, study: Study) -> Option<f64> {
        match study {
            Study::Price | Study::Volatility => self.close.to_f64(),
            Study::Volume => self.volume.to_f64(),
        }
    }
}
