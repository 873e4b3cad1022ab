use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One aligned numeric series: a ticker plus ordered (date, value) pairs for
/// the selected study field.
///
/// Dates are unique and strictly increasing; the series is immutable once the
/// aligner has produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudySeries {
    ticker: String,
    dates: Vec<NaiveDate>,
    values: Vec<f64>,
}

impl StudySeries {
    /// Builds a series from parallel date/value vectors.
    ///
    /// Callers are responsible for passing sorted, deduplicated dates; the
    /// aligner is the only producer in this crate.
    pub fn new(ticker: impl Into<String>, dates: Vec<NaiveDate>, values: Vec<f64>) -> Self {
        debug_assert_eq!(dates.len(), values.len());
        debug_assert!(dates.windows(2).all(|w| w[0] < w[1]));
        Self {
            ticker: ticker.into(),
            dates,
            values,
        }
    }

    pub fn ticker(&self) -> &str {
        &self.ticker
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, f64)> + '_ {
        self.dates.iter().copied().zip(self.values.iter().copied())
    }
}

/// A date-indexed table with one column per symbol.
///
/// Ratio and Momentum tables of one result always carry identical date
/// indices and identical column sets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorTable {
    dates: Vec<NaiveDate>,
    columns: BTreeMap<String, Vec<f64>>,
}

impl IndicatorTable {
    pub fn new(dates: Vec<NaiveDate>, columns: BTreeMap<String, Vec<f64>>) -> Self {
        debug_assert!(columns.values().all(|c| c.len() == dates.len()));
        Self { dates, columns }
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    /// Column names in deterministic (lexicographic) order.
    pub fn symbols(&self) -> Vec<&str> {
        self.columns.keys().map(String::as_str).collect()
    }

    pub fn column(&self, symbol: &str) -> Option<&[f64]> {
        self.columns.get(symbol).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// The most recent row as (symbol, value) pairs, or `None` for an empty
    /// table.
    pub fn last_row(&self) -> Option<Vec<(&str, f64)>> {
        let last = self.dates.len().checked_sub(1)?;
        Some(
            self.columns
                .iter()
                .map(|(symbol, values)| (symbol.as_str(), values[last]))
                .collect(),
        )
    }
}
