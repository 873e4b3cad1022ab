use crate::error::ProviderError;
use crate::QuoteProvider;
use async_trait::async_trait;
use chrono::NaiveDate;
use core_types::{DailyBar, DataSource};
use rust_decimal::Decimal;
use serde::Deserialize;

/// The exchange-operated quote source, backed by the Cboe delayed-quotes
/// historical charts API.
///
/// Cboe serves the full listed history per ticker as a single document, so the
/// requested range is applied client-side after decoding.
#[derive(Clone)]
pub struct CboeProvider {
    client: reqwest::Client,
    base_url: String,
}

impl CboeProvider {
    pub fn new(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl QuoteProvider for CboeProvider {
    async fn fetch_daily_history(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DailyBar>, ProviderError> {
        let url = format!(
            "{}/api/global/delayed_quotes/charts/historical/{}.json",
            self.base_url,
            symbol.to_ascii_uppercase()
        );

        let response = self.client.get(&url).send().await?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            // Cboe answers 404 for tickers it does not list.
            return Err(ProviderError::DataUnavailable {
                symbol: symbol.to_string(),
            });
        }
        if !status.is_success() {
            return Err(ProviderError::Status {
                symbol: symbol.to_string(),
                status,
            });
        }

        let body = response.text().await?;
        let history: HistoricalChart = serde_json::from_str(&body)
            .map_err(|e| ProviderError::Deserialization(e.to_string()))?;

        parse_history(symbol, history, start, end)
    }

    fn source(&self) -> DataSource {
        DataSource::Cboe
    }
}

// --- Response schema -------------------------------------------------------

#[derive(Deserialize)]
struct HistoricalChart {
    data: Vec<HistoricalRow>,
}

#[derive(Deserialize)]
struct HistoricalRow {
    date: NaiveDate,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: f64,
}

/// Converts the decoded document into daily bars within `[start, end]`,
/// sorted ascending with duplicate dates collapsed to the first occurrence.
fn parse_history(
    symbol: &str,
    history: HistoricalChart,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<DailyBar>, ProviderError> {
    let mut rows: Vec<HistoricalRow> = history
        .data
        .into_iter()
        .filter(|row| row.date >= start && row.date <= end)
        .collect();
    rows.sort_by_key(|row| row.date);

    let mut bars: Vec<DailyBar> = Vec::with_capacity(rows.len());
    for row in rows {
        if bars.last().map(|b| b.date) == Some(row.date) {
            continue;
        }
        bars.push(DailyBar {
            date: row.date,
            open: to_decimal(row.open, symbol)?,
            high: to_decimal(row.high, symbol)?,
            low: to_decimal(row.low, symbol)?,
            close: to_decimal(row.close, symbol)?,
            volume: to_decimal(row.volume, symbol)?,
        });
    }

    if bars.is_empty() {
        return Err(ProviderError::DataUnavailable {
            symbol: symbol.to_string(),
        });
    }

    Ok(bars)
}

fn to_decimal(value: f64, symbol: &str) -> Result<Decimal, ProviderError> {
    Decimal::from_f64_retain(value).ok_or_else(|| {
        ProviderError::InvalidData(format!("non-finite value {} for '{}'", value, symbol))
    })
}
