use crate::error::ProviderError;
use crate::QuoteProvider;
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime, TimeZone, Utc};
use core_types::{DailyBar, DataSource};
use rust_decimal::Decimal;
use serde::Deserialize;

/// The consumer-market quote source, backed by the Yahoo Finance chart API.
#[derive(Clone)]
pub struct YahooProvider {
    client: reqwest::Client,
    base_url: String,
}

// Yahoo rejects requests without a browser-looking user agent.
const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36";

impl YahooProvider {
    pub fn new(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl QuoteProvider for YahooProvider {
    async fn fetch_daily_history(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DailyBar>, ProviderError> {
        let url = format!("{}/v8/finance/chart/{}", self.base_url, symbol);
        // period2 is exclusive, so push it one day past the requested end.
        let period1 = start.and_time(NaiveTime::MIN).and_utc().timestamp();
        let period2 = (end + chrono::Duration::days(1))
            .and_time(NaiveTime::MIN)
            .and_utc()
            .timestamp();

        let response = self
            .client
            .get(&url)
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .query(&[
                ("period1", period1.to_string()),
                ("period2", period2.to_string()),
                ("interval", "1d".to_string()),
                ("events", "history".to_string()),
            ])
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            // Yahoo answers 404 for unknown or delisted tickers.
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
        let chart: ChartResponse = serde_json::from_str(&body)
            .map_err(|e| ProviderError::Deserialization(e.to_string()))?;

        let bars = parse_chart(symbol, chart)?;
        Ok(bars
            .into_iter()
            .filter(|bar| bar.date >= start && bar.date <= end)
            .collect())
    }

    fn source(&self) -> DataSource {
        DataSource::Yahoo
    }
}

// --- Response schema -------------------------------------------------------

#[derive(Deserialize)]
struct ChartResponse {
    chart: Chart,
}

#[derive(Deserialize)]
struct Chart {
    result: Option<Vec<ChartResult>>,
    error: Option<ChartError>,
}

#[derive(Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Deserialize)]
struct ChartResult {
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Deserialize)]
struct Indicators {
    quote: Vec<QuoteBlock>,
}

#[derive(Deserialize)]
struct QuoteBlock {
    open: Vec<Option<f64>>,
    high: Vec<Option<f64>>,
    low: Vec<Option<f64>>,
    close: Vec<Option<f64>>,
    volume: Vec<Option<f64>>,
}

/// Converts a decoded chart payload into daily bars.
///
/// Rows with any null field are dropped (holidays and half-session artifacts);
/// duplicate timestamps keep the first occurrence so dates stay strictly
/// increasing.
fn parse_chart(symbol: &str, chart: ChartResponse) -> Result<Vec<DailyBar>, ProviderError> {
    if let Some(error) = chart.chart.error {
        // "Not Found" style errors mean the ticker itself is bad.
        tracing::warn!(symbol, code = %error.code, description = %error.description, "chart error");
        return Err(ProviderError::DataUnavailable {
            symbol: symbol.to_string(),
        });
    }

    let result = chart
        .chart
        .result
        .and_then(|mut r| if r.is_empty() { None } else { Some(r.remove(0)) })
        .ok_or_else(|| ProviderError::DataUnavailable {
            symbol: symbol.to_string(),
        })?;

    let timestamps = result.timestamp.unwrap_or_default();
    let quote = result
        .indicators
        .quote
        .into_iter()
        .next()
        .ok_or_else(|| ProviderError::DataUnavailable {
            symbol: symbol.to_string(),
        })?;

    let mut bars: Vec<DailyBar> = Vec::with_capacity(timestamps.len());
    let mut dropped = 0usize;
    for (i, ts) in timestamps.iter().enumerate() {
        let row = (
            quote.open.get(i).copied().flatten(),
            quote.high.get(i).copied().flatten(),
            quote.low.get(i).copied().flatten(),
            quote.close.get(i).copied().flatten(),
            quote.volume.get(i).copied().flatten(),
        );
        let (Some(open), Some(high), Some(low), Some(close), Some(volume)) = row else {
            dropped += 1;
            continue;
        };

        let date = Utc
            .timestamp_opt(*ts, 0)
            .single()
            .ok_or_else(|| ProviderError::InvalidData(format!("invalid timestamp {}", ts)))?
            .date_naive();

        if bars.last().map(|b: &DailyBar| b.date) == Some(date) {
            continue;
        }

        bars.push(DailyBar {
            date,
            open: to_decimal(open, symbol)?,
            high: to_decimal(high, symbol)?,
            low: to_decimal(low, symbol)?,
            close: to_decimal(close, symbol)?,
            volume: to_decimal(volume, symbol)?,
        });
    }

    if dropped > 0 {
        tracing::debug!(symbol, dropped, "dropped incomplete rows from chart response");
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
