use crate::error::EngineError;
use analytics::{align_study, apply_volatility, compute_tables, DroppedSymbol, RrgResult};
use chrono::{Duration, NaiveDate};
use core_types::{DailyBar, RrgRequest, Study, TailInterval};
use futures::future::join_all;
use provider::QuoteProvider;
use std::collections::BTreeMap;
use std::sync::Arc;

pub mod error;

/// The orchestrator for one rotation-graph computation.
///
/// Stateless across requests: every `compute` call fetches, aligns and
/// normalizes independently and returns a fresh `RrgResult`. Cancelling a
/// request is dropping its future; nothing leaks into the next call.
pub struct RotationEngine {
    provider: Arc<dyn QuoteProvider>,
    /// Extra trading days fetched beyond the warm-up requirement so holidays
    /// and short weeks cannot starve the normalization windows.
    warmup_margin_days: usize,
}

impl RotationEngine {
    pub fn new(provider: Arc<dyn QuoteProvider>, warmup_margin_days: usize) -> Self {
        Self {
            provider,
            warmup_margin_days,
        }
    }

    /// Runs the full pipeline: fetch → align → (volatility) → normalize.
    ///
    /// Per-symbol `DataUnavailable` failures are dropped and recorded on the
    /// result; every other failure aborts with no partial result.
    pub async fn compute(&self, request: RrgRequest) -> Result<RrgResult, EngineError> {
        request.validate()?;

        let start = self.fetch_start(&request);
        tracing::info!(
            benchmark = %request.benchmark,
            symbols = request.symbols.len(),
            study = %request.study,
            %start,
            end = %request.end_date,
            "computing relative rotation"
        );

        let (histories, benchmark_history, mut dropped) = self.fetch_all(&request, start).await?;

        let min_rows = request.long_period + request.short_period;
        let mut aligned = align_study(
            &histories,
            &request.benchmark,
            &benchmark_history,
            request.study,
            request.end_date,
            min_rows,
        )?;

        if request.study == Study::Volatility {
            aligned = apply_volatility(&aligned, request.window, request.trading_periods)?;
        }

        // The aligner and the volatility transform both exclude symbols with
        // no usable rows; collect them after the last excluding stage.
        for symbol in aligned.dropped() {
            dropped.push(DroppedSymbol {
                symbol: symbol.clone(),
                reason: "no usable rows in the aligned range".to_string(),
            });
        }

        let tables = compute_tables(&aligned, request.long_period, request.short_period)?;

        if !dropped.is_empty() {
            tracing::warn!(?dropped, "request completed with dropped symbols");
        }

        Ok(RrgResult::new(
            request,
            aligned,
            tables.ratio,
            tables.momentum,
            dropped,
        ))
    }

    /// Fetches every symbol plus the benchmark concurrently and joins the
    /// results deterministically by ticker. Completion order never affects
    /// the output: the maps are keyed, not appended.
    async fn fetch_all(
        &self,
        request: &RrgRequest,
        start: NaiveDate,
    ) -> Result<
        (
            BTreeMap<String, Vec<DailyBar>>,
            Vec<DailyBar>,
            Vec<DroppedSymbol>,
        ),
        EngineError,
    > {
        let mut tickers: Vec<String> = request.symbols.clone();
        tickers.sort();
        tickers.dedup();
        // The benchmark is the frame of reference, never a basket member.
        tickers.retain(|ticker| *ticker != request.benchmark);

        let handles: Vec<_> = tickers
            .iter()
            .chain(std::iter::once(&request.benchmark))
            .cloned()
            .map(|ticker| {
                let provider = Arc::clone(&self.provider);
                let end = request.end_date;
                tokio::spawn(async move {
                    let bars = provider.fetch_daily_history(&ticker, start, end).await;
                    (ticker, bars)
                })
            })
            .collect();

        let mut histories: BTreeMap<String, Vec<DailyBar>> = BTreeMap::new();
        let mut benchmark_history: Option<Vec<DailyBar>> = None;
        let mut dropped: Vec<DroppedSymbol> = Vec::new();

        for joined in join_all(handles).await {
            let (ticker, outcome) = joined?;
            let is_benchmark = ticker == request.benchmark;
            match outcome {
                Ok(bars) if is_benchmark => benchmark_history = Some(bars),
                Ok(bars) => {
                    histories.insert(ticker, bars);
                }
                Err(error) if error.is_recoverable() => {
                    if is_benchmark {
                        return Err(EngineError::BenchmarkUnavailable(ticker));
                    }
                    tracing::warn!(symbol = %ticker, %error, "dropping symbol");
                    dropped.push(DroppedSymbol {
                        symbol: ticker,
                        reason: error.to_string(),
                    });
                }
                Err(error) => return Err(error.into()),
            }
        }

        let benchmark_history = benchmark_history
            .ok_or_else(|| EngineError::BenchmarkUnavailable(request.benchmark.clone()))?;

        Ok((histories, benchmark_history, dropped))
    }

    /// The first calendar date to fetch from.
    ///
    /// Sized so the aligned index holds the normalization warm-up, the
    /// volatility window when applicable, and enough post-warm-up rows to
    /// draw full tails; trading days are converted to calendar days with
    /// weekend and holiday slack.
    fn fetch_start(&self, request: &RrgRequest) -> NaiveDate {
        let volatility_rows = if request.study == Study::Volatility {
            request.window + 1
        } else {
            0
        };
        let tail_rows = request.tail_periods
            * match request.tail_interval {
                TailInterval::Week => 5,
                TailInterval::Month => 21,
            };
        let trading_days = request.long_period
            + request.short_period
            + volatility_rows
            + tail_rows
            + self.warmup_margin_days;

        // Five trading days per seven calendar days, plus fixed slack.
        let calendar_days = (trading_days as i64 * 7 + 4) / 5 + 10;
        request.end_date - Duration::days(calendar_days)
    }
}
