use crate::align::{series_on_index, AlignedStudy};
use crate::error::AnalyticsError;
use crate::series::StudySeries;
use chrono::NaiveDate;
use statrs::statistics::Statistics;
use std::collections::BTreeMap;

/// Converts one aligned price series into rolling annualized realized
/// volatility: the population standard deviation of log returns over
/// `window` periods, scaled by sqrt(`trading_periods`).
///
/// The first `window` dates are consumed as warm-up (one row for the return
/// shift, `window - 1` for the rolling window) and are absent from the output.
pub fn realized_volatility(
    series: &StudySeries,
    window: usize,
    trading_periods: usize,
) -> StudySeries {
    let values = series.values();
    let n = values.len();
    if n <= window {
        return StudySeries::new(series.ticker(), Vec::new(), Vec::new());
    }

    let returns: Vec<f64> = values.windows(2).map(|w| (w[1] / w[0]).ln()).collect();
    let annualizer = (trading_periods as f64).sqrt();

    let mut dates = Vec::with_capacity(n - window);
    let mut vols = Vec::with_capacity(n - window);
    for i in window..n {
        // Return j covers the move into value j + 1.
        let slice = &returns[i - window..i];
        vols.push(slice.population_std_dev() * annualizer);
        dates.push(series.dates()[i]);
    }

    StudySeries::new(series.ticker(), dates, vols)
}

/// Applies the volatility transform to every aligned series and re-aligns the
/// result under the same rules as the original join: each series loses the
/// warm-up prefix, and dates where any transformed value is non-finite or
/// non-positive leave the index. A flat price stretch has zero volatility, so
/// the downstream ratio is undefined there just as it would be for a zero
/// price.
pub fn apply_volatility(
    aligned: &AlignedStudy,
    window: usize,
    trading_periods: usize,
) -> Result<AlignedStudy, AnalyticsError> {
    let benchmark = realized_volatility(aligned.benchmark(), window, trading_periods);
    let benchmark_points = usable_points(&benchmark);
    if benchmark_points.is_empty() {
        return Err(AnalyticsError::InsufficientHistory {
            rows: aligned.len(),
            required: window + 1,
            symbols: vec![aligned.benchmark().ticker().to_string()],
        });
    }

    let mut kept: BTreeMap<String, BTreeMap<NaiveDate, f64>> = BTreeMap::new();
    let mut dropped: Vec<String> = Vec::new();
    for (symbol, series) in aligned.symbols() {
        let points = usable_points(&realized_volatility(series, window, trading_periods));
        if points.is_empty() {
            tracing::warn!(symbol, "excluded after the volatility transform: no usable rows");
            dropped.push(symbol.clone());
        } else {
            kept.insert(symbol.clone(), points);
        }
    }

    if kept.is_empty() {
        return Err(AnalyticsError::NoValidSymbols);
    }

    let mut index: Vec<NaiveDate> = benchmark_points.keys().copied().collect();
    for points in kept.values() {
        index.retain(|date| points.contains_key(date));
    }

    let benchmark = series_on_index(aligned.benchmark().ticker(), &benchmark_points, &index);
    let symbols = kept
        .iter()
        .map(|(symbol, points)| (symbol.clone(), series_on_index(symbol, points, &index)))
        .collect();

    Ok(aligned.with_transformed(index, benchmark, symbols, dropped))
}

/// Finite, positive values only: zero volatility cannot be a ratio
/// denominator, and a log of it is undefined.
fn usable_points(series: &StudySeries) -> BTreeMap<NaiveDate, f64> {
    series
        .iter()
        .filter(|(_, value)| value.is_finite() && *value > 0.0)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::align::align_study;
    use crate::engine::compute_tables;
    use chrono::NaiveDate;
    use core_types::{DailyBar, Study};
    use rust_decimal::prelude::FromPrimitive;
    use rust_decimal::Decimal;

    fn series(values: &[f64]) -> StudySeries {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let dates = (0..values.len() as i64)
            .map(|i| start + chrono::Duration::days(i))
            .collect();
        StudySeries::new("TEST", dates, values.to_vec())
    }

    fn bar(date: NaiveDate, close: f64) -> DailyBar {
        let px = Decimal::from_f64(close).unwrap();
        DailyBar {
            date,
            open: px,
            high: px,
            low: px,
            close: px,
            volume: Decimal::from(1000),
        }
    }

    fn weekday_history(count: usize, f: impl Fn(usize) -> f64) -> Vec<DailyBar> {
        let mut date = NaiveDate::from_ymd_opt(2023, 1, 2).unwrap();
        let mut bars = Vec::with_capacity(count);
        for i in 0..count {
            bars.push(bar(date, f(i)));
            date += chrono::Duration::days(1);
            while chrono::Datelike::weekday(&date).number_from_monday() > 5 {
                date += chrono::Duration::days(1);
            }
        }
        bars
    }

    #[test]
    fn constant_growth_has_zero_volatility() {
        // Constant log returns: population std dev is exactly zero.
        let values: Vec<f64> = (0..30).map(|i| 100.0 * 1.01f64.powi(i)).collect();
        let vol = realized_volatility(&series(&values), 5, 252);

        assert_eq!(vol.len(), 30 - 5);
        assert!(vol.values().iter().all(|v| v.abs() < 1e-9));
    }

    #[test]
    fn warm_up_prefix_is_absent() {
        let values: Vec<f64> = (0..10).map(|i| 100.0 + i as f64).collect();
        let input = series(&values);
        let vol = realized_volatility(&input, 4, 252);

        assert_eq!(vol.len(), 6);
        assert_eq!(vol.dates().first(), input.dates().get(4));
        assert!(vol.values().iter().all(|v| v.is_finite() && *v >= 0.0));
    }

    #[test]
    fn too_short_series_yields_empty_output() {
        let values = [100.0, 101.0, 102.0];
        let vol = realized_volatility(&series(&values), 5, 252);
        assert!(vol.is_empty());
    }

    #[test]
    fn flat_benchmark_stretch_leaves_the_index_not_the_request() {
        // The benchmark is pinned for 20 days, so every 10-return window
        // inside the stretch has zero volatility and the downstream ratio is
        // undefined on those dates.
        let benchmark = weekday_history(160, |i| {
            if (60..80).contains(&i) {
                105.0
            } else {
                100.0 * 1.001f64.powi(i as i32) * (1.0 + 0.01 * (i as f64 * 0.31).sin())
            }
        });
        let mut histories = BTreeMap::new();
        histories.insert(
            "AAA".to_string(),
            weekday_history(160, |i| {
                110.0 * 1.001f64.powi(i as i32) * (1.0 + 0.04 * (i as f64 * 0.21).sin())
            }),
        );
        let end = benchmark.last().unwrap().date;
        let aligned =
            align_study(&histories, "BENCH", &benchmark, Study::Price, end, 35).unwrap();

        let vol = apply_volatility(&aligned, 10, 252).unwrap();

        // Warm-up plus the zero-volatility stretch are gone from the index.
        assert!(vol.len() < aligned.len() - 10);
        assert!(vol
            .benchmark()
            .values()
            .iter()
            .all(|v| v.is_finite() && *v > 0.0));
        for series in vol.symbols().values() {
            assert_eq!(series.dates(), vol.dates());
        }

        // The request as a whole still computes.
        let tables = compute_tables(&vol, 30, 5).unwrap();
        assert!(!tables.ratio.is_empty());
    }

    #[test]
    fn fully_flat_symbol_is_excluded_not_fatal() {
        let benchmark = weekday_history(60, |i| {
            100.0 * 1.001f64.powi(i as i32) * (1.0 + 0.02 * (i as f64 * 0.4).sin())
        });
        let mut histories = BTreeMap::new();
        histories.insert("FLAT".to_string(), weekday_history(60, |_| 50.0));
        histories.insert(
            "GOOD".to_string(),
            weekday_history(60, |i| {
                70.0 * 1.001f64.powi(i as i32) * (1.0 + 0.03 * (i as f64 * 0.25).sin())
            }),
        );
        let end = benchmark.last().unwrap().date;
        let aligned =
            align_study(&histories, "BENCH", &benchmark, Study::Price, end, 10).unwrap();

        let vol = apply_volatility(&aligned, 5, 252).unwrap();

        assert!(vol.symbols().contains_key("GOOD"));
        assert!(!vol.symbols().contains_key("FLAT"));
        assert_eq!(vol.dropped(), &["FLAT".to_string()]);
    }
}
