use crate::error::AnalyticsError;
use crate::series::StudySeries;
use chrono::NaiveDate;
use core_types::{DailyBar, Study};
use std::collections::BTreeMap;

/// The aligned view of one request: every surviving series restricted to the
/// common trading-date index.
#[derive(Debug, Clone)]
pub struct AlignedStudy {
    dates: Vec<NaiveDate>,
    benchmark: StudySeries,
    symbols: BTreeMap<String, StudySeries>,
    dropped: Vec<String>,
}

impl AlignedStudy {
    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn benchmark(&self) -> &StudySeries {
        &self.benchmark
    }

    pub fn symbols(&self) -> &BTreeMap<String, StudySeries> {
        &self.symbols
    }

    /// Symbols excluded during alignment because they had no usable rows.
    pub fn dropped(&self) -> &[String] {
        &self.dropped
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// Rebuilds the aligned view on a shorter index, carrying replacement
    /// values and any symbols the transform excluded (used by the volatility
    /// transform, which consumes a warm-up prefix and re-intersects the
    /// index).
    pub(crate) fn with_transformed(
        &self,
        dates: Vec<NaiveDate>,
        benchmark: StudySeries,
        symbols: BTreeMap<String, StudySeries>,
        newly_dropped: Vec<String>,
    ) -> AlignedStudy {
        let mut dropped = self.dropped.clone();
        dropped.extend(newly_dropped);
        AlignedStudy {
            dates,
            benchmark,
            symbols,
            dropped,
        }
    }
}

/// Joins per-symbol histories onto the intersection of their trading dates.
///
/// Only dates where every included series (benchmark included) has a usable
/// value survive: a relative-strength ratio is undefined on any other date,
/// and forward-filling would distort momentum. Symbols with no usable rows at
/// all are excluded rather than failing the request.
pub fn align_study(
    symbol_histories: &BTreeMap<String, Vec<DailyBar>>,
    benchmark_ticker: &str,
    benchmark_history: &[DailyBar],
    study: Study,
    end_date: NaiveDate,
    min_rows: usize,
) -> Result<AlignedStudy, AnalyticsError> {
    let benchmark_points = usable_points(benchmark_history, study, end_date);
    if benchmark_points.is_empty() {
        return Err(AnalyticsError::InsufficientHistory {
            rows: 0,
            required: min_rows,
            symbols: vec![benchmark_ticker.to_string()],
        });
    }

    // Collect usable per-symbol maps, excluding symbols with nothing usable.
    let mut kept: BTreeMap<String, BTreeMap<NaiveDate, f64>> = BTreeMap::new();
    let mut dropped: Vec<String> = Vec::new();
    for (symbol, bars) in symbol_histories {
        let points = usable_points(bars, study, end_date);
        if points.is_empty() {
            tracing::warn!(symbol, "excluded from alignment: no usable rows");
            dropped.push(symbol.clone());
        } else {
            kept.insert(symbol.clone(), points);
        }
    }

    if kept.is_empty() {
        return Err(AnalyticsError::NoValidSymbols);
    }

    // Intersection, not union: start from the benchmark's dates and retain
    // only those present in every kept symbol.
    let mut index: Vec<NaiveDate> = benchmark_points.keys().copied().collect();
    for points in kept.values() {
        index.retain(|date| points.contains_key(date));
    }

    if index.len() < min_rows {
        let mut limiting: Vec<String> = kept
            .iter()
            .filter(|(_, points)| points.len() < min_rows)
            .map(|(symbol, _)| symbol.clone())
            .collect();
        if benchmark_points.len() < min_rows {
            limiting.insert(0, benchmark_ticker.to_string());
        }
        if limiting.is_empty() {
            // Disjoint calendars: no single series is short, the overlap is.
            limiting = kept.keys().cloned().collect();
        }
        return Err(AnalyticsError::InsufficientHistory {
            rows: index.len(),
            required: min_rows,
            symbols: limiting,
        });
    }

    let benchmark = series_on_index(benchmark_ticker, &benchmark_points, &index);
    let symbols = kept
        .iter()
        .map(|(symbol, points)| (symbol.clone(), series_on_index(symbol, points, &index)))
        .collect();

    Ok(AlignedStudy {
        dates: index,
        benchmark,
        symbols,
        dropped,
    })
}

/// Extracts the study field per bar, keeping only finite, positive values on
/// or before the end date. Non-positive values would make the downstream
/// ratio or log-return undefined.
fn usable_points(bars: &[DailyBar], study: Study, end_date: NaiveDate) -> BTreeMap<NaiveDate, f64> {
    bars.iter()
        .filter(|bar| bar.date <= end_date)
        .filter_map(|bar| {
            let value = bar.study_value(study)?;
            (value.is_finite() && value > 0.0).then_some((bar.date, value))
        })
        .collect()
}

pub(crate) fn series_on_index(
    ticker: &str,
    points: &BTreeMap<NaiveDate, f64>,
    index: &[NaiveDate],
) -> StudySeries {
    let values = index.iter().map(|date| points[date]).collect();
    StudySeries::new(ticker, index.to_vec(), values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::prelude::FromPrimitive;
    use rust_decimal::Decimal;

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

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    #[test]
    fn index_is_the_intersection_of_all_dates() {
        let benchmark = vec![bar(day(2), 100.0), bar(day(3), 101.0), bar(day(4), 102.0)];
        let mut histories = BTreeMap::new();
        // AAA misses day 3, BBB has all three.
        histories.insert("AAA".to_string(), vec![bar(day(2), 10.0), bar(day(4), 11.0)]);
        histories.insert(
            "BBB".to_string(),
            vec![bar(day(2), 20.0), bar(day(3), 21.0), bar(day(4), 22.0)],
        );

        let aligned =
            align_study(&histories, "SPY", &benchmark, Study::Price, day(4), 1).unwrap();

        assert_eq!(aligned.dates(), &[day(2), day(4)]);
        assert_eq!(aligned.benchmark().values(), &[100.0, 102.0]);
        assert_eq!(aligned.symbols()["AAA"].values(), &[10.0, 11.0]);
        assert_eq!(aligned.symbols()["BBB"].values(), &[20.0, 22.0]);
    }

    #[test]
    fn dates_after_the_end_date_are_truncated() {
        let benchmark = vec![bar(day(2), 100.0), bar(day(3), 101.0)];
        let mut histories = BTreeMap::new();
        histories.insert("AAA".to_string(), vec![bar(day(2), 10.0), bar(day(3), 11.0)]);

        let aligned =
            align_study(&histories, "SPY", &benchmark, Study::Price, day(2), 1).unwrap();

        assert_eq!(aligned.dates(), &[day(2)]);
    }

    #[test]
    fn symbol_without_usable_rows_is_excluded_not_fatal() {
        let benchmark = vec![bar(day(2), 100.0), bar(day(3), 101.0)];
        let mut histories = BTreeMap::new();
        histories.insert("GOOD".to_string(), vec![bar(day(2), 10.0), bar(day(3), 11.0)]);
        histories.insert("EMPTY".to_string(), vec![]);

        let aligned =
            align_study(&histories, "SPY", &benchmark, Study::Price, day(3), 1).unwrap();

        assert_eq!(aligned.dropped(), &["EMPTY".to_string()]);
        assert!(aligned.symbols().contains_key("GOOD"));
        assert!(!aligned.symbols().contains_key("EMPTY"));
    }

    #[test]
    fn all_symbols_unusable_is_no_valid_symbols() {
        let benchmark = vec![bar(day(2), 100.0)];
        let mut histories = BTreeMap::new();
        histories.insert("EMPTY".to_string(), vec![]);

        let err =
            align_study(&histories, "SPY", &benchmark, Study::Price, day(3), 1).unwrap_err();
        assert!(matches!(err, AnalyticsError::NoValidSymbols));
    }

    #[test]
    fn short_intersection_is_insufficient_history() {
        let benchmark = vec![bar(day(2), 100.0), bar(day(3), 101.0)];
        let mut histories = BTreeMap::new();
        histories.insert("AAA".to_string(), vec![bar(day(2), 10.0)]);

        let err =
            align_study(&histories, "SPY", &benchmark, Study::Price, day(3), 2).unwrap_err();
        match err {
            AnalyticsError::InsufficientHistory { rows, required, symbols } => {
                assert_eq!(rows, 1);
                assert_eq!(required, 2);
                assert_eq!(symbols, vec!["AAA".to_string()]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn disjoint_calendars_name_every_kept_symbol() {
        let benchmark = vec![
            bar(day(2), 100.0),
            bar(day(3), 101.0),
            bar(day(4), 102.0),
            bar(day(5), 103.0),
        ];
        let mut histories = BTreeMap::new();
        // Each symbol has enough rows on its own; their dates never overlap.
        histories.insert("AAA".to_string(), vec![bar(day(2), 10.0), bar(day(3), 10.5)]);
        histories.insert("BBB".to_string(), vec![bar(day(4), 20.0), bar(day(5), 20.5)]);

        let err =
            align_study(&histories, "SPY", &benchmark, Study::Price, day(5), 2).unwrap_err();
        match err {
            AnalyticsError::InsufficientHistory { rows, symbols, .. } => {
                assert_eq!(rows, 0);
                assert_eq!(symbols, vec!["AAA".to_string(), "BBB".to_string()]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn non_positive_values_are_excluded_from_the_index() {
        let benchmark = vec![bar(day(2), 100.0), bar(day(3), 0.0), bar(day(4), 102.0)];
        let mut histories = BTreeMap::new();
        histories.insert(
            "AAA".to_string(),
            vec![bar(day(2), 10.0), bar(day(3), 10.5), bar(day(4), 11.0)],
        );

        let aligned =
            align_study(&histories, "SPY", &benchmark, Study::Price, day(4), 1).unwrap();

        // Day 3 has a zero benchmark value: the ratio is undefined there.
        assert_eq!(aligned.dates(), &[day(2), day(4)]);
    }
}
