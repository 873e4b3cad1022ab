use crate::align::AlignedStudy;
use crate::series::{IndicatorTable, StudySeries};
use crate::tail::{build_tail, TailPoint};
use core_types::{RrgRequest, TailInterval};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The neutral reference value both oscillators are centered on; quadrant
/// dividers sit here on both axes.
pub const NEUTRAL: f64 = 100.0;

/// The four phases of the rotation cycle, read clockwise from top-right.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Quadrant {
    Leading,
    Weakening,
    Lagging,
    Improving,
}

impl Quadrant {
    /// Classifies a (RS-Ratio, RS-Momentum) reading against the neutral
    /// center.
    pub fn of(ratio: f64, momentum: f64) -> Self {
        match (ratio >= NEUTRAL, momentum >= NEUTRAL) {
            (true, true) => Quadrant::Leading,
            (true, false) => Quadrant::Weakening,
            (false, false) => Quadrant::Lagging,
            (false, true) => Quadrant::Improving,
        }
    }
}

impl std::fmt::Display for Quadrant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Quadrant::Leading => write!(f, "Leading"),
            Quadrant::Weakening => write!(f, "Weakening"),
            Quadrant::Lagging => write!(f, "Lagging"),
            Quadrant::Improving => write!(f, "Improving"),
        }
    }
}

/// A symbol that was requested but could not be served, with the reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DroppedSymbol {
    pub symbol: String,
    pub reason: String,
}

/// The immutable snapshot produced by one compute call.
///
/// Owns the aligned input series, both indicator tables, the request that
/// produced them, and any per-symbol drop notes. Performs no I/O and no
/// further computation beyond tail resampling; a new request produces a new,
/// independent instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RrgResult {
    request: RrgRequest,
    benchmark: StudySeries,
    symbols: BTreeMap<String, StudySeries>,
    ratio: IndicatorTable,
    momentum: IndicatorTable,
    dropped: Vec<DroppedSymbol>,
}

impl RrgResult {
    pub fn new(
        request: RrgRequest,
        aligned: AlignedStudy,
        ratio: IndicatorTable,
        momentum: IndicatorTable,
        dropped: Vec<DroppedSymbol>,
    ) -> Self {
        Self {
            request,
            benchmark: aligned.benchmark().clone(),
            symbols: aligned.symbols().clone(),
            ratio,
            momentum,
            dropped,
        }
    }

    pub fn request(&self) -> &RrgRequest {
        &self.request
    }

    pub fn benchmark_series(&self) -> &StudySeries {
        &self.benchmark
    }

    pub fn symbol_series(&self) -> &BTreeMap<String, StudySeries> {
        &self.symbols
    }

    pub fn ratio_table(&self) -> &IndicatorTable {
        &self.ratio
    }

    pub fn momentum_table(&self) -> &IndicatorTable {
        &self.momentum
    }

    /// Symbols dropped from the request, with reasons. A non-empty list means
    /// the result is a recorded partial success.
    pub fn dropped_symbols(&self) -> &[DroppedSymbol] {
        &self.dropped
    }

    /// The aligned study input as a date-indexed table: one column per
    /// symbol, plus the benchmark.
    pub fn study_table(&self) -> IndicatorTable {
        let mut columns: BTreeMap<String, Vec<f64>> = self
            .symbols
            .iter()
            .map(|(symbol, series)| (symbol.clone(), series.values().to_vec()))
            .collect();
        columns.insert(
            self.benchmark.ticker().to_string(),
            self.benchmark.values().to_vec(),
        );
        IndicatorTable::new(self.benchmark.dates().to_vec(), columns)
    }

    /// Builds the renderer-agnostic chart description.
    ///
    /// One trail (or a single latest point when `show_tails` is off) per
    /// symbol; the benchmark is the frame of reference and is never plotted.
    pub fn chart(
        &self,
        show_tails: bool,
        tail_periods: usize,
        tail_interval: TailInterval,
    ) -> ChartSpec {
        let periods = if show_tails { tail_periods } else { 1 };
        let series: Vec<ChartSeries> = self
            .ratio
            .symbols()
            .into_iter()
            .map(|symbol| ChartSeries {
                symbol: symbol.to_string(),
                points: build_tail(&self.ratio, &self.momentum, symbol, periods, tail_interval),
            })
            .collect();

        let (x_range, y_range) = axis_ranges(&series);

        ChartSpec {
            benchmark: self.benchmark.ticker().to_string(),
            study: self.request.study.to_string(),
            center: (NEUTRAL, NEUTRAL),
            x_range,
            y_range,
            series,
        }
    }
}

/// A renderer-agnostic description of the quadrant chart: axis ranges,
/// quadrant dividers at the neutral center, and one point or trail per
/// symbol. Any plotting backend can consume this directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSpec {
    pub benchmark: String,
    pub study: String,
    /// Quadrant dividers cross here (RS-Ratio, RS-Momentum).
    pub center: (f64, f64),
    pub x_range: (f64, f64),
    pub y_range: (f64, f64),
    pub series: Vec<ChartSeries>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSeries {
    pub symbol: String,
    /// Chronologically ascending; the last point is the present reading.
    pub points: Vec<TailPoint>,
}

/// Axis ranges covering every plotted point with a margin, always containing
/// the neutral center so all four quadrants are visible.
fn axis_ranges(series: &[ChartSeries]) -> ((f64, f64), (f64, f64)) {
    let mut x = (NEUTRAL - 1.0, NEUTRAL + 1.0);
    let mut y = (NEUTRAL - 1.0, NEUTRAL + 1.0);
    for chart_series in series {
        for point in &chart_series.points {
            x.0 = x.0.min(point.ratio);
            x.1 = x.1.max(point.ratio);
            y.0 = y.0.min(point.momentum);
            y.1 = y.1.max(point.momentum);
        }
    }
    let pad = |range: (f64, f64)| {
        let margin = ((range.1 - range.0) * 0.1).max(0.5);
        (range.0 - margin, range.1 + margin)
    };
    (pad(x), pad(y))
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

    const LONG: usize = 30;
    const SHORT: usize = 5;

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

    fn result_fixture() -> RrgResult {
        let mut date = NaiveDate::from_ymd_opt(2023, 1, 2).unwrap();
        let mut benchmark = Vec::new();
        let mut fast = Vec::new();
        let mut slow = Vec::new();
        for i in 0..120 {
            let level = 100.0 * 1.001f64.powi(i);
            benchmark.push(bar(date, level));
            fast.push(bar(date, level * (1.0 + 0.04 * (i as f64 * 0.2).sin())));
            slow.push(bar(date, level * (1.0 - 0.03 * (i as f64 * 0.15).cos())));
            date += chrono::Duration::days(1);
            while chrono::Datelike::weekday(&date).number_from_monday() > 5 {
                date += chrono::Duration::days(1);
            }
        }
        let end = benchmark.last().unwrap().date;

        let mut histories = BTreeMap::new();
        histories.insert("FAST".to_string(), fast);
        histories.insert("SLOW".to_string(), slow);

        let mut request = RrgRequest::new(
            vec!["FAST".to_string(), "SLOW".to_string()],
            "BENCH",
        );
        request.long_period = LONG;
        request.short_period = SHORT;
        request.end_date = end;

        let aligned =
            align_study(&histories, "BENCH", &benchmark, Study::Price, end, LONG + SHORT)
                .unwrap();
        let tables = compute_tables(&aligned, LONG, SHORT).unwrap();
        RrgResult::new(request, aligned, tables.ratio, tables.momentum, Vec::new())
    }

    #[test]
    fn chart_excludes_the_benchmark_and_centers_at_neutral() {
        let result = result_fixture();
        let chart = result.chart(true, 10, TailInterval::Week);

        assert_eq!(chart.center, (100.0, 100.0));
        let symbols: Vec<&str> = chart.series.iter().map(|s| s.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["FAST", "SLOW"]);
        assert!(!symbols.contains(&"BENCH"));
    }

    #[test]
    fn single_point_mode_keeps_one_point_per_symbol() {
        let result = result_fixture();
        let chart = result.chart(false, 30, TailInterval::Week);

        for series in &chart.series {
            assert_eq!(series.points.len(), 1);
            assert_eq!(
                series.points[0].date,
                *result.ratio_table().dates().last().unwrap()
            );
        }
    }

    #[test]
    fn axis_ranges_contain_every_plotted_point() {
        let result = result_fixture();
        let chart = result.chart(true, 10, TailInterval::Week);

        for series in &chart.series {
            for point in &series.points {
                assert!(point.ratio > chart.x_range.0 && point.ratio < chart.x_range.1);
                assert!(point.momentum > chart.y_range.0 && point.momentum < chart.y_range.1);
            }
        }
        assert!(chart.x_range.0 < NEUTRAL && chart.x_range.1 > NEUTRAL);
        assert!(chart.y_range.0 < NEUTRAL && chart.y_range.1 > NEUTRAL);
    }

    #[test]
    fn quadrants_split_at_the_neutral_center() {
        assert_eq!(Quadrant::of(101.0, 102.0), Quadrant::Leading);
        assert_eq!(Quadrant::of(101.0, 98.0), Quadrant::Weakening);
        assert_eq!(Quadrant::of(99.0, 98.0), Quadrant::Lagging);
        assert_eq!(Quadrant::of(99.0, 102.0), Quadrant::Improving);
    }

    #[test]
    fn study_table_includes_symbols_and_benchmark() {
        let result = result_fixture();
        let table = result.study_table();

        assert_eq!(table.symbols(), vec!["BENCH", "FAST", "SLOW"]);
        assert_eq!(table.len(), result.benchmark_series().len());
    }
}
