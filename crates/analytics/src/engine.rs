use crate::align::AlignedStudy;
use crate::error::AnalyticsError;
use crate::series::IndicatorTable;
use statrs::statistics::Statistics;
use std::collections::BTreeMap;

/// Below this dispersion a z-window is treated as flat. A flat window is
/// genuinely neutral, so its z-score is 0 (value 100), not an error.
const FLAT_EPSILON: f64 = 1e-12;

/// The ratio and momentum tables of one computation. Invariant: identical
/// date indices and identical column sets.
#[derive(Debug, Clone)]
pub struct RsTables {
    pub ratio: IndicatorTable,
    pub momentum: IndicatorTable,
}

/// Computes normalized RS-Ratio and RS-Momentum for every aligned symbol.
///
/// Per symbol, with study values `P` and benchmark values `B` on the shared
/// index:
/// 1. relative series `R = P / B`;
/// 2. `rs = 100 * R / rolling_mean(R, long)`, then RS-Ratio
///    `= 100 + z(rs)` against the trailing window of up to `long` rs values;
/// 3. `roc = 100 * (rsr / rsr[short ago] - 1)`, then RS-Momentum
///    `= 100 + z(roc)` against the trailing window of up to `short` values.
///
/// Every z-score uses the population standard deviation; this shifts the
/// absolute scale slightly versus a sample-deviation rendition but not the
/// relative ranking. Warm-up rows are excluded, never zero-filled, and both
/// tables are truncated to the common fully-defined range.
///
/// Pure function: identical aligned inputs always produce identical tables.
pub fn compute_tables(
    aligned: &AlignedStudy,
    long_period: usize,
    short_period: usize,
) -> Result<RsTables, AnalyticsError> {
    let n = aligned.len();
    // First fully-defined row: `long` for the double-normalized ratio (one
    // extra so the second-stage z-window has two observations), plus `short`
    // for the rate of change, plus one more for the momentum z-window.
    let start = long_period + short_period + 1;
    if n <= start {
        return Err(AnalyticsError::InsufficientHistory {
            rows: n,
            required: start + 1,
            symbols: aligned.symbols().keys().cloned().collect(),
        });
    }

    let benchmark = aligned.benchmark().values();
    let dates = aligned.dates()[start..].to_vec();

    let mut ratio_columns: BTreeMap<String, Vec<f64>> = BTreeMap::new();
    let mut momentum_columns: BTreeMap<String, Vec<f64>> = BTreeMap::new();

    for (symbol, series) in aligned.symbols() {
        let (rsr, rsm) = normalize_symbol(series.values(), benchmark, long_period, short_period);

        let ratio = finite_tail(&rsr, start, symbol, "RS-Ratio")?;
        let momentum = finite_tail(&rsm, start, symbol, "RS-Momentum")?;

        ratio_columns.insert(symbol.clone(), ratio);
        momentum_columns.insert(symbol.clone(), momentum);
    }

    Ok(RsTables {
        ratio: IndicatorTable::new(dates.clone(), ratio_columns),
        momentum: IndicatorTable::new(dates, momentum_columns),
    })
}

/// Runs the two-stage normalization for one symbol. Returns full-length
/// arrays whose warm-up prefixes are NaN; callers truncate past the warm-up
/// and verify finiteness.
fn normalize_symbol(
    values: &[f64],
    benchmark: &[f64],
    long_period: usize,
    short_period: usize,
) -> (Vec<f64>, Vec<f64>) {
    let n = values.len();
    let relative: Vec<f64> = values
        .iter()
        .zip(benchmark)
        .map(|(p, b)| p / b)
        .collect();

    // Stage 1: relative-strength index, the ratio of R to its own rolling
    // mean over the long period, scaled to percent.
    let mut rs = vec![f64::NAN; n];
    for i in (long_period - 1)..n {
        let window = &relative[i + 1 - long_period..=i];
        rs[i] = 100.0 * relative[i] / window.mean();
    }

    // Stage 2: standardize the index against its own trailing mean/std and
    // map onto the reference scale centered at 100. The window expands from
    // two observations up to the full long period.
    let rs_first = long_period - 1;
    let mut rsr = vec![f64::NAN; n];
    for i in (rs_first + 1)..n {
        let lo = rs_first.max(i + 1 - long_period);
        rsr[i] = 100.0 + trailing_zscore(&rs[lo..=i]);
    }

    // Rate of change of RS-Ratio over the short period, in percent.
    let roc_first = long_period + short_period;
    let mut roc = vec![f64::NAN; n];
    for i in roc_first..n {
        let prev = rsr[i - short_period];
        if prev.abs() > FLAT_EPSILON {
            roc[i] = 100.0 * (rsr[i] / prev - 1.0);
        }
    }

    // Standardize the rate of change the same way, over the short period.
    let mut rsm = vec![f64::NAN; n];
    for i in (roc_first + 1)..n {
        let lo = roc_first.max(i + 1 - short_period);
        rsm[i] = 100.0 + trailing_zscore(&roc[lo..=i]);
    }

    (rsr, rsm)
}

/// Z-score of the last element of `window` against the whole window, using
/// the population standard deviation.
fn trailing_zscore(window: &[f64]) -> f64 {
    let x = window[window.len() - 1];
    let mean = window.mean();
    let std_dev = window.population_std_dev();
    if std_dev < FLAT_EPSILON {
        0.0
    } else {
        (x - mean) / std_dev
    }
}

/// Extracts the post-warm-up slice, rejecting any non-finite value: a NaN
/// leaking past the warm-up boundary must surface as an error, never as a
/// fake neutral reading.
fn finite_tail(
    values: &[f64],
    start: usize,
    symbol: &str,
    what: &str,
) -> Result<Vec<f64>, AnalyticsError> {
    let tail = &values[start..];
    if let Some(pos) = tail.iter().position(|v| !v.is_finite()) {
        return Err(AnalyticsError::Calculation(format!(
            "non-finite {} value for '{}' at row {}",
            what, symbol, pos
        )));
    }
    Ok(tail.to_vec())
}
