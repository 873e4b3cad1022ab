use crate::series::IndicatorTable;
use chrono::{Datelike, NaiveDate};
use core_types::TailInterval;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One plotted point of a rotation trail.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TailPoint {
    pub date: NaiveDate,
    pub ratio: f64,
    pub momentum: f64,
}

/// Reduces one symbol's full ratio/momentum history to its most recent
/// `tail_periods` points at the requested sampling interval: the last trading
/// day of each ISO week, or of each calendar month.
///
/// Points come back chronologically ascending so a renderer can draw a
/// directed trail ending at the present. A short history returns whatever
/// exists; never padded, never an error.
pub fn build_tail(
    ratio: &IndicatorTable,
    momentum: &IndicatorTable,
    symbol: &str,
    tail_periods: usize,
    interval: TailInterval,
) -> Vec<TailPoint> {
    debug_assert_eq!(ratio.dates(), momentum.dates());

    let (Some(ratio_col), Some(momentum_col)) = (ratio.column(symbol), momentum.column(symbol))
    else {
        return Vec::new();
    };

    // Walking the dates in order, the last row seen for a bucket wins, which
    // is exactly the last trading day of that week or month.
    let mut sampled: Vec<TailPoint> = Vec::new();
    let mut current_bucket: Option<(i32, u32)> = None;
    for (i, date) in ratio.dates().iter().enumerate() {
        let point = TailPoint {
            date: *date,
            ratio: ratio_col[i],
            momentum: momentum_col[i],
        };
        let bucket = bucket_of(*date, interval);
        if current_bucket == Some(bucket) {
            if let Some(last) = sampled.last_mut() {
                *last = point;
            }
        } else {
            current_bucket = Some(bucket);
            sampled.push(point);
        }
    }

    let skip = sampled.len().saturating_sub(tail_periods);
    sampled.split_off(skip)
}

/// Builds the tails for every symbol of the tables.
pub fn build_tails(
    ratio: &IndicatorTable,
    momentum: &IndicatorTable,
    tail_periods: usize,
    interval: TailInterval,
) -> BTreeMap<String, Vec<TailPoint>> {
    ratio
        .symbols()
        .into_iter()
        .map(|symbol| {
            (
                symbol.to_string(),
                build_tail(ratio, momentum, symbol, tail_periods, interval),
            )
        })
        .collect()
}

fn bucket_of(date: NaiveDate, interval: TailInterval) -> (i32, u32) {
    match interval {
        TailInterval::Week => {
            let week = date.iso_week();
            (week.year(), week.week())
        }
        TailInterval::Month => (date.year(), date.month()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A daily table over `count` weekdays with a single ramp column.
    fn daily_table(count: usize) -> (IndicatorTable, IndicatorTable) {
        let mut date = NaiveDate::from_ymd_opt(2023, 1, 2).unwrap();
        let mut dates = Vec::with_capacity(count);
        for _ in 0..count {
            dates.push(date);
            date += chrono::Duration::days(1);
            while date.weekday().number_from_monday() > 5 {
                date += chrono::Duration::days(1);
            }
        }
        let ratio: Vec<f64> = (0..count).map(|i| 100.0 + i as f64 * 0.01).collect();
        let momentum: Vec<f64> = (0..count).map(|i| 100.0 - i as f64 * 0.01).collect();
        let mut ratio_cols = BTreeMap::new();
        ratio_cols.insert("AAA".to_string(), ratio);
        let mut momentum_cols = BTreeMap::new();
        momentum_cols.insert("AAA".to_string(), momentum);
        (
            IndicatorTable::new(dates.clone(), ratio_cols),
            IndicatorTable::new(dates, momentum_cols),
        )
    }

    #[test]
    fn weekly_tail_is_bounded_ascending_and_one_point_per_week() {
        let (ratio, momentum) = daily_table(300);
        let tail = build_tail(&ratio, &momentum, "AAA", 5, TailInterval::Week);

        assert_eq!(tail.len(), 5);
        assert!(tail.windows(2).all(|w| w[0].date < w[1].date));

        let weeks: Vec<(i32, u32)> = tail
            .iter()
            .map(|p| {
                let week = p.date.iso_week();
                (week.year(), week.week())
            })
            .collect();
        let mut deduped = weeks.clone();
        deduped.dedup();
        assert_eq!(weeks, deduped);

        // The most recent point is the last row of the table.
        assert_eq!(tail.last().unwrap().date, *ratio.dates().last().unwrap());
    }

    #[test]
    fn monthly_tail_samples_the_last_trading_day_of_each_month() {
        let (ratio, momentum) = daily_table(65);
        let tail = build_tail(&ratio, &momentum, "AAA", 2, TailInterval::Month);

        assert_eq!(tail.len(), 2);
        for point in &tail[..tail.len() - 1] {
            // A sampled non-final point sits at a month boundary.
            let next_day = point.date + chrono::Duration::days(1);
            let mut end_of_month = point.date.month() != next_day.month();
            // Allow for weekends straddling the boundary.
            for offset in 2..=3 {
                let later = point.date + chrono::Duration::days(offset);
                end_of_month |= point.date.month() != later.month();
            }
            assert!(end_of_month, "{} is not a month end", point.date);
        }
    }

    #[test]
    fn short_history_returns_what_exists_without_padding() {
        let (ratio, momentum) = daily_table(8);
        let tail = build_tail(&ratio, &momentum, "AAA", 30, TailInterval::Week);

        // Eight weekdays span at most three ISO weeks.
        assert!(tail.len() <= 3);
        assert!(!tail.is_empty());
    }

    #[test]
    fn unknown_symbol_yields_empty_tail() {
        let (ratio, momentum) = daily_table(20);
        assert!(build_tail(&ratio, &momentum, "ZZZ", 5, TailInterval::Week).is_empty());
    }
}
