use crate::errors::RiskError;
use crate::models::{AlignedReturns, ReturnHistory, ReturnPoint};
use chrono::NaiveDate;
use std::collections::{BTreeMap, BTreeSet};
use tracing::warn;

/// Minimum aligned observations required for a real metrics calculation.
pub const MIN_ALIGNED_POINTS: usize = 30;

/// Align per-symbol return series to the benchmark's trading calendar.
///
/// Dates are intersected across the benchmark and every symbol series;
/// anything outside the common calendar is dropped, then the window is
/// trimmed to the trailing `lookback_days` dates. Pure transformation:
/// fetching raw prices is the market-data collaborator's job.
///
/// # Errors
/// `RiskError::InsufficientData` when fewer than [`MIN_ALIGNED_POINTS`]
/// dates survive the intersection. Callers computing metrics must catch
/// this and substitute the neutral default bundle.
pub fn align_returns(
    historical: &ReturnHistory,
    benchmark: &[ReturnPoint],
    lookback_days: i64,
) -> Result<AlignedReturns, RiskError> {
    if historical.is_empty() {
        return Err(RiskError::InsufficientData {
            points: 0,
            required: MIN_ALIGNED_POINTS,
        });
    }

    let by_date = |points: &[ReturnPoint]| -> BTreeMap<NaiveDate, f64> {
        points.iter().map(|p| (p.date, p.daily_return)).collect()
    };

    let bench_map = by_date(benchmark);
    let symbol_maps: BTreeMap<&String, BTreeMap<NaiveDate, f64>> = historical
        .iter()
        .map(|(symbol, points)| (symbol, by_date(points)))
        .collect();

    // Intersect calendars, starting from the benchmark's.
    let mut common: BTreeSet<NaiveDate> = bench_map.keys().copied().collect();
    for (symbol, map) in &symbol_maps {
        let before = common.len();
        common.retain(|date| map.contains_key(date));
        if common.len() < before {
            warn!(
                "dropped {} non-overlapping dates aligning {}",
                before - common.len(),
                symbol
            );
        }
    }

    // Trailing window of at most lookback_days trading dates.
    let window = lookback_days.max(0) as usize;
    let dates: Vec<NaiveDate> = common
        .iter()
        .rev()
        .take(window)
        .copied()
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();

    if dates.len() < MIN_ALIGNED_POINTS {
        return Err(RiskError::InsufficientData {
            points: dates.len(),
            required: MIN_ALIGNED_POINTS,
        });
    }

    let mut aligned = BTreeMap::new();
    for (symbol, map) in &symbol_maps {
        let series: Vec<f64> = dates.iter().map(|d| map[d]).collect();
        aligned.insert((*symbol).clone(), series);
    }
    let benchmark_series: Vec<f64> = dates.iter().map(|d| bench_map[d]).collect();

    Ok(AlignedReturns {
        symbols: aligned.keys().cloned().collect(),
        dates,
        by_symbol: aligned,
        benchmark: benchmark_series,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn series(start: &str, returns: &[f64]) -> Vec<ReturnPoint> {
        let start = start.parse::<NaiveDate>().unwrap();
        returns
            .iter()
            .enumerate()
            .map(|(i, &r)| ReturnPoint::new(start + Duration::days(i as i64), r))
            .collect()
    }

    fn constant_series(start: &str, value: f64, len: usize) -> Vec<ReturnPoint> {
        series(start, &vec![value; len])
    }

    #[test]
    fn test_alignment_drops_non_overlapping_dates() {
        let mut historical = ReturnHistory::new();
        // Symbol starts five days after the benchmark.
        historical.insert("AAA".to_string(), constant_series("2024-01-06", 0.01, 40));
        let benchmark = constant_series("2024-01-01", 0.005, 45);

        let aligned = align_returns(&historical, &benchmark, 252).unwrap();
        assert_eq!(aligned.len(), 40);
        assert_eq!(aligned.dates[0], "2024-01-06".parse::<NaiveDate>().unwrap());
        assert_eq!(aligned.by_symbol["AAA"].len(), 40);
        assert_eq!(aligned.benchmark.len(), 40);
    }

    #[test]
    fn test_lookback_trims_to_trailing_window() {
        let mut historical = ReturnHistory::new();
        historical.insert("AAA".to_string(), constant_series("2024-01-01", 0.01, 100));
        let benchmark = constant_series("2024-01-01", 0.005, 100);

        let aligned = align_returns(&historical, &benchmark, 60).unwrap();
        assert_eq!(aligned.len(), 60);
        // Last benchmark date survives; the head is trimmed.
        assert_eq!(
            *aligned.dates.last().unwrap(),
            "2024-01-01".parse::<NaiveDate>().unwrap() + Duration::days(99)
        );
    }

    #[test]
    fn test_too_few_aligned_points_is_insufficient_data() {
        let mut historical = ReturnHistory::new();
        historical.insert("AAA".to_string(), constant_series("2024-01-01", 0.01, 10));
        let benchmark = constant_series("2024-01-01", 0.005, 10);

        let err = align_returns(&historical, &benchmark, 252).unwrap_err();
        match err {
            RiskError::InsufficientData { points, required } => {
                assert_eq!(points, 10);
                assert_eq!(required, MIN_ALIGNED_POINTS);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_disjoint_calendars_are_insufficient() {
        let mut historical = ReturnHistory::new();
        historical.insert("AAA".to_string(), constant_series("2024-01-01", 0.01, 40));
        let benchmark = constant_series("2025-01-01", 0.005, 40);

        assert!(align_returns(&historical, &benchmark, 252).is_err());
    }
}
