use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One observation in a daily return series.
///
/// Returns are decimal fractions (0.01 = +1% on the day).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ReturnPoint {
    pub date: NaiveDate,
    pub daily_return: f64,
}

impl ReturnPoint {
    pub fn new(date: NaiveDate, daily_return: f64) -> Self {
        Self { date, daily_return }
    }
}

/// Per-symbol return series keyed by symbol.
///
/// A `BTreeMap` keeps iteration order deterministic, which matters for the
/// pairwise correlation sweep and the seeded stress draws.
pub type ReturnHistory = BTreeMap<String, Vec<ReturnPoint>>;

/// Return series for all holdings and the benchmark, restricted to the
/// intersection of their trading calendars.
///
/// Invariant: every vector in `by_symbol` and `benchmark` has exactly
/// `dates.len()` entries, in the same date order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlignedReturns {
    pub dates: Vec<NaiveDate>,
    pub symbols: Vec<String>,
    pub by_symbol: BTreeMap<String, Vec<f64>>,
    pub benchmark: Vec<f64>,
}

impl AlignedReturns {
    /// Number of aligned trading days.
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }
}
