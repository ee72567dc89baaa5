use serde::{Deserialize, Serialize};

/// A point-in-time view of one portfolio position.
///
/// Immutable input to a single assessment run; the portfolio store owns the
/// underlying rows and the engine only reads them. The asset weight is
/// always derived as `current_value / portfolio total value`, never stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HoldingSnapshot {
    pub symbol: String,
    pub name: Option<String>,
    pub current_value: f64,
}

impl HoldingSnapshot {
    pub fn new(symbol: impl Into<String>, current_value: f64) -> Self {
        Self {
            symbol: symbol.into(),
            name: None,
            current_value,
        }
    }
}

/// Total market value across a set of holdings.
pub fn total_value(holdings: &[HoldingSnapshot]) -> f64 {
    holdings.iter().map(|h| h.current_value.max(0.0)).sum()
}
