use serde::{Deserialize, Serialize};

/// Tunable inputs for one assessment pass.
///
/// All values are explicit so tests can pin them; nothing in the engine
/// reads implicit global state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Trading days of history to use (minimum 30).
    pub lookback_days: i64,
    /// Annualized risk-free rate for Sharpe/Sortino (e.g., 0.06 for 6%).
    pub risk_free_rate: f64,
    /// Fixed seed for the bounded scenario variance draws. When `None`,
    /// the seed is derived from the assessment timestamp so one run is
    /// internally consistent but successive runs differ.
    pub stress_seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            lookback_days: 252,
            risk_free_rate: 0.06,
            stress_seed: None,
        }
    }
}

/// Fixed thresholds for the alert rule set.
///
/// These are policy constants; tests assert exact boundary behavior, so any
/// tuning must stay deterministic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertThresholds {
    /// Risk score above which a high-severity alert fires.
    pub risk_score: f64,
    /// Annualized volatility above which a high-severity alert fires.
    pub volatility: f64,
    /// Concentration score above which a moderate-severity alert fires.
    pub concentration_score: f64,
    /// Maximum drawdown below which (more negative) a high-severity alert fires.
    pub max_drawdown: f64,
    /// Average pairwise correlation above which a moderate-severity alert fires.
    pub avg_correlation: f64,
}

impl Default for AlertThresholds {
    fn default() -> Self {
        Self {
            risk_score: 80.0,
            volatility: 0.35,
            concentration_score: 70.0,
            max_drawdown: -0.25,
            avg_correlation: 0.7,
        }
    }
}

/// Broad sector classification used by the stress engine's per-holding
/// impact heuristics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sector {
    Technology,
    Banking,
    Utilities,
    Other,
}

/// Symbol-to-sector lookup table.
///
/// The default covers the large NSE names the impact heuristics care about;
/// unknown symbols fall through to `Sector::Other`. An explicit table is
/// injectable so tests can control classification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectorTable {
    pub entries: Vec<(String, Sector)>,
}

impl Default for SectorTable {
    fn default() -> Self {
        let classify = |symbols: &[&str], sector: Sector| {
            symbols
                .iter()
                .map(|s| (s.to_string(), sector))
                .collect::<Vec<_>>()
        };

        let mut entries = Vec::new();
        entries.extend(classify(&["TCS", "INFY", "WIPRO", "TECHM"], Sector::Technology));
        entries.extend(classify(&["HDFC", "ICICI", "AXIS", "SBI"], Sector::Banking));
        entries.extend(classify(&["NTPC", "POWERGRID"], Sector::Utilities));
        Self { entries }
    }
}

impl SectorTable {
    /// Classify a symbol by substring match, the same heuristic the impact
    /// tables were calibrated against (e.g., "HDFCBANK" maps to banking).
    pub fn classify(&self, symbol: &str) -> Sector {
        let upper = symbol.to_uppercase();
        for (pattern, sector) in &self.entries {
            if upper.contains(pattern.as_str()) {
                return *sector;
            }
        }
        Sector::Other
    }
}
