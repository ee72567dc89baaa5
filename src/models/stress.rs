use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The fixed macro scenario catalogue entries.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioKind {
    MarketCrash,
    InterestRateShock,
    InflationSpike,
    CurrencyDevaluation,
    LiquidityCrisis,
}

impl ScenarioKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScenarioKind::MarketCrash => "market_crash",
            ScenarioKind::InterestRateShock => "interest_rate_shock",
            ScenarioKind::InflationSpike => "inflation_spike",
            ScenarioKind::CurrencyDevaluation => "currency_devaluation",
            ScenarioKind::LiquidityCrisis => "liquidity_crisis",
        }
    }
}

/// Definition of one stress scenario.
///
/// Scenarios are plain data owned by a `ScenarioCatalogue`, so tests can
/// inject a custom catalogue instead of relying on module globals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StressScenario {
    pub kind: ScenarioKind,
    pub name: String,
    pub description: String,
    /// Macro parameters behind the scenario, carried verbatim into results.
    pub parameters: serde_json::Value,
    /// Baseline portfolio shock in percent (negative = loss).
    pub base_shock_pct: f64,
    /// Bounds of the uniform variance draw applied to `base_shock_pct`.
    pub shock_band: (f64, f64),
    /// Multiplier applied to base volatility and max drawdown under stress.
    pub volatility_multiplier: f64,
    /// Scenario-specific multiplier on the recovery-time estimate.
    pub recovery_multiplier: f64,
    /// Scenario-specific dampener on the recovery probability (0.5-0.8).
    pub recovery_factor: f64,
}

/// The fixed five-scenario catalogue matching the production parameter set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioCatalogue {
    pub scenarios: Vec<StressScenario>,
}

impl Default for ScenarioCatalogue {
    fn default() -> Self {
        Self {
            scenarios: vec![
                StressScenario {
                    kind: ScenarioKind::MarketCrash,
                    name: "Market Crash (-30%)".to_string(),
                    description: "Broad market decline of 30%".to_string(),
                    parameters: serde_json::json!({
                        "market_shock": -0.30,
                        "correlation_increase": 0.2,
                    }),
                    base_shock_pct: -30.0,
                    shock_band: (0.8, 1.2),
                    volatility_multiplier: 2.5,
                    recovery_multiplier: 1.5,
                    recovery_factor: 0.8,
                },
                StressScenario {
                    kind: ScenarioKind::InterestRateShock,
                    name: "Interest Rate Shock (+200bp)".to_string(),
                    description: "Interest rates increase by 200 basis points".to_string(),
                    parameters: serde_json::json!({
                        "rate_shock": 0.02,
                        "duration_impact": -0.15,
                    }),
                    base_shock_pct: -15.0,
                    shock_band: (0.7, 1.3),
                    volatility_multiplier: 1.8,
                    recovery_multiplier: 2.0,
                    recovery_factor: 0.7,
                },
                StressScenario {
                    kind: ScenarioKind::InflationSpike,
                    name: "Inflation Spike (+300bp)".to_string(),
                    description: "Inflation increases by 300 basis points".to_string(),
                    parameters: serde_json::json!({
                        "inflation_shock": 0.03,
                        "real_return_impact": -0.20,
                    }),
                    base_shock_pct: -20.0,
                    shock_band: (0.6, 1.4),
                    volatility_multiplier: 1.6,
                    recovery_multiplier: 2.5,
                    recovery_factor: 0.6,
                },
                StressScenario {
                    kind: ScenarioKind::CurrencyDevaluation,
                    name: "Currency Devaluation (-15%)".to_string(),
                    description: "INR devaluation of 15% vs USD".to_string(),
                    parameters: serde_json::json!({
                        "currency_shock": -0.15,
                        "import_impact": -0.10,
                    }),
                    // Assumes roughly half the portfolio carries currency exposure.
                    base_shock_pct: -7.5,
                    shock_band: (0.3, 0.7),
                    volatility_multiplier: 1.4,
                    recovery_multiplier: 1.8,
                    recovery_factor: 0.75,
                },
                StressScenario {
                    kind: ScenarioKind::LiquidityCrisis,
                    name: "Liquidity Crisis".to_string(),
                    description: "Market liquidity dries up, bid-ask spreads widen".to_string(),
                    parameters: serde_json::json!({
                        "liquidity_impact": -0.25,
                        "volatility_spike": 2.0,
                    }),
                    base_shock_pct: -25.0,
                    shock_band: (0.5, 1.5),
                    volatility_multiplier: 3.0,
                    recovery_multiplier: 3.0,
                    recovery_factor: 0.5,
                },
            ],
        }
    }
}

/// Estimated impact of a scenario on a single holding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HoldingImpact {
    pub symbol: String,
    pub name: Option<String>,
    pub current_value: f64,
    /// Percentage change under stress (negative = loss).
    pub impact_percentage: f64,
    pub impact_amount: f64,
    pub stressed_value: f64,
}

/// Outcome of applying one stress scenario to the current portfolio.
///
/// Owned by the `RiskProfile` it was computed against; created with the
/// profile and never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StressTestResult {
    pub id: Uuid,
    pub risk_profile_id: Uuid,
    pub scenario_type: ScenarioKind,
    pub scenario_name: String,
    pub scenario_description: String,
    pub scenario_parameters: serde_json::Value,
    pub portfolio_impact_percentage: f64,
    pub portfolio_impact_amount: f64,
    pub stressed_volatility: f64,
    pub stressed_var_95: f64,
    pub stressed_var_99: f64,
    pub stressed_max_drawdown: f64,
    pub estimated_recovery_days: i64,
    /// Probability of recovering within the estimated window, in [0.1, 0.95].
    pub recovery_probability: f64,
    pub holding_impacts: Vec<HoldingImpact>,
    pub test_date: DateTime<Utc>,
    pub test_methodology: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_catalogue_has_five_scenarios() {
        let catalogue = ScenarioCatalogue::default();
        assert_eq!(catalogue.scenarios.len(), 5);

        let kinds: Vec<ScenarioKind> = catalogue.scenarios.iter().map(|s| s.kind).collect();
        assert!(kinds.contains(&ScenarioKind::MarketCrash));
        assert!(kinds.contains(&ScenarioKind::InterestRateShock));
        assert!(kinds.contains(&ScenarioKind::InflationSpike));
        assert!(kinds.contains(&ScenarioKind::CurrencyDevaluation));
        assert!(kinds.contains(&ScenarioKind::LiquidityCrisis));
    }

    #[test]
    fn test_catalogue_shock_bands_are_ordered() {
        for scenario in ScenarioCatalogue::default().scenarios {
            assert!(scenario.shock_band.0 <= scenario.shock_band.1);
            assert!(scenario.base_shock_pct < 0.0);
            assert!(scenario.volatility_multiplier >= 1.0);
        }
    }
}
