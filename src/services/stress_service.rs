use crate::config::{Sector, SectorTable};
use crate::errors::RiskError;
use crate::models::{
    total_value, HoldingImpact, HoldingSnapshot, RiskProfile, ScenarioCatalogue, ScenarioKind,
    StressScenario, StressTestResult,
};
use crate::services::risk_service::TRADING_DAYS;
use chrono::Utc;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use statrs::distribution::{ContinuousCDF, Normal};
use tracing::{error, info};
use uuid::Uuid;

/// Recovery-time estimates are clamped to this range (30 days to 3 years).
const RECOVERY_DAYS_BOUNDS: (i64, i64) = (30, 1095);

/// Recovery probabilities are clamped to this range.
const RECOVERY_PROB_BOUNDS: (f64, f64) = (0.1, 0.95);

/// Applies the macro scenario catalogue to a portfolio.
///
/// Owns its catalogue and sector table explicitly so tests can inject
/// both; the variance draws are seeded per run, so a given
/// (portfolio, profile, seed) triple always produces identical results.
#[derive(Debug, Clone)]
pub struct StressTestEngine {
    catalogue: ScenarioCatalogue,
    sectors: SectorTable,
}

impl Default for StressTestEngine {
    fn default() -> Self {
        Self::new(ScenarioCatalogue::default(), SectorTable::default())
    }
}

impl StressTestEngine {
    pub fn new(catalogue: ScenarioCatalogue, sectors: SectorTable) -> Self {
        Self { catalogue, sectors }
    }

    /// Run every catalogue scenario against the current holdings.
    ///
    /// A failure inside one scenario is logged and that scenario skipped;
    /// no scenario can abort the batch, so coverage degrades gracefully
    /// instead of failing the assessment.
    pub fn run(
        &self,
        holdings: &[HoldingSnapshot],
        profile: &RiskProfile,
        seed: u64,
    ) -> Vec<StressTestResult> {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut results = Vec::with_capacity(self.catalogue.scenarios.len());

        for scenario in &self.catalogue.scenarios {
            match self.run_scenario(scenario, holdings, profile, &mut rng) {
                Ok(result) => results.push(result),
                Err(e) => error!("skipping stress scenario: {e}"),
            }
        }

        info!(
            "stress tested portfolio across {}/{} scenarios",
            results.len(),
            self.catalogue.scenarios.len()
        );
        results
    }

    fn run_scenario(
        &self,
        scenario: &StressScenario,
        holdings: &[HoldingSnapshot],
        profile: &RiskProfile,
        rng: &mut StdRng,
    ) -> Result<StressTestResult, RiskError> {
        let impact_pct = scenario_impact(scenario, rng)?;

        let (stressed_volatility, stressed_var_95, stressed_var_99, stressed_max_drawdown) =
            stressed_metrics(scenario, profile)?;

        let recovery_days = estimate_recovery_days(scenario, impact_pct);
        let recovery_probability = recovery_probability(scenario, impact_pct, recovery_days);

        let holding_impacts = self.holding_impacts(scenario, holdings, rng);
        let impact_amount = total_value(holdings) * impact_pct / 100.0;

        Ok(StressTestResult {
            id: Uuid::new_v4(),
            risk_profile_id: profile.id,
            scenario_type: scenario.kind,
            scenario_name: scenario.name.clone(),
            scenario_description: scenario.description.clone(),
            scenario_parameters: scenario.parameters.clone(),
            portfolio_impact_percentage: impact_pct,
            portfolio_impact_amount: impact_amount,
            stressed_volatility,
            stressed_var_95,
            stressed_var_99,
            stressed_max_drawdown,
            estimated_recovery_days: recovery_days,
            recovery_probability,
            holding_impacts,
            test_date: Utc::now(),
            test_methodology: "Scenario Analysis".to_string(),
        })
    }

    /// Per-holding impact estimates from the sector heuristic, with a
    /// seeded +/-20% variation around the sector baseline.
    fn holding_impacts(
        &self,
        scenario: &StressScenario,
        holdings: &[HoldingSnapshot],
        rng: &mut StdRng,
    ) -> Vec<HoldingImpact> {
        holdings
            .iter()
            .map(|holding| {
                let sector = self.sectors.classify(&holding.symbol);
                let base = sector_base_impact(scenario.kind, sector);
                let impact_pct = base * rng.random_range(0.8..1.2);

                HoldingImpact {
                    symbol: holding.symbol.clone(),
                    name: holding.name.clone(),
                    current_value: holding.current_value,
                    impact_percentage: impact_pct,
                    impact_amount: holding.current_value * impact_pct / 100.0,
                    stressed_value: holding.current_value * (1.0 + impact_pct / 100.0),
                }
            })
            .collect()
    }
}

/// Portfolio impact %: the scenario's base shock scaled by a bounded
/// uniform draw within the scenario's documented variance band.
fn scenario_impact(scenario: &StressScenario, rng: &mut StdRng) -> Result<f64, RiskError> {
    let (lo, hi) = scenario.shock_band;
    if !(scenario.base_shock_pct.is_finite() && lo.is_finite() && hi.is_finite() && lo <= hi) {
        return Err(RiskError::ScenarioComputation {
            scenario: scenario.name.clone(),
            reason: format!(
                "invalid shock parameters: base {} band ({lo}, {hi})",
                scenario.base_shock_pct
            ),
        });
    }

    let factor = if (hi - lo).abs() < f64::EPSILON {
        lo
    } else {
        rng.random_range(lo..hi)
    };
    Ok(scenario.base_shock_pct * factor)
}

/// Stressed volatility/VaR/drawdown from the profile's base metrics.
///
/// VaR is parametric under stress: the standard-normal quantile at 5%/1%
/// of the stressed daily sigma, assuming zero mean.
fn stressed_metrics(
    scenario: &StressScenario,
    profile: &RiskProfile,
) -> Result<(f64, f64, f64, f64), RiskError> {
    let stressed_volatility = profile.volatility * scenario.volatility_multiplier;
    let daily_sigma = stressed_volatility / TRADING_DAYS.sqrt();

    let normal = Normal::new(0.0, daily_sigma).map_err(|e| RiskError::ScenarioComputation {
        scenario: scenario.name.clone(),
        reason: format!("stressed sigma {daily_sigma} is not a valid distribution: {e}"),
    })?;

    let stressed_var_95 = normal.inverse_cdf(0.05);
    let stressed_var_99 = normal.inverse_cdf(0.01);
    let stressed_max_drawdown = profile.maximum_drawdown * scenario.volatility_multiplier;

    Ok((
        stressed_volatility,
        stressed_var_95,
        stressed_var_99,
        stressed_max_drawdown,
    ))
}

/// Recovery estimate: 10 days per percent of impact, scaled by the
/// scenario's recovery multiplier and clamped to [30, 1095] days.
fn estimate_recovery_days(scenario: &StressScenario, impact_pct: f64) -> i64 {
    let days = (impact_pct.abs() * 10.0 * scenario.recovery_multiplier) as i64;
    days.clamp(RECOVERY_DAYS_BOUNDS.0, RECOVERY_DAYS_BOUNDS.1)
}

/// Probability of recovering within the estimated window.
///
/// Base probability falls with impact severity (floor 0.3), adjusted by a
/// time factor and the scenario's recovery factor, clamped to [0.1, 0.95].
fn recovery_probability(scenario: &StressScenario, impact_pct: f64, recovery_days: i64) -> f64 {
    let base = (1.0 - impact_pct.abs() / 100.0).max(0.3);

    let time_factor = if recovery_days <= 90 {
        1.2
    } else if recovery_days <= 365 {
        1.0
    } else if recovery_days <= 730 {
        0.8
    } else {
        0.6
    };

    (base * time_factor * scenario.recovery_factor)
        .clamp(RECOVERY_PROB_BOUNDS.0, RECOVERY_PROB_BOUNDS.1)
}

/// Deterministic sector baseline impact (percent) per scenario.
///
/// Crash scenarios hit technology and growth names hardest; a rate shock
/// benefits banks while utilities suffer from duration exposure.
fn sector_base_impact(kind: ScenarioKind, sector: Sector) -> f64 {
    match kind {
        ScenarioKind::MarketCrash => match sector {
            Sector::Technology => -35.0,
            Sector::Banking => -25.0,
            _ => -30.0,
        },
        ScenarioKind::InterestRateShock => match sector {
            Sector::Banking => 10.0,
            Sector::Utilities => -20.0,
            _ => -10.0,
        },
        ScenarioKind::InflationSpike | ScenarioKind::CurrencyDevaluation
        | ScenarioKind::LiquidityCrisis => -15.0,
    }
}
