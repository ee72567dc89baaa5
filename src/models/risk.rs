use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Ordinal risk classification derived from the 0-100 risk score.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    VeryLow,
    Low,
    Moderate,
    High,
    VeryHigh,
}

impl RiskLevel {
    /// Map a risk score to its level. Boundaries are inclusive at
    /// 20/40/60/80 and are part of the engine's documented policy.
    pub fn from_score(score: f64) -> Self {
        if score <= 20.0 {
            RiskLevel::VeryLow
        } else if score <= 40.0 {
            RiskLevel::Low
        } else if score <= 60.0 {
            RiskLevel::Moderate
        } else if score <= 80.0 {
            RiskLevel::High
        } else {
            RiskLevel::VeryHigh
        }
    }
}

/// Whether a profile was computed from real history or from the neutral
/// default bundle after an insufficient-data fallback.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DataQuality {
    Historical,
    Fallback,
}

/// The full metric bundle produced by the risk metrics calculator.
///
/// All return-like quantities are decimal fractions (volatility 0.2 = 20%
/// annualized, VaR -0.02 = a 2% one-day loss). VaR/CVaR values are signed:
/// losses are negative.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskMetrics {
    pub volatility: f64,
    pub beta: f64,
    pub sharpe_ratio: f64,
    pub sortino_ratio: f64,
    pub calmar_ratio: f64,
    pub maximum_drawdown: f64,
    pub var_1_day_95: f64,
    pub var_1_day_99: f64,
    pub var_10_day_95: f64,
    pub var_10_day_99: f64,
    pub cvar_1_day_95: f64,
    pub cvar_1_day_99: f64,
    pub concentration_score: f64,
    pub herfindahl_index: f64,
    pub top_5_holdings_weight: f64,
    pub avg_correlation: f64,
    pub max_correlation: f64,
    /// Fraction of variance explained by benchmark movement; sums to 1
    /// with `idiosyncratic_risk`.
    pub systematic_risk: f64,
    pub idiosyncratic_risk: f64,
}

impl RiskMetrics {
    /// Neutral defaults used when the aligned history is too short to
    /// support a real calculation. Constants match the documented fallback
    /// bundle; callers see `DataQuality::Fallback` on the resulting profile.
    pub fn neutral_default() -> Self {
        Self {
            volatility: 0.2,
            beta: 1.0,
            sharpe_ratio: 0.0,
            sortino_ratio: 0.0,
            calmar_ratio: 0.0,
            maximum_drawdown: -0.1,
            var_1_day_95: -0.02,
            var_1_day_99: -0.03,
            var_10_day_95: -0.06,
            var_10_day_99: -0.09,
            cvar_1_day_95: -0.025,
            cvar_1_day_99: -0.035,
            concentration_score: 50.0,
            herfindahl_index: 0.2,
            top_5_holdings_weight: 0.6,
            avg_correlation: 0.3,
            max_correlation: 0.7,
            systematic_risk: 0.6,
            idiosyncratic_risk: 0.4,
        }
    }
}

/// One assessment's complete risk picture for a portfolio.
///
/// Created once per run and never mutated; the next assessment supersedes
/// it with a fresh profile, so callers keep history by retaining old rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskProfile {
    pub id: Uuid,
    pub risk_score: f64,
    pub risk_level: RiskLevel,
    pub volatility: f64,
    pub beta: f64,
    pub sharpe_ratio: f64,
    pub sortino_ratio: f64,
    pub calmar_ratio: f64,
    pub maximum_drawdown: f64,
    pub var_1_day_95: f64,
    pub var_1_day_99: f64,
    pub var_10_day_95: f64,
    pub var_10_day_99: f64,
    pub cvar_1_day_95: f64,
    pub cvar_1_day_99: f64,
    pub concentration_score: f64,
    pub herfindahl_index: f64,
    pub top_5_holdings_weight: f64,
    pub avg_correlation: f64,
    pub max_correlation: f64,
    pub systematic_risk: f64,
    pub idiosyncratic_risk: f64,
    pub assessment_date: DateTime<Utc>,
    pub lookback_days: i64,
    pub data_quality: DataQuality,
}

impl RiskProfile {
    pub fn from_metrics(
        metrics: &RiskMetrics,
        risk_score: f64,
        lookback_days: i64,
        data_quality: DataQuality,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            risk_score,
            risk_level: RiskLevel::from_score(risk_score),
            volatility: metrics.volatility,
            beta: metrics.beta,
            sharpe_ratio: metrics.sharpe_ratio,
            sortino_ratio: metrics.sortino_ratio,
            calmar_ratio: metrics.calmar_ratio,
            maximum_drawdown: metrics.maximum_drawdown,
            var_1_day_95: metrics.var_1_day_95,
            var_1_day_99: metrics.var_1_day_99,
            var_10_day_95: metrics.var_10_day_95,
            var_10_day_99: metrics.var_10_day_99,
            cvar_1_day_95: metrics.cvar_1_day_95,
            cvar_1_day_99: metrics.cvar_1_day_99,
            concentration_score: metrics.concentration_score,
            herfindahl_index: metrics.herfindahl_index,
            top_5_holdings_weight: metrics.top_5_holdings_weight,
            avg_correlation: metrics.avg_correlation,
            max_correlation: metrics.max_correlation,
            systematic_risk: metrics.systematic_risk,
            idiosyncratic_risk: metrics.idiosyncratic_risk,
            assessment_date: Utc::now(),
            lookback_days,
            data_quality,
        }
    }
}
