use thiserror::Error;

/// Error taxonomy for the risk engine.
///
/// None of these are fatal to an assessment: `InsufficientData` triggers the
/// default-metrics fallback, `InvalidWeights` is recovered by renormalization
/// (or the fallback when the portfolio has no value), and a
/// `ScenarioComputation` failure only skips that one stress scenario.
#[derive(Debug, Error)]
pub enum RiskError {
    #[error("insufficient aligned history: {points} points, need at least {required}")]
    InsufficientData { points: usize, required: usize },
    #[error("invalid portfolio weights: {0}")]
    InvalidWeights(String),
    #[error("stress scenario '{scenario}' failed: {reason}")]
    ScenarioComputation { scenario: String, reason: String },
}
