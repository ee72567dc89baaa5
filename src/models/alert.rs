use crate::models::risk::RiskLevel;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The fixed alert rule identifiers.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AlertType {
    HighRiskScore,
    HighVolatility,
    HighConcentration,
    LargeDrawdown,
    HighCorrelation,
}

impl AlertType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertType::HighRiskScore => "high_risk_score",
            AlertType::HighVolatility => "high_volatility",
            AlertType::HighConcentration => "high_concentration",
            AlertType::LargeDrawdown => "large_drawdown",
            AlertType::HighCorrelation => "high_correlation",
        }
    }
}

/// A threshold breach raised during an assessment.
///
/// The engine only creates alerts; acknowledgment and resolution are set by
/// the external caller and alerts are never auto-deleted or deduplicated
/// across runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskAlert {
    pub id: Uuid,
    pub risk_profile_id: Uuid,
    pub alert_type: AlertType,
    pub alert_level: RiskLevel,
    pub title: String,
    pub message: String,
    pub triggered_metric: String,
    pub threshold_value: f64,
    pub current_value: f64,
    pub recommended_actions: Vec<String>,
    pub is_acknowledged: bool,
    pub acknowledged_at: Option<DateTime<Utc>>,
    pub is_resolved: bool,
    pub resolved_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl RiskAlert {
    /// Mark the alert as seen. Idempotent; keeps the original timestamp on
    /// repeat calls.
    pub fn acknowledge(&mut self) {
        if !self.is_acknowledged {
            self.is_acknowledged = true;
            self.acknowledged_at = Some(Utc::now());
        }
    }

    /// Mark the alert as resolved. Independent of acknowledgment.
    pub fn resolve(&mut self) {
        if !self.is_resolved {
            self.is_resolved = true;
            self.resolved_at = Some(Utc::now());
        }
    }
}
