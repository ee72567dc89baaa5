use crate::config::AlertThresholds;
use crate::models::{AlertType, RiskAlert, RiskLevel, RiskProfile, StressTestResult};
use chrono::Utc;
use tracing::info;
use uuid::Uuid;

/// Evaluate the fixed alert rule set against a risk profile.
///
/// Each firing rule emits exactly one alert. The engine only creates
/// alerts; it never resolves or deduplicates across runs. Suppressing
/// duplicates (e.g., only create when no unresolved alert of that type
/// exists) is the persisting caller's policy.
pub fn check_alerts(
    profile: &RiskProfile,
    stress_results: &[StressTestResult],
    thresholds: &AlertThresholds,
) -> Vec<RiskAlert> {
    let mut alerts = Vec::new();

    if profile.risk_score > thresholds.risk_score {
        let mut message = format!(
            "Portfolio risk score is {:.1}, indicating high risk levels.",
            profile.risk_score
        );
        // Annotate with the worst stress outcome when the batch is available.
        if let Some(worst) = stress_results.iter().min_by(|a, b| {
            a.portfolio_impact_percentage
                .partial_cmp(&b.portfolio_impact_percentage)
                .unwrap_or(std::cmp::Ordering::Equal)
        }) {
            message.push_str(&format!(
                " Worst stress scenario: {} at {:.1}%.",
                worst.scenario_name, worst.portfolio_impact_percentage
            ));
        }

        alerts.push(build_alert(
            profile,
            AlertType::HighRiskScore,
            RiskLevel::High,
            "High Portfolio Risk Detected",
            message,
            "risk_score",
            thresholds.risk_score,
            profile.risk_score,
        ));
    }

    if profile.volatility > thresholds.volatility {
        alerts.push(build_alert(
            profile,
            AlertType::HighVolatility,
            RiskLevel::High,
            "High Portfolio Volatility",
            format!(
                "Portfolio volatility is {:.1}%, above recommended levels.",
                profile.volatility * 100.0
            ),
            "volatility",
            thresholds.volatility,
            profile.volatility,
        ));
    }

    if profile.concentration_score > thresholds.concentration_score {
        alerts.push(build_alert(
            profile,
            AlertType::HighConcentration,
            RiskLevel::Moderate,
            "High Portfolio Concentration",
            format!(
                "Portfolio concentration score is {:.1}, indicating lack of diversification.",
                profile.concentration_score
            ),
            "concentration",
            thresholds.concentration_score,
            profile.concentration_score,
        ));
    }

    if profile.maximum_drawdown < thresholds.max_drawdown {
        alerts.push(build_alert(
            profile,
            AlertType::LargeDrawdown,
            RiskLevel::High,
            "Large Maximum Drawdown",
            format!(
                "Maximum drawdown is {:.1}%, indicating high downside risk.",
                profile.maximum_drawdown * 100.0
            ),
            "max_drawdown",
            thresholds.max_drawdown,
            profile.maximum_drawdown,
        ));
    }

    if profile.avg_correlation > thresholds.avg_correlation {
        alerts.push(build_alert(
            profile,
            AlertType::HighCorrelation,
            RiskLevel::Moderate,
            "High Asset Correlation",
            format!(
                "Average correlation is {:.2}, reducing diversification benefits.",
                profile.avg_correlation
            ),
            "correlation",
            thresholds.avg_correlation,
            profile.avg_correlation,
        ));
    }

    if !alerts.is_empty() {
        info!("created {} risk alerts for profile {}", alerts.len(), profile.id);
    }
    alerts
}

#[allow(clippy::too_many_arguments)]
fn build_alert(
    profile: &RiskProfile,
    alert_type: AlertType,
    alert_level: RiskLevel,
    title: &str,
    message: String,
    triggered_metric: &str,
    threshold_value: f64,
    current_value: f64,
) -> RiskAlert {
    RiskAlert {
        id: Uuid::new_v4(),
        risk_profile_id: profile.id,
        alert_type,
        alert_level,
        title: title.to_string(),
        message,
        triggered_metric: triggered_metric.to_string(),
        threshold_value,
        current_value,
        recommended_actions: recommended_actions(alert_type),
        is_acknowledged: false,
        acknowledged_at: None,
        is_resolved: false,
        resolved_at: None,
        created_at: Utc::now(),
    }
}

/// Recommended-action lookup table, keyed by alert type.
pub fn recommended_actions(alert_type: AlertType) -> Vec<String> {
    let actions: &[&str] = match alert_type {
        AlertType::HighRiskScore => &[
            "Consider reducing position sizes in high-risk assets",
            "Add defensive stocks or bonds to the portfolio",
            "Review and rebalance asset allocation",
            "Consider implementing stop-loss orders",
        ],
        AlertType::HighVolatility => &[
            "Diversify across different sectors and asset classes",
            "Consider adding low-volatility stocks",
            "Implement systematic rebalancing",
            "Review position sizing strategy",
        ],
        AlertType::HighConcentration => &[
            "Reduce position sizes in top holdings",
            "Add holdings from different sectors",
            "Consider index funds for instant diversification",
            "Implement maximum position size limits",
        ],
        AlertType::LargeDrawdown => &[
            "Review risk management strategy",
            "Consider implementing stop-loss orders",
            "Reduce overall portfolio risk",
            "Add hedging instruments if available",
        ],
        AlertType::HighCorrelation => &[
            "Add assets from different sectors/regions",
            "Consider alternative asset classes",
            "Review sector allocation",
            "Add international exposure if possible",
        ],
    };

    actions.iter().map(|a| a.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DataQuality, RiskMetrics};

    fn quiet_profile() -> RiskProfile {
        let mut metrics = RiskMetrics::neutral_default();
        metrics.volatility = 0.15;
        metrics.maximum_drawdown = -0.1;
        metrics.concentration_score = 30.0;
        metrics.avg_correlation = 0.2;
        RiskProfile::from_metrics(&metrics, 40.0, 252, DataQuality::Historical)
    }

    #[test]
    fn test_quiet_profile_raises_no_alerts() {
        let alerts = check_alerts(&quiet_profile(), &[], &AlertThresholds::default());
        assert!(alerts.is_empty());
    }

    #[test]
    fn test_drawdown_alert_boundary() {
        let thresholds = AlertThresholds::default();

        let mut profile = quiet_profile();
        profile.maximum_drawdown = -0.30;
        let alerts = check_alerts(&profile, &[], &thresholds);
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].alert_type, AlertType::LargeDrawdown);
        assert_eq!(alerts[0].alert_level, RiskLevel::High);
        assert_eq!(alerts[0].threshold_value, -0.25);
        assert_eq!(alerts[0].current_value, -0.30);

        profile.maximum_drawdown = -0.20;
        assert!(check_alerts(&profile, &[], &thresholds).is_empty());
    }

    #[test]
    fn test_each_rule_fires_once() {
        let mut profile = quiet_profile();
        profile.risk_score = 90.0;
        profile.volatility = 0.40;
        profile.concentration_score = 85.0;
        profile.maximum_drawdown = -0.35;
        profile.avg_correlation = 0.85;

        let alerts = check_alerts(&profile, &[], &AlertThresholds::default());
        assert_eq!(alerts.len(), 5);

        let types: Vec<AlertType> = alerts.iter().map(|a| a.alert_type).collect();
        assert!(types.contains(&AlertType::HighRiskScore));
        assert!(types.contains(&AlertType::HighVolatility));
        assert!(types.contains(&AlertType::HighConcentration));
        assert!(types.contains(&AlertType::LargeDrawdown));
        assert!(types.contains(&AlertType::HighCorrelation));

        for alert in &alerts {
            assert_eq!(alert.risk_profile_id, profile.id);
            assert!(!alert.recommended_actions.is_empty());
            assert!(!alert.is_acknowledged);
            assert!(!alert.is_resolved);
        }
    }

    #[test]
    fn test_volatility_boundary_is_strict() {
        let mut profile = quiet_profile();
        profile.volatility = 0.35;
        assert!(check_alerts(&profile, &[], &AlertThresholds::default()).is_empty());

        profile.volatility = 0.351;
        let alerts = check_alerts(&profile, &[], &AlertThresholds::default());
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].triggered_metric, "volatility");
    }

    #[test]
    fn test_moderate_severity_rules() {
        let mut profile = quiet_profile();
        profile.concentration_score = 75.0;
        profile.avg_correlation = 0.75;

        let alerts = check_alerts(&profile, &[], &AlertThresholds::default());
        assert_eq!(alerts.len(), 2);
        assert!(alerts.iter().all(|a| a.alert_level == RiskLevel::Moderate));
    }
}
