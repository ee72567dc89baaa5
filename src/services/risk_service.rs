use crate::errors::RiskError;
use crate::models::{AlignedReturns, HoldingSnapshot, RiskMetrics};
use tracing::warn;

/// Trading days per year used for annualization.
pub const TRADING_DAYS: f64 = 252.0;

/// Tolerance inside which a weight vector is considered normalized.
pub const WEIGHT_TOLERANCE: f64 = 1e-6;

/// Beta is clamped to this range to guard against ill-conditioned small
/// samples.
const BETA_BOUNDS: (f64, f64) = (0.1, 3.0);

/// Derive portfolio weights from holding values.
///
/// # Errors
/// `RiskError::InvalidWeights` when the portfolio has no positive value,
/// in which case the caller falls back to the neutral default bundle.
pub fn portfolio_weights(holdings: &[HoldingSnapshot]) -> Result<Vec<(String, f64)>, RiskError> {
    let total: f64 = holdings.iter().map(|h| h.current_value.max(0.0)).sum();
    if total <= 0.0 || !total.is_finite() {
        return Err(RiskError::InvalidWeights(format!(
            "total portfolio value {total} is not positive"
        )));
    }

    Ok(holdings
        .iter()
        .map(|h| (h.symbol.clone(), h.current_value.max(0.0) / total))
        .collect())
}

/// Renormalize a weight vector so it sums to 1.
///
/// Small deviations are expected from floating-point arithmetic and from
/// callers passing hand-built weights; they are logged, never errored on.
pub fn normalize_weights(weights: &[(String, f64)]) -> Vec<(String, f64)> {
    let sum: f64 = weights.iter().map(|(_, w)| w).sum();
    if sum <= 0.0 || !sum.is_finite() {
        return weights.to_vec();
    }
    if (sum - 1.0).abs() <= WEIGHT_TOLERANCE {
        return weights.to_vec();
    }

    warn!("weights sum to {sum:.8}, renormalizing");
    weights
        .iter()
        .map(|(symbol, w)| (symbol.clone(), w / sum))
        .collect()
}

/// Compute the full risk metric bundle from aligned returns and weights.
///
/// The aligned input is already guaranteed to have enough observations by
/// the series builder, so this function is infallible; degenerate inputs
/// (zero volatility, flat benchmark) fall back to the documented neutral
/// values per metric instead of erroring.
pub fn compute_risk_metrics(
    aligned: &AlignedReturns,
    weights: &[(String, f64)],
    risk_free_rate: f64,
) -> RiskMetrics {
    let weights = normalize_weights(weights);
    let portfolio = portfolio_returns(aligned, &weights);

    let volatility = sample_std(&portfolio) * TRADING_DAYS.sqrt();
    let beta = compute_beta(&portfolio, &aligned.benchmark);

    let annualized_return = mean(&portfolio) * TRADING_DAYS;
    let excess_return = annualized_return - risk_free_rate;
    let sharpe_ratio = if volatility > 0.0 {
        excess_return / volatility
    } else {
        0.0
    };

    let sortino_ratio = compute_sortino(&portfolio, excess_return, volatility);

    let (maximum_drawdown, _current_drawdown) = compute_drawdowns(&portfolio);
    let calmar_ratio = if maximum_drawdown.abs() > 0.0 {
        annualized_return / maximum_drawdown.abs()
    } else {
        0.0
    };

    let (var_1_day_95, var_1_day_99) = compute_var(&portfolio);
    // Square-root-of-time scaling: an approximation that assumes i.i.d.
    // daily returns, not a GARCH-style horizon model.
    let var_10_day_95 = var_1_day_95 * 10.0_f64.sqrt();
    let var_10_day_99 = var_1_day_99 * 10.0_f64.sqrt();
    let (cvar_1_day_95, cvar_1_day_99) = compute_cvar(&portfolio, var_1_day_95, var_1_day_99);

    let (concentration_score, herfindahl_index, top_5_holdings_weight) =
        concentration_metrics(&weights);

    let (avg_correlation, max_correlation) = correlation_metrics(aligned);

    let (systematic_risk, idiosyncratic_risk) =
        decompose_risk(&portfolio, &aligned.benchmark, beta);

    RiskMetrics {
        volatility,
        beta,
        sharpe_ratio,
        sortino_ratio,
        calmar_ratio,
        maximum_drawdown,
        var_1_day_95,
        var_1_day_99,
        var_10_day_95,
        var_10_day_99,
        cvar_1_day_95,
        cvar_1_day_99,
        concentration_score,
        herfindahl_index,
        top_5_holdings_weight,
        avg_correlation,
        max_correlation,
        systematic_risk,
        idiosyncratic_risk,
    }
}

/// Weighted sum of per-symbol daily returns for each aligned date.
///
/// Holdings without an aligned series contribute nothing, mirroring how the
/// calculator treats a symbol with no usable history.
fn portfolio_returns(aligned: &AlignedReturns, weights: &[(String, f64)]) -> Vec<f64> {
    let mut portfolio = vec![0.0; aligned.len()];
    for (symbol, weight) in weights {
        if let Some(series) = aligned.by_symbol.get(symbol) {
            for (day, r) in series.iter().enumerate() {
                portfolio[day] += weight * r;
            }
        }
    }
    portfolio
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample variance (ddof = 1).
fn sample_variance(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() as f64 - 1.0)
}

fn sample_std(values: &[f64]) -> f64 {
    sample_variance(values).sqrt()
}

/// Beta = covariance(portfolio, benchmark) / variance(benchmark), clamped
/// to [0.1, 3.0]. A flat benchmark yields the neutral beta of 1.
fn compute_beta(portfolio: &[f64], benchmark: &[f64]) -> f64 {
    if portfolio.len() != benchmark.len() || portfolio.len() < 2 {
        return 1.0;
    }

    let mean_p = mean(portfolio);
    let mean_b = mean(benchmark);

    let mut cov = 0.0;
    let mut var_b = 0.0;
    for (p, b) in portfolio.iter().zip(benchmark.iter()) {
        cov += (p - mean_p) * (b - mean_b);
        var_b += (b - mean_b).powi(2);
    }

    if var_b.abs() < f64::EPSILON {
        return 1.0;
    }

    let beta = cov / var_b;
    beta.clamp(BETA_BOUNDS.0, BETA_BOUNDS.1)
}

/// Sortino ratio: excess return over downside deviation.
///
/// Only negative daily returns count toward the downside deviation; when
/// there are none (or too few to estimate a deviation), the full
/// volatility stands in as the denominator.
fn compute_sortino(portfolio: &[f64], excess_return: f64, volatility: f64) -> f64 {
    let downside: Vec<f64> = portfolio.iter().copied().filter(|r| *r < 0.0).collect();

    let downside_deviation = if downside.len() >= 2 {
        sample_std(&downside) * TRADING_DAYS.sqrt()
    } else {
        volatility
    };

    if downside_deviation > 0.0 {
        excess_return / downside_deviation
    } else {
        0.0
    }
}

/// Maximum and current drawdown from a daily return series.
///
/// Drawdown at time t is cumulative-return / running-max cumulative-return
/// minus 1; both values are non-positive fractions.
fn compute_drawdowns(portfolio: &[f64]) -> (f64, f64) {
    let mut cumulative = 1.0;
    let mut peak = 1.0;
    let mut max_dd = 0.0;
    let mut current_dd = 0.0;

    for r in portfolio {
        cumulative *= 1.0 + r;
        if cumulative > peak {
            peak = cumulative;
        }
        current_dd = cumulative / peak - 1.0;
        if current_dd < max_dd {
            max_dd = current_dd;
        }
    }

    (max_dd, current_dd)
}

/// Linear-interpolation percentile of an unsorted sample (q in [0, 100]).
fn percentile(values: &[f64], q: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let rank = q / 100.0 * (sorted.len() as f64 - 1.0);
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    if lower == upper {
        return sorted[lower];
    }

    let fraction = rank - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * fraction
}

/// Historical 1-day VaR at 95% and 99% confidence (5th and 1st percentile
/// of the empirical return distribution).
fn compute_var(portfolio: &[f64]) -> (f64, f64) {
    (percentile(portfolio, 5.0), percentile(portfolio, 1.0))
}

/// CVaR: mean of all returns at or below the VaR threshold.
fn compute_cvar(portfolio: &[f64], var_95: f64, var_99: f64) -> (f64, f64) {
    let tail_mean = |threshold: f64| {
        let tail: Vec<f64> = portfolio
            .iter()
            .copied()
            .filter(|r| *r <= threshold)
            .collect();
        if tail.is_empty() {
            threshold
        } else {
            mean(&tail)
        }
    };

    (tail_mean(var_95), tail_mean(var_99))
}

/// Concentration statistics from the weight vector.
///
/// Returns `(concentration_score, herfindahl_index, top_5_weight)` where
/// the score is `min(100, HHI * 100 + top5 * 50)`.
fn concentration_metrics(weights: &[(String, f64)]) -> (f64, f64, f64) {
    if weights.is_empty() {
        return (0.0, 0.0, 0.0);
    }

    let mut sorted: Vec<f64> = weights.iter().map(|(_, w)| *w).collect();
    sorted.sort_by(|a, b| b.partial_cmp(a).unwrap_or(std::cmp::Ordering::Equal));

    let herfindahl: f64 = sorted.iter().map(|w| w * w).sum();
    let top_5: f64 = sorted.iter().take(5).sum();
    let score = (herfindahl * 100.0 + top_5 * 50.0).min(100.0);

    (score, herfindahl, top_5)
}

/// Pearson correlation between two equally-sized return series.
fn pearson_correlation(a: &[f64], b: &[f64]) -> Option<f64> {
    if a.len() != b.len() || a.len() < 2 {
        return None;
    }

    let mean_a = mean(a);
    let mean_b = mean(b);

    let mut cov = 0.0;
    let mut var_a = 0.0;
    let mut var_b = 0.0;
    for (x, y) in a.iter().zip(b.iter()) {
        let dx = x - mean_a;
        let dy = y - mean_b;
        cov += dx * dy;
        var_a += dx * dx;
        var_b += dy * dy;
    }

    let std_a = var_a.sqrt();
    let std_b = var_b.sqrt();
    if std_a < f64::EPSILON || std_b < f64::EPSILON {
        return None;
    }

    Some(cov / (std_a * std_b))
}

/// Mean and max pairwise correlation across all symbol series (upper
/// triangle only, diagonal excluded). Portfolios with fewer than two
/// symbols report (0, 0).
fn correlation_metrics(aligned: &AlignedReturns) -> (f64, f64) {
    let series: Vec<&Vec<f64>> = aligned.by_symbol.values().collect();
    if series.len() < 2 {
        return (0.0, 0.0);
    }

    let mut correlations = Vec::new();
    for i in 0..series.len() {
        for j in (i + 1)..series.len() {
            if let Some(c) = pearson_correlation(series[i], series[j]) {
                correlations.push(c);
            }
        }
    }

    if correlations.is_empty() {
        return (0.0, 0.0);
    }

    let avg = mean(&correlations);
    let max = correlations.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    (avg, max)
}

/// Split portfolio variance into systematic (beta-explained) and
/// idiosyncratic components, reported as proportions summing to 1.
fn decompose_risk(portfolio: &[f64], benchmark: &[f64], beta: f64) -> (f64, f64) {
    let benchmark_variance = sample_variance(benchmark);
    let portfolio_variance = sample_variance(portfolio);

    let systematic_variance = beta.powi(2) * benchmark_variance;
    let idiosyncratic_variance = (portfolio_variance - systematic_variance).max(0.0);

    let total = systematic_variance + idiosyncratic_variance;
    if total > 0.0 {
        (systematic_variance / total, idiosyncratic_variance / total)
    } else {
        (0.5, 0.5)
    }
}

/// Score a metric bundle into a 0-100 risk rating.
///
/// Weighted sum of normalized components; all ceilings and weights are
/// policy constants that tests pin exactly:
/// - volatility, weight 0.30, ceiling 40% annualized
/// - |max drawdown|, weight 0.25, ceiling 50%
/// - |VaR99|, weight 0.20, ceiling 10% daily
/// - concentration score, weight 0.15, already 0-100
/// - |beta - 1|, weight 0.10, scaled x50
pub fn score_risk(metrics: &RiskMetrics) -> f64 {
    let volatility_score = (metrics.volatility / 0.4 * 100.0).min(100.0);
    let drawdown_score = (metrics.maximum_drawdown.abs() / 0.5 * 100.0).min(100.0);
    let var_score = (metrics.var_1_day_99.abs() / 0.1 * 100.0).min(100.0);
    let concentration_score = metrics.concentration_score;
    let beta_score = ((metrics.beta - 1.0).abs() * 50.0).min(100.0);

    let score = volatility_score * 0.30
        + drawdown_score * 0.25
        + var_score * 0.20
        + concentration_score * 0.15
        + beta_score * 0.10;

    score.clamp(0.0, 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ReturnPoint;
    use crate::services::returns_service::align_returns;
    use chrono::{Duration, NaiveDate};
    use std::collections::BTreeMap;

    fn to_points(returns: &[f64]) -> Vec<ReturnPoint> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        returns
            .iter()
            .enumerate()
            .map(|(i, &r)| ReturnPoint::new(start + Duration::days(i as i64), r))
            .collect()
    }

    fn aligned_from(series: &[(&str, Vec<f64>)], benchmark: Vec<f64>) -> AlignedReturns {
        let mut historical = BTreeMap::new();
        for (symbol, returns) in series {
            historical.insert(symbol.to_string(), to_points(returns));
        }
        align_returns(&historical, &to_points(&benchmark), 252).unwrap()
    }

    /// Two orthogonal return patterns: sign-alternating with period 2 and
    /// period 4, so the sample correlation is exactly zero.
    fn orthogonal_series(amp_a: f64, amp_b: f64, len: usize) -> (Vec<f64>, Vec<f64>) {
        let a: Vec<f64> = (0..len)
            .map(|i| if i % 2 == 0 { amp_a } else { -amp_a })
            .collect();
        let b: Vec<f64> = (0..len)
            .map(|i| if i % 4 < 2 { amp_b } else { -amp_b })
            .collect();
        (a, b)
    }

    #[test]
    fn test_zero_correlation_portfolio_volatility_closed_form() {
        // 60/40 RELIANCE/TCS with uncorrelated returns: portfolio variance
        // must equal w1^2*v1 + w2^2*v2 with no cross term.
        let (a, b) = orthogonal_series(0.0126, 0.0189, 64);
        let bench: Vec<f64> = (0..64).map(|i| ((i % 3) as f64 - 1.0) * 0.01).collect();

        let aligned = aligned_from(&[("RELIANCE", a.clone()), ("TCS", b.clone())], bench);
        let weights = vec![
            ("RELIANCE".to_string(), 0.6),
            ("TCS".to_string(), 0.4),
        ];

        let corr = pearson_correlation(&a, &b).unwrap();
        assert!(corr.abs() < 1e-12);

        let vol_a = sample_std(&a) * TRADING_DAYS.sqrt();
        let vol_b = sample_std(&b) * TRADING_DAYS.sqrt();
        let expected = (0.6_f64.powi(2) * vol_a.powi(2) + 0.4_f64.powi(2) * vol_b.powi(2)).sqrt();

        let metrics = compute_risk_metrics(&aligned, &weights, 0.06);
        assert!(
            (metrics.volatility - expected).abs() < 1e-9,
            "got {}, expected {}",
            metrics.volatility,
            expected
        );
    }

    #[test]
    fn test_weights_renormalize_to_one() {
        let weights = vec![
            ("A".to_string(), 0.5),
            ("B".to_string(), 0.3),
            ("C".to_string(), 0.3),
        ];
        let normalized = normalize_weights(&weights);
        let sum: f64 = normalized.iter().map(|(_, w)| w).sum();
        assert!((sum - 1.0).abs() <= WEIGHT_TOLERANCE);
    }

    #[test]
    fn test_weights_within_tolerance_untouched() {
        let weights = vec![("A".to_string(), 0.6), ("B".to_string(), 0.4)];
        let normalized = normalize_weights(&weights);
        assert_eq!(normalized[0].1, 0.6);
        assert_eq!(normalized[1].1, 0.4);
    }

    #[test]
    fn test_portfolio_weights_rejects_worthless_portfolio() {
        let holdings = vec![crate::models::HoldingSnapshot::new("AAA", 0.0)];
        assert!(portfolio_weights(&holdings).is_err());
    }

    #[test]
    fn test_herfindahl_equal_weights() {
        // Equally-weighted N-holding portfolio has HHI = 1/N.
        let weights: Vec<(String, f64)> = (0..4)
            .map(|i| (format!("S{i}"), 0.25))
            .collect();
        let (_, hhi, top5) = concentration_metrics(&weights);
        assert!((hhi - 0.25).abs() < 1e-12);
        assert!((top5 - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_var_ordering_and_scaling() {
        let returns: Vec<f64> = (0..100)
            .map(|i| (i as f64 - 60.0) / 1000.0) // tail down to -6%
            .collect();
        let (var_95, var_99) = compute_var(&returns);

        assert!(var_99 <= var_95);
        assert!(var_95 <= 0.0);

        // 10-day scaling is exact by construction.
        let aligned = aligned_from(&[("AAA", returns.clone())], returns.clone());
        let metrics =
            compute_risk_metrics(&aligned, &[("AAA".to_string(), 1.0)], 0.06);
        assert_eq!(metrics.var_10_day_95, metrics.var_1_day_95 * 10.0_f64.sqrt());
        assert_eq!(metrics.var_10_day_99, metrics.var_1_day_99 * 10.0_f64.sqrt());
    }

    #[test]
    fn test_cvar_at_or_below_var() {
        let returns: Vec<f64> = (0..100).map(|i| (i as f64 - 50.0) / 1000.0).collect();
        let (var_95, var_99) = compute_var(&returns);
        let (cvar_95, cvar_99) = compute_cvar(&returns, var_95, var_99);
        assert!(cvar_95 <= var_95);
        assert!(cvar_99 <= var_99);
    }

    #[test]
    fn test_sharpe_zero_when_volatility_zero() {
        let flat = vec![0.0; 40];
        let aligned = aligned_from(&[("AAA", flat.clone())], flat);
        let metrics = compute_risk_metrics(&aligned, &[("AAA".to_string(), 1.0)], 0.06);
        assert_eq!(metrics.sharpe_ratio, 0.0);
        assert_eq!(metrics.volatility, 0.0);
        assert_eq!(metrics.calmar_ratio, 0.0);
    }

    #[test]
    fn test_beta_clamped_to_bounds() {
        // Portfolio moving 10x the benchmark would have beta 10; clamp to 3.
        let bench: Vec<f64> = (0..60).map(|i| ((i % 2) as f64 * 2.0 - 1.0) * 0.005).collect();
        let wild: Vec<f64> = bench.iter().map(|b| b * 10.0).collect();
        let beta = compute_beta(&wild, &bench);
        assert_eq!(beta, 3.0);
    }

    #[test]
    fn test_drawdown_monotone_decline() {
        // Four consecutive -10% days: drawdown = 1 - 0.9^4.
        let returns = vec![-0.1; 4];
        let (max_dd, current_dd) = compute_drawdowns(&returns);
        let expected = 0.9_f64.powi(4) - 1.0;
        assert!((max_dd - expected).abs() < 1e-12);
        assert_eq!(max_dd, current_dd);
    }

    #[test]
    fn test_risk_decomposition_sums_to_one() {
        let (a, b) = orthogonal_series(0.01, 0.02, 48);
        let aligned = aligned_from(&[("AAA", a), ("BBB", b.clone())], b);
        let metrics = compute_risk_metrics(
            &aligned,
            &[("AAA".to_string(), 0.5), ("BBB".to_string(), 0.5)],
            0.06,
        );
        assert!((metrics.systematic_risk + metrics.idiosyncratic_risk - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_score_risk_bounds() {
        let mut metrics = RiskMetrics::neutral_default();
        metrics.volatility = 0.0;
        metrics.maximum_drawdown = 0.0;
        metrics.var_1_day_99 = 0.0;
        metrics.concentration_score = 0.0;
        metrics.beta = 1.0;
        assert_eq!(score_risk(&metrics), 0.0);

        metrics.volatility = 2.0;
        metrics.maximum_drawdown = -0.9;
        metrics.var_1_day_99 = -0.5;
        metrics.concentration_score = 100.0;
        metrics.beta = 3.0;
        assert_eq!(score_risk(&metrics), 100.0);
    }

    #[test]
    fn test_score_risk_weighted_sum() {
        let mut metrics = RiskMetrics::neutral_default();
        metrics.volatility = 0.2; // 50 * 0.30 = 15
        metrics.maximum_drawdown = -0.25; // 50 * 0.25 = 12.5
        metrics.var_1_day_99 = -0.05; // 50 * 0.20 = 10
        metrics.concentration_score = 50.0; // 50 * 0.15 = 7.5
        metrics.beta = 1.5; // 25 * 0.10 = 2.5
        assert!((score_risk(&metrics) - 47.5).abs() < 1e-9);
    }
}
