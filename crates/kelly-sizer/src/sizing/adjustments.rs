//! Adjustment Chain
//!
//! Confidence shrinkage, market-risk penalties, fractional-Kelly mode
//! scaling and portfolio limits. Every multiplier applied here is <= 1.

use tracing::debug;

use crate::config::RiskParameters;
use crate::model::{KellyMode, MarketOpportunity};
use crate::sizing::calibration::ConfidenceCurve;

/// A fraction after one adjustment stage, with the penalty it incurred
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Adjusted {
    pub fraction: f64,
    pub penalty: f64,
}

/// Scale Kelly by the calibrated confidence multiplier.
///
/// Below `min_confidence` the multiplier is 0 regardless of the curve.
pub fn apply_confidence(
    kelly: f64,
    confidence: f64,
    min_confidence: f64,
    curve: &ConfidenceCurve,
) -> Adjusted {
    if confidence < min_confidence {
        return Adjusted {
            fraction: 0.0,
            penalty: 1.0,
        };
    }

    let multiplier = curve.multiplier(confidence);
    Adjusted {
        fraction: kelly * multiplier,
        penalty: 1.0 - multiplier,
    }
}

/// Apply liquidity, spread and time-decay penalties in sequence.
///
/// The reported penalty is the sum of each multiplier's complement; the
/// fraction itself composes multiplicatively.
pub fn apply_risk(kelly: f64, opportunity: &MarketOpportunity, params: &RiskParameters) -> Adjusted {
    let mut fraction = kelly;
    let mut penalty = 0.0;

    if opportunity.liquidity < params.liquidity_threshold {
        let multiplier = params.liquidity_multiplier;
        fraction *= multiplier;
        penalty += 1.0 - multiplier;
        debug!(market_id = %opportunity.market_id, liquidity = opportunity.liquidity, multiplier, "Liquidity penalty");
    }

    if opportunity.bid_ask_spread > params.spread_threshold {
        let multiplier = spread_multiplier(opportunity.bid_ask_spread, params);
        fraction *= multiplier;
        penalty += 1.0 - multiplier;
        debug!(market_id = %opportunity.market_id, spread = opportunity.bid_ask_spread, multiplier, "Spread penalty");
    }

    if opportunity.time_to_resolution > params.horizon_threshold_hours {
        let multiplier = time_decay_multiplier(opportunity.time_to_resolution, params);
        fraction *= multiplier;
        penalty += 1.0 - multiplier;
        debug!(market_id = %opportunity.market_id, hours = opportunity.time_to_resolution, multiplier, "Time-decay penalty");
    }

    Adjusted { fraction, penalty }
}

/// `max(1 - slope*spread, floor)`
pub fn spread_multiplier(spread: f64, params: &RiskParameters) -> f64 {
    (1.0 - spread * params.spread_slope).max(params.spread_floor)
}

/// `decay ^ (excess_hours / hours_per_week)`, 1 inside the threshold
pub fn time_decay_multiplier(hours: u32, params: &RiskParameters) -> f64 {
    if hours <= params.horizon_threshold_hours {
        return 1.0;
    }
    let weeks_excess = f64::from(hours - params.horizon_threshold_hours) / f64::from(params.hours_per_week);
    params.time_decay_factor.powf(weeks_excess)
}

/// Multiplier the mode applies to an already-adjusted fraction
pub fn mode_multiplier(mode: KellyMode, kelly: f64) -> f64 {
    match mode {
        KellyMode::Full => 1.0,
        KellyMode::Half => 0.5,
        KellyMode::Quarter => 0.25,
        KellyMode::Adaptive => {
            if kelly > 0.2 {
                0.25
            } else if kelly > 0.1 {
                0.5
            } else {
                0.75
            }
        }
    }
}

pub fn apply_mode_scaling(kelly: f64, mode: KellyMode) -> f64 {
    kelly * mode_multiplier(mode, kelly)
}

/// Hard-cap the fraction, then throttle it when existing exposure is too high.
///
/// Existing positions are fractions of bankroll. Their plain sum stands in
/// for correlated exposure; there is no covariance model here.
pub fn apply_portfolio_constraints(
    kelly: f64,
    max_position_size: f64,
    max_correlation_exposure: f64,
    existing_positions: Option<&[f64]>,
) -> f64 {
    let mut fraction = kelly.min(max_position_size);

    if let Some(positions) = existing_positions.filter(|p| !p.is_empty()) {
        let total_exposure: f64 = positions.iter().sum();
        if total_exposure > max_correlation_exposure {
            let reduction = correlation_reduction(total_exposure, max_correlation_exposure);
            debug!(total_exposure, reduction, "Correlated exposure throttle");
            fraction *= reduction;
        }
    }

    fraction
}

/// `max(0.5, 1 - (exposure - limit))`
pub fn correlation_reduction(total_exposure: f64, limit: f64) -> f64 {
    (1.0 - (total_exposure - limit)).max(0.5)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn liquid_market() -> MarketOpportunity {
        MarketOpportunity::new("m", 0.7, 0.5, 0.8)
            .with_liquidity(5000.0)
            .with_spread(0.02)
            .with_time_to_resolution(720)
    }

    #[test]
    fn test_confidence_below_threshold_zeroes() {
        let curve = ConfidenceCurve::default();
        let adjusted = apply_confidence(0.9, 0.55, 0.6, &curve);
        assert_eq!(adjusted.fraction, 0.0);
        assert_eq!(adjusted.penalty, 1.0);
    }

    #[test]
    fn test_confidence_uses_curve() {
        let curve = ConfidenceCurve::default();
        let adjusted = apply_confidence(0.4, 0.85, 0.6, &curve);
        assert!(close(adjusted.fraction, 0.35));
        assert!(close(adjusted.penalty, 0.125));
    }

    #[test]
    fn test_risk_no_penalties_for_liquid_market() {
        let adjusted = apply_risk(0.2, &liquid_market(), &RiskParameters::default());
        assert_eq!(adjusted.fraction, 0.2);
        assert_eq!(adjusted.penalty, 0.0);
    }

    #[test]
    fn test_liquidity_penalty() {
        let opp = liquid_market().with_liquidity(500.0);
        let adjusted = apply_risk(0.2, &opp, &RiskParameters::default());
        assert!(close(adjusted.fraction, 0.18));
        assert!(close(adjusted.penalty, 0.1));
    }

    #[test]
    fn test_spread_penalty_and_floor() {
        let params = RiskParameters::default();
        assert!(close(spread_multiplier(0.1, &params), 0.8));
        assert_eq!(spread_multiplier(0.4, &params), 0.5);

        let opp = liquid_market().with_spread(0.1);
        let adjusted = apply_risk(0.2, &opp, &params);
        assert!(close(adjusted.fraction, 0.16));
        assert!(close(adjusted.penalty, 0.2));

        // At the threshold no penalty applies
        let opp = liquid_market().with_spread(0.05);
        assert_eq!(apply_risk(0.2, &opp, &params).fraction, 0.2);
    }

    #[test]
    fn test_time_decay_penalty() {
        let params = RiskParameters::default();
        assert_eq!(time_decay_multiplier(2160, &params), 1.0);
        // Two weeks beyond three months
        assert!(close(time_decay_multiplier(2160 + 336, &params), 0.95 * 0.95));

        let opp = liquid_market().with_time_to_resolution(2160 + 168);
        let adjusted = apply_risk(0.2, &opp, &params);
        assert!(close(adjusted.fraction, 0.19));
        assert!(close(adjusted.penalty, 0.05));
    }

    #[test]
    fn test_risk_penalties_compose_multiplicatively() {
        let opp = liquid_market()
            .with_liquidity(100.0)
            .with_spread(0.1)
            .with_time_to_resolution(2160 + 168);
        let adjusted = apply_risk(1.0, &opp, &RiskParameters::default());
        assert!(close(adjusted.fraction, 0.9 * 0.8 * 0.95));
        assert!(close(adjusted.penalty, 0.1 + 0.2 + 0.05));
    }

    #[test]
    fn test_mode_scaling() {
        assert_eq!(apply_mode_scaling(0.4, KellyMode::Full), 0.4);
        assert_eq!(apply_mode_scaling(0.4, KellyMode::Half), 0.2);
        assert_eq!(apply_mode_scaling(0.4, KellyMode::Quarter), 0.1);
    }

    #[test]
    fn test_adaptive_tiers() {
        assert!(close(apply_mode_scaling(0.4, KellyMode::Adaptive), 0.1));
        assert!(close(apply_mode_scaling(0.15, KellyMode::Adaptive), 0.075));
        assert!(close(apply_mode_scaling(0.08, KellyMode::Adaptive), 0.06));
        // Tier boundaries are exclusive
        assert!(close(apply_mode_scaling(0.2, KellyMode::Adaptive), 0.1));
        assert!(close(apply_mode_scaling(0.1, KellyMode::Adaptive), 0.075));
    }

    #[test]
    fn test_hard_cap() {
        assert_eq!(apply_portfolio_constraints(0.4, 0.15, 0.3, None), 0.15);
        assert_eq!(apply_portfolio_constraints(0.05, 0.15, 0.3, None), 0.05);
        assert_eq!(apply_portfolio_constraints(0.05, 0.15, 0.3, Some(&[])), 0.05);
    }

    #[test]
    fn test_correlation_throttle() {
        let existing = [0.2, 0.15];
        let fraction = apply_portfolio_constraints(0.1, 0.15, 0.3, Some(&existing));
        assert!(close(fraction, 0.1 * 0.95));

        // Exposure within the limit leaves the fraction alone
        let fraction = apply_portfolio_constraints(0.1, 0.15, 0.3, Some(&[0.1, 0.1]));
        assert_eq!(fraction, 0.1);
    }

    #[test]
    fn test_correlation_reduction_floor() {
        assert!(close(correlation_reduction(0.35, 0.3), 0.95));
        assert_eq!(correlation_reduction(2.0, 0.3), 0.5);
    }
}
