//! Position Sizing Engine
//!
//! Composes the sizing stages in fixed order over one opportunity. The
//! engine holds configuration only, so one instance can be shared across
//! threads and evaluations.

use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use tracing::debug;

use crate::config::SizingConfig;
use crate::error::Result;
use crate::model::{KellyResult, MarketOpportunity};
use crate::sizing::adjustments::{
    apply_confidence, apply_mode_scaling, apply_portfolio_constraints, apply_risk,
};
use crate::sizing::calibration::ConfidenceCurve;
use crate::sizing::kelly::{base_kelly, expected_value, validate};
use crate::sizing::report::{SizingTrace, recommend};
use crate::sizing::stress::stress_test;

pub const INVALID_OPPORTUNITY: &str = "Invalid opportunity parameters";

/// Risk-adjusted Kelly optimizer
#[derive(Clone, Debug, Default)]
pub struct KellyOptimizer {
    config: SizingConfig,
    curve: ConfidenceCurve,
}

impl KellyOptimizer {
    /// Create an optimizer, rejecting out-of-range configuration
    pub fn new(config: SizingConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            curve: ConfidenceCurve::default(),
        })
    }

    /// Replace the default calibration curve
    pub fn with_curve(mut self, curve: ConfidenceCurve) -> Self {
        self.curve = curve;
        self
    }

    pub const fn config(&self) -> &SizingConfig {
        &self.config
    }

    pub const fn curve(&self) -> &ConfidenceCurve {
        &self.curve
    }

    /// Size one opportunity.
    ///
    /// `existing_positions` are current position sizes as fractions of
    /// bankroll; they only feed the correlated-exposure throttle. Invalid
    /// opportunities return a zero-size HOLD without running the pipeline.
    pub fn calculate_optimal_position(
        &self,
        opportunity: &MarketOpportunity,
        bankroll: Decimal,
        existing_positions: Option<&[f64]>,
    ) -> KellyResult {
        if !validate(opportunity) {
            debug!(market_id = %opportunity.market_id, "Invalid opportunity, holding");
            return KellyResult::hold(&opportunity.market_id, INVALID_OPPORTUNITY);
        }

        let p = opportunity.probability_estimate;
        let price = opportunity.market_price;

        let kelly = base_kelly(p, price);
        let ev = expected_value(p, price);

        let confidence = apply_confidence(
            kelly,
            opportunity.confidence_level,
            self.config.min_confidence_threshold,
            &self.curve,
        );
        let risk = apply_risk(confidence.fraction, opportunity, &self.config.risk);
        let scaled = apply_mode_scaling(risk.fraction, self.config.kelly_mode);
        let constrained = apply_portfolio_constraints(
            scaled,
            self.config.max_position_size,
            self.config.max_correlation_exposure,
            existing_positions,
        );

        let final_fraction = if self.config.enable_stress_test {
            stress_test(constrained, opportunity)
        } else {
            constrained
        };

        debug!(
            market_id = %opportunity.market_id,
            edge = opportunity.edge(),
            base_kelly = kelly,
            confidence_adjusted = confidence.fraction,
            risk_adjusted = risk.fraction,
            mode_scaled = scaled,
            constrained,
            final_fraction,
            "Sized opportunity"
        );

        let trace = SizingTrace {
            base_kelly: kelly,
            confidence_penalty: confidence.penalty,
            risk_penalty: risk.penalty,
            mode: self.config.kelly_mode,
            final_fraction,
        };

        let mut result = KellyResult {
            market_id: opportunity.market_id.clone(),
            kelly_fraction: kelly,
            adjusted_fraction: final_fraction,
            expected_value: ev,
            confidence_adjustment: confidence.penalty,
            risk_adjustment: risk.penalty,
            final_position_size: final_fraction,
            stake_amount: Decimal::ZERO,
            recommendation: recommend(final_fraction, ev, opportunity),
            reasoning: trace.reasoning(),
        };
        settle_stake(&mut result, bankroll);
        result
    }
}

/// Set the stake from the final fraction; a HOLD commits nothing.
pub(crate) fn settle_stake(result: &mut KellyResult, bankroll: Decimal) {
    result.stake_amount = if result.is_actionable() {
        stake_for(result.final_position_size, bankroll)
    } else {
        Decimal::ZERO
    };
}

/// Bankroll share for a fraction, rounded to cents.
///
/// Zero for a non-positive bankroll or fraction.
pub fn stake_for(fraction: f64, bankroll: Decimal) -> Decimal {
    if bankroll <= Decimal::ZERO || fraction.is_nan() || fraction <= 0.0 {
        return Decimal::ZERO;
    }
    Decimal::from_f64(fraction)
        .and_then(|f| f.checked_mul(bankroll))
        .map_or(Decimal::ZERO, |stake| stake.round_dp(2))
}
