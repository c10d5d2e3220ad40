//! Stress Testing
//!
//! Re-derives Kelly from scratch under pessimistic re-estimates of the
//! opportunity and keeps the worst case.

use tracing::debug;

use crate::model::MarketOpportunity;
use crate::sizing::kelly::base_kelly;

/// Floor applied to stressed probabilities
pub const MIN_STRESSED_PROBABILITY: f64 = 0.01;

/// Confidence multiplier applied in every scenario
pub const CONFIDENCE_SHOCK: f64 = 0.8;

/// Liquidity multiplier applied in every scenario
pub const LIQUIDITY_SHOCK: f64 = 0.7;

/// Extra conservatism on each stressed Kelly value
pub const STRESSED_KELLY_SCALE: f64 = 0.5;

/// Haircut on the worst case
pub const WORST_CASE_HAIRCUT: f64 = 0.8;

/// An adverse re-estimate of an opportunity
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StressScenario {
    /// Added to the probability estimate (negative = overestimated edge)
    pub probability_shift: f64,

    /// Multiplier on the bid/ask spread
    pub spread_multiplier: f64,
}

/// Large, moderate and small overestimates of the probability
pub const SCENARIOS: [StressScenario; 3] = [
    StressScenario { probability_shift: -0.20, spread_multiplier: 2.0 },
    StressScenario { probability_shift: -0.15, spread_multiplier: 1.5 },
    StressScenario { probability_shift: -0.10, spread_multiplier: 1.2 },
];

impl StressScenario {
    /// Perturbed copy of the opportunity
    pub fn apply(&self, opportunity: &MarketOpportunity) -> MarketOpportunity {
        MarketOpportunity {
            probability_estimate: (opportunity.probability_estimate + self.probability_shift)
                .max(MIN_STRESSED_PROBABILITY),
            confidence_level: opportunity.confidence_level * CONFIDENCE_SHOCK,
            liquidity: opportunity.liquidity * LIQUIDITY_SHOCK,
            bid_ask_spread: opportunity.bid_ask_spread * self.spread_multiplier,
            ..opportunity.clone()
        }
    }

    /// Conservatively scaled Kelly under this scenario
    pub fn stressed_kelly(&self, opportunity: &MarketOpportunity) -> f64 {
        let stressed = self.apply(opportunity);
        base_kelly(stressed.probability_estimate, stressed.market_price) * STRESSED_KELLY_SCALE
    }
}

/// Worst of the candidate fraction and every scenario, with a final haircut.
///
/// Never exceeds `fraction` for non-negative input.
pub fn stress_test(fraction: f64, opportunity: &MarketOpportunity) -> f64 {
    let worst_case = SCENARIOS
        .iter()
        .map(|scenario| scenario.stressed_kelly(opportunity))
        .fold(fraction, f64::min);

    let stressed = worst_case * WORST_CASE_HAIRCUT;
    debug!(market_id = %opportunity.market_id, fraction, worst_case, stressed, "Stress test");
    stressed
}
