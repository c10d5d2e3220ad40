//! Recommendation and Reasoning
//!
//! Maps the final fraction to an action and renders the audit trail.

use crate::model::{KellyMode, MarketOpportunity, Recommendation};

/// Below this fraction a position is not worth taking
pub const MIN_ACTIONABLE_FRACTION: f64 = 0.01;

/// At or above this fraction a full-size directional buy is recommended
pub const FULL_POSITION_FRACTION: f64 = 0.05;

pub fn recommend(
    final_fraction: f64,
    expected_value: f64,
    opportunity: &MarketOpportunity,
) -> Recommendation {
    if final_fraction < MIN_ACTIONABLE_FRACTION || expected_value <= 0.0 {
        Recommendation::Hold
    } else if final_fraction >= FULL_POSITION_FRACTION {
        if opportunity.probability_estimate > opportunity.market_price {
            Recommendation::BuyYes
        } else {
            Recommendation::BuyNo
        }
    } else {
        Recommendation::SmallBuy
    }
}

/// Values recorded along the pipeline for the audit trail
#[derive(Clone, Copy, Debug)]
pub struct SizingTrace {
    pub base_kelly: f64,
    pub confidence_penalty: f64,
    pub risk_penalty: f64,
    pub mode: KellyMode,
    pub final_fraction: f64,
}

impl SizingTrace {
    /// Pipe-joined, human-readable trace
    pub fn reasoning(&self) -> String {
        let mut parts = vec![format!("Base Kelly: {:.3}", self.base_kelly)];

        if self.confidence_penalty > 0.0 {
            parts.push(format!("Confidence adjustment: -{}", percent(self.confidence_penalty)));
        }
        if self.risk_penalty > 0.0 {
            parts.push(format!("Risk adjustments: -{}", percent(self.risk_penalty)));
        }

        parts.push(format!("Kelly mode: {}", self.mode));
        parts.push(format!("Final position: {}", percent(self.final_fraction)));

        if self.final_fraction < MIN_ACTIONABLE_FRACTION {
            parts.push("Position too small - recommend HOLD".into());
        }

        parts.join(" | ")
    }
}

fn percent(fraction: f64) -> String {
    format!("{:.1}%", fraction * 100.0)
}
