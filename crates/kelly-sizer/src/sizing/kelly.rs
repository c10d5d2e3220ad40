//! Base Kelly and Expected Value
//!
//! Kelly for a binary market bought at `price`:
//!
//! ```text
//! b = 1/price - 1        (net decimal odds)
//! q = 1 - p
//! f* = (p*b - q) / b     (clamped at 0)
//! ```

use crate::model::MarketOpportunity;

/// Prices at or above this leave no meaningful edge to size
pub const NEAR_CERTAIN_PRICE: f64 = 0.99;

/// Check every bound an opportunity must satisfy before sizing.
///
/// NaN in any checked field fails the corresponding comparison.
pub fn validate(opportunity: &MarketOpportunity) -> bool {
    let p = opportunity.probability_estimate;
    let price = opportunity.market_price;
    let confidence = opportunity.confidence_level;

    (p > 0.0 && p < 1.0)
        && (price > 0.0 && price < 1.0)
        && (0.0..=1.0).contains(&confidence)
        && opportunity.liquidity >= 0.0
        && opportunity.bid_ask_spread >= 0.0
}

/// Classic Kelly fraction for buying "yes" at `price` with win probability `p`
pub fn base_kelly(p: f64, price: f64) -> f64 {
    if !(price > 0.0 && price < 1.0) || price >= NEAR_CERTAIN_PRICE {
        return 0.0;
    }

    let odds = 1.0 / price - 1.0;
    if odds <= 0.0 {
        return 0.0;
    }

    let q = 1.0 - p;
    let kelly = (p * odds - q) / odds;

    kelly.max(0.0)
}

/// Expected profit per unit staked: `p/price - 1`
pub fn expected_value(p: f64, price: f64) -> f64 {
    if !(price > 0.0 && price < 1.0) {
        return 0.0;
    }
    p / price - 1.0
}
