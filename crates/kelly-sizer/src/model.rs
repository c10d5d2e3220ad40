//! Domain Models
//!
//! Input opportunities, sizing results and the discrete trading actions.
//! Fractions and probabilities are `f64`; the stake is `rust_decimal` money.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::SizerError;

/// A binary prediction-market opportunity to be sized
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MarketOpportunity {
    /// Our estimated probability of the "yes" outcome, in (0, 1)
    pub probability_estimate: f64,

    /// Market-implied probability (cost of one "yes" unit), in (0, 1)
    pub market_price: f64,

    /// Confidence in `probability_estimate`, in [0, 1]
    pub confidence_level: f64,

    /// Available depth at the current price
    pub liquidity: f64,

    /// Fractional bid/ask spread
    pub bid_ask_spread: f64,

    /// Hours until the market resolves
    pub time_to_resolution: u32,

    /// Opaque identifier, only used to correlate results
    pub market_id: String,
}

impl MarketOpportunity {
    /// Create an opportunity with no liquidity, zero spread and immediate resolution.
    ///
    /// Use the `with_*` methods to describe the market microstructure.
    pub fn new(
        market_id: impl Into<String>,
        probability_estimate: f64,
        market_price: f64,
        confidence_level: f64,
    ) -> Self {
        Self {
            probability_estimate,
            market_price,
            confidence_level,
            liquidity: 0.0,
            bid_ask_spread: 0.0,
            time_to_resolution: 0,
            market_id: market_id.into(),
        }
    }

    pub fn with_liquidity(mut self, liquidity: f64) -> Self {
        self.liquidity = liquidity;
        self
    }

    pub fn with_spread(mut self, bid_ask_spread: f64) -> Self {
        self.bid_ask_spread = bid_ask_spread;
        self
    }

    pub fn with_time_to_resolution(mut self, hours: u32) -> Self {
        self.time_to_resolution = hours;
        self
    }

    /// Edge of our estimate over the market price
    pub fn edge(&self) -> f64 {
        self.probability_estimate - self.market_price
    }
}

/// Fractional-Kelly policy applied after the risk adjustments
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KellyMode {
    /// Full Kelly (aggressive)
    Full,

    /// 50% Kelly (balanced)
    #[default]
    Half,

    /// 25% Kelly (conservative)
    Quarter,

    /// Tiered by the magnitude of the adjusted fraction
    Adaptive,
}

impl KellyMode {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Half => "half",
            Self::Quarter => "quarter",
            Self::Adaptive => "adaptive",
        }
    }
}

impl fmt::Display for KellyMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for KellyMode {
    type Err = SizerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "full" => Ok(Self::Full),
            "half" => Ok(Self::Half),
            "quarter" => Ok(Self::Quarter),
            "adaptive" => Ok(Self::Adaptive),
            other => Err(SizerError::Config(format!(
                "unknown kelly mode '{other}' (expected full, half, quarter or adaptive)"
            ))),
        }
    }
}

/// Discrete action derived from the final position size
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Recommendation {
    Hold,
    BuyYes,
    BuyNo,
    SmallBuy,
}

impl Recommendation {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Hold => "HOLD",
            Self::BuyYes => "BUY_YES",
            Self::BuyNo => "BUY_NO",
            Self::SmallBuy => "SMALL_BUY",
        }
    }
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of sizing one opportunity
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct KellyResult {
    /// Market the result belongs to
    pub market_id: String,

    /// Raw Kelly fraction before any adjustment
    pub kelly_fraction: f64,

    /// Fraction after confidence, risk, mode, portfolio and stress stages
    pub adjusted_fraction: f64,

    /// Expected profit per unit staked
    pub expected_value: f64,

    /// Confidence penalty applied, in [0, 1]
    pub confidence_adjustment: f64,

    /// Summed risk penalties (reporting heuristic)
    pub risk_adjustment: f64,

    /// Fraction of bankroll to commit; equals `adjusted_fraction`
    pub final_position_size: f64,

    /// Stake in bankroll currency
    pub stake_amount: Decimal,

    /// Discrete action
    pub recommendation: Recommendation,

    /// Human-readable audit trail
    pub reasoning: String,
}

impl KellyResult {
    /// All-zero HOLD result
    pub fn hold(market_id: impl Into<String>, reasoning: impl Into<String>) -> Self {
        Self {
            market_id: market_id.into(),
            kelly_fraction: 0.0,
            adjusted_fraction: 0.0,
            expected_value: 0.0,
            confidence_adjustment: 0.0,
            risk_adjustment: 0.0,
            final_position_size: 0.0,
            stake_amount: Decimal::ZERO,
            recommendation: Recommendation::Hold,
            reasoning: reasoning.into(),
        }
    }

    /// Whether the result recommends committing capital
    pub fn is_actionable(&self) -> bool {
        self.recommendation != Recommendation::Hold
    }

    /// Generate a printable report
    pub fn summary(&self) -> String {
        let mut s = String::new();
        s.push_str(&format!("Kelly Position Sizing: {}\n", self.market_id));
        s.push_str(&format!("  Base Kelly:      {:.1}%\n", self.kelly_fraction * 100.0));
        s.push_str(&format!("  Final Position:  {:.1}%\n", self.final_position_size * 100.0));
        s.push_str(&format!("  Stake:           ${:.2}\n", self.stake_amount));
        s.push_str(&format!("  Expected Value:  {:.3}\n", self.expected_value));
        s.push_str(&format!("  Recommendation:  {}\n", self.recommendation));
        s.push_str(&format!("  Reasoning:       {}\n", self.reasoning));
        s
    }
}
