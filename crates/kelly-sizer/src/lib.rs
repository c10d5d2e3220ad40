//! # kelly-sizer
//!
//! Risk-adjusted Kelly position sizing for binary prediction markets.
//!
//! Converts a probability estimate, a market price and a handful of risk
//! signals into a bounded bet-size recommendation with an audit trail.
//!
//! ## Philosophy
//!
//! Raw Kelly assumes the probability is known exactly. It never is, so the
//! sizer only ever shrinks the textbook fraction:
//!
//! - **Calibrated confidence** - Low confidence means a smaller bet, or none
//! - **Market frictions** - Thin books, wide spreads and long lock-ups cost size
//! - **Fractional Kelly** - Trade growth rate for lower variance
//! - **Hard limits** - No single position exceeds the configured cap
//! - **Stress testing** - Size must survive a worse estimate of the edge
//!
//! ## Pipeline
//!
//! ```text
//! ┌──────────────┐   ┌────────────┐   ┌────────────┐   ┌────────────┐
//! │  validate    │──▶│ base Kelly │──▶│ confidence │──▶│    risk    │
//! │ (else HOLD)  │   │  + EV      │   │   curve    │   │  penalties │
//! └──────────────┘   └────────────┘   └────────────┘   └─────┬──────┘
//!                                                            ▼
//! ┌──────────────┐   ┌────────────┐   ┌────────────┐   ┌────────────┐
//! │ recommend +  │◀──│   stress   │◀──│ portfolio  │◀──│    mode    │
//! │  reasoning   │   │    test    │   │ cap/thrott │   │  scaling   │
//! └──────────────┘   └────────────┘   └────────────┘   └────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust
//! use kelly_sizer::{KellyOptimizer, MarketOpportunity, Recommendation};
//! use rust_decimal_macros::dec;
//!
//! let optimizer = KellyOptimizer::default();
//! let opportunity = MarketOpportunity::new("btc_100k", 0.72, 0.35, 0.85)
//!     .with_liquidity(5000.0)
//!     .with_spread(0.02)
//!     .with_time_to_resolution(720);
//!
//! let result = optimizer.calculate_optimal_position(&opportunity, dec!(1000), None);
//! assert!(result.final_position_size <= 0.15);
//! assert_eq!(result.recommendation, Recommendation::BuyYes);
//! ```

pub mod config;
pub mod error;
pub mod model;
pub mod portfolio;
pub mod sizing;

pub use config::{RiskParameters, SizingConfig};
pub use error::{Result, SizerError};
pub use model::{KellyMode, KellyResult, MarketOpportunity, Recommendation};
pub use portfolio::CorrelationMatrix;
pub use sizing::{ConfidenceCurve, KellyOptimizer};
