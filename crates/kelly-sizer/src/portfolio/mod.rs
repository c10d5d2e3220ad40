//! Portfolio-Level Sizing
//!
//! Batch evaluation across several markets.

mod correlation;
mod multi_market;

pub use correlation::CorrelationMatrix;
pub use multi_market::total_fraction;
