//! Sizing Pipeline
//!
//! Validation → base Kelly → expected value → confidence → risk → mode →
//! portfolio cap → stress test → recommendation.

pub mod adjustments;
pub mod calibration;
pub mod engine;
pub mod kelly;
pub mod report;
pub mod stress;

pub use calibration::ConfidenceCurve;
pub use engine::KellyOptimizer;
pub use kelly::{base_kelly, expected_value, validate};
