//! Error Types for the Kelly Sizer
//!
//! Invalid opportunities are not errors: they size to a HOLD result.
//! These variants cover configuration and caller-contract violations only.

use rust_decimal::Decimal;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, SizerError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SizerError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid confidence curve: {0}")]
    InvalidCurve(String),

    #[error("Invalid correlation matrix: {0}")]
    InvalidCorrelation(String),

    #[error("Bankroll must be positive, got {0}")]
    InvalidBankroll(Decimal),
}

impl SizerError {
    /// Stable machine-readable code for API responses
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Config(_) => "INVALID_CONFIG",
            Self::InvalidCurve(_) => "INVALID_CURVE",
            Self::InvalidCorrelation(_) => "INVALID_CORRELATION",
            Self::InvalidBankroll(_) => "INVALID_BANKROLL",
        }
    }
}
