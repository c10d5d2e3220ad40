//! Engine Configuration
//!
//! Constructor-time settings for the sizing engine. Nothing here is
//! mutated once an engine has been built.

use crate::error::{Result, SizerError};
use crate::model::KellyMode;

pub const ENV_KELLY_MODE: &str = "KELLY_MODE";
pub const ENV_MAX_POSITION_SIZE: &str = "KELLY_MAX_POSITION_SIZE";
pub const ENV_MIN_CONFIDENCE: &str = "KELLY_MIN_CONFIDENCE";
pub const ENV_MAX_CORRELATION_EXPOSURE: &str = "KELLY_MAX_CORRELATION_EXPOSURE";
pub const ENV_STRESS_TEST: &str = "KELLY_STRESS_TEST";

/// Penalty constants for the risk-adjustment stage
#[derive(Clone, Debug, PartialEq)]
pub struct RiskParameters {
    /// Liquidity below this is penalized
    pub liquidity_threshold: f64,

    /// Multiplier applied to illiquid markets
    pub liquidity_multiplier: f64,

    /// Spreads above this are penalized
    pub spread_threshold: f64,

    /// Penalty slope per unit of spread
    pub spread_slope: f64,

    /// Spread penalty never removes more than `1 - spread_floor`
    pub spread_floor: f64,

    /// Horizons beyond this many hours decay
    pub horizon_threshold_hours: u32,

    /// Hours per decay period
    pub hours_per_week: u32,

    /// Multiplier per excess week
    pub time_decay_factor: f64,
}

impl Default for RiskParameters {
    fn default() -> Self {
        Self {
            liquidity_threshold: 1000.0,
            liquidity_multiplier: 0.9,
            spread_threshold: 0.05,
            spread_slope: 2.0,
            spread_floor: 0.5,
            horizon_threshold_hours: 2160,
            hours_per_week: 168,
            time_decay_factor: 0.95,
        }
    }
}

/// Sizing engine configuration
#[derive(Clone, Debug, PartialEq)]
pub struct SizingConfig {
    /// Fractional-Kelly policy
    pub kelly_mode: KellyMode,

    /// Hard cap on any single position (fraction of bankroll)
    pub max_position_size: f64,

    /// Below this confidence no position is taken
    pub min_confidence_threshold: f64,

    /// Existing exposure above which new positions are throttled
    pub max_correlation_exposure: f64,

    /// Re-evaluate under pessimistic scenarios
    pub enable_stress_test: bool,

    /// Liquidity, spread and horizon penalties
    pub risk: RiskParameters,
}

impl Default for SizingConfig {
    fn default() -> Self {
        Self::balanced()
    }
}

impl SizingConfig {
    /// Half Kelly with the standard safety limits
    pub fn balanced() -> Self {
        Self {
            kelly_mode: KellyMode::Half,
            max_position_size: 0.15,
            min_confidence_threshold: 0.6,
            max_correlation_exposure: 0.3,
            enable_stress_test: true,
            risk: RiskParameters::default(),
        }
    }

    /// Quarter Kelly, tighter cap and higher confidence floor
    pub fn conservative() -> Self {
        Self {
            kelly_mode: KellyMode::Quarter,
            max_position_size: 0.10,
            min_confidence_threshold: 0.7,
            max_correlation_exposure: 0.2,
            ..Self::balanced()
        }
    }

    /// Full Kelly; stress testing stays on
    pub fn aggressive() -> Self {
        Self {
            kelly_mode: KellyMode::Full,
            max_position_size: 0.25,
            min_confidence_threshold: 0.6,
            max_correlation_exposure: 0.5,
            ..Self::balanced()
        }
    }

    /// Adaptive tiering with the standard limits
    pub fn adaptive() -> Self {
        Self {
            kelly_mode: KellyMode::Adaptive,
            ..Self::balanced()
        }
    }

    pub const fn with_mode(mut self, mode: KellyMode) -> Self {
        self.kelly_mode = mode;
        self
    }

    pub const fn with_stress_test(mut self, enabled: bool) -> Self {
        self.enable_stress_test = enabled;
        self
    }

    /// Load from environment variables, falling back to `balanced()` for unset keys
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary key lookup (environment, parsed `.env`, test map)
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::balanced();

        if let Some(mode) = lookup(ENV_KELLY_MODE) {
            config.kelly_mode = mode.parse()?;
        }
        if let Some(value) = lookup(ENV_MAX_POSITION_SIZE) {
            config.max_position_size = parse_f64(ENV_MAX_POSITION_SIZE, &value)?;
        }
        if let Some(value) = lookup(ENV_MIN_CONFIDENCE) {
            config.min_confidence_threshold = parse_f64(ENV_MIN_CONFIDENCE, &value)?;
        }
        if let Some(value) = lookup(ENV_MAX_CORRELATION_EXPOSURE) {
            config.max_correlation_exposure = parse_f64(ENV_MAX_CORRELATION_EXPOSURE, &value)?;
        }
        if let Some(value) = lookup(ENV_STRESS_TEST) {
            config.enable_stress_test = parse_bool(ENV_STRESS_TEST, &value)?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Check every limit is inside its meaningful range
    pub fn validate(&self) -> Result<()> {
        if !(self.max_position_size > 0.0 && self.max_position_size <= 1.0) {
            return Err(SizerError::Config(format!(
                "max_position_size must be in (0, 1], got {}",
                self.max_position_size
            )));
        }
        if !(0.0..=1.0).contains(&self.min_confidence_threshold) {
            return Err(SizerError::Config(format!(
                "min_confidence_threshold must be in [0, 1], got {}",
                self.min_confidence_threshold
            )));
        }
        if !(self.max_correlation_exposure > 0.0 && self.max_correlation_exposure.is_finite()) {
            return Err(SizerError::Config(format!(
                "max_correlation_exposure must be positive, got {}",
                self.max_correlation_exposure
            )));
        }
        self.risk.validate()
    }
}

impl RiskParameters {
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("liquidity_multiplier", self.liquidity_multiplier),
            ("spread_floor", self.spread_floor),
            ("time_decay_factor", self.time_decay_factor),
        ] {
            if !(value > 0.0 && value <= 1.0) {
                return Err(SizerError::Config(format!(
                    "{name} must be in (0, 1], got {value}"
                )));
            }
        }
        for (name, value) in [
            ("liquidity_threshold", self.liquidity_threshold),
            ("spread_threshold", self.spread_threshold),
            ("spread_slope", self.spread_slope),
        ] {
            if !(value >= 0.0 && value.is_finite()) {
                return Err(SizerError::Config(format!(
                    "{name} must be non-negative, got {value}"
                )));
            }
        }
        if self.hours_per_week == 0 {
            return Err(SizerError::Config("hours_per_week must be positive".into()));
        }
        Ok(())
    }
}

fn parse_f64(key: &str, value: &str) -> Result<f64> {
    value
        .trim()
        .parse()
        .map_err(|_| SizerError::Config(format!("{key}: '{value}' is not a number")))
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(SizerError::Config(format!("{key}: '{value}' is not a boolean"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = SizingConfig::default();
        assert_eq!(config.kelly_mode, KellyMode::Half);
        assert_eq!(config.max_position_size, 0.15);
        assert_eq!(config.min_confidence_threshold, 0.6);
        assert_eq!(config.max_correlation_exposure, 0.3);
        assert!(config.enable_stress_test);
        assert_eq!(config.risk.time_decay_factor, 0.95);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_presets_validate() {
        for config in [
            SizingConfig::conservative(),
            SizingConfig::balanced(),
            SizingConfig::aggressive(),
            SizingConfig::adaptive(),
        ] {
            assert!(config.validate().is_ok(), "{config:?}");
        }
        assert_eq!(SizingConfig::adaptive().kelly_mode, KellyMode::Adaptive);
    }

    #[test]
    fn test_from_lookup_overrides() {
        let config = SizingConfig::from_lookup(lookup_from(&[
            (ENV_KELLY_MODE, "quarter"),
            (ENV_MAX_POSITION_SIZE, "0.1"),
            (ENV_STRESS_TEST, "false"),
        ]))
        .unwrap();

        assert_eq!(config.kelly_mode, KellyMode::Quarter);
        assert_eq!(config.max_position_size, 0.1);
        assert!(!config.enable_stress_test);
        assert_eq!(config.min_confidence_threshold, 0.6);
    }

    #[test]
    fn test_from_lookup_rejects_garbage() {
        let err = SizingConfig::from_lookup(lookup_from(&[(ENV_MIN_CONFIDENCE, "high")]))
            .unwrap_err();
        assert!(matches!(err, SizerError::Config(_)));

        let err = SizingConfig::from_lookup(lookup_from(&[(ENV_STRESS_TEST, "maybe")]))
            .unwrap_err();
        assert!(matches!(err, SizerError::Config(_)));

        let err = SizingConfig::from_lookup(lookup_from(&[(ENV_MAX_POSITION_SIZE, "1.5")]))
            .unwrap_err();
        assert!(err.to_string().contains("max_position_size"));
    }

    #[test]
    fn test_validate_risk_parameters() {
        let mut config = SizingConfig::default();
        config.risk.time_decay_factor = 1.2;
        assert!(config.validate().is_err());

        let mut config = SizingConfig::default();
        config.risk.hours_per_week = 0;
        assert!(config.validate().is_err());

        let mut config = SizingConfig::default();
        config.max_correlation_exposure = 0.0;
        assert!(config.validate().is_err());
    }
}
