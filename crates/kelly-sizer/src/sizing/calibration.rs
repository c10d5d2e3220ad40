//! Confidence Calibration
//!
//! Maps stated confidence to a Kelly shrinkage multiplier through an
//! ordered anchor table with piecewise-linear interpolation.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SizerError};

/// Default anchors: (confidence, multiplier)
pub const DEFAULT_ANCHORS: [(f64, f64); 6] = [
    (0.5, 0.0),
    (0.6, 0.2),
    (0.7, 0.5),
    (0.8, 0.8),
    (0.9, 0.95),
    (1.0, 1.0),
];

/// Monotonic confidence → multiplier curve
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<(f64, f64)>", into = "Vec<(f64, f64)>")]
pub struct ConfidenceCurve {
    points: Vec<(f64, f64)>,
}

impl Default for ConfidenceCurve {
    fn default() -> Self {
        Self {
            points: DEFAULT_ANCHORS.to_vec(),
        }
    }
}

impl ConfidenceCurve {
    /// Build a curve from anchors sorted by strictly increasing confidence.
    ///
    /// Multipliers must lie in [0, 1] and be non-decreasing.
    pub fn new(points: Vec<(f64, f64)>) -> Result<Self> {
        if points.is_empty() {
            return Err(SizerError::InvalidCurve("at least one anchor is required".into()));
        }

        for &(x, y) in &points {
            if !x.is_finite() || !y.is_finite() {
                return Err(SizerError::InvalidCurve(format!("non-finite anchor ({x}, {y})")));
            }
            if !(0.0..=1.0).contains(&y) {
                return Err(SizerError::InvalidCurve(format!(
                    "multiplier {y} at confidence {x} is outside [0, 1]"
                )));
            }
        }

        for pair in points.windows(2) {
            let (x1, y1) = pair[0];
            let (x2, y2) = pair[1];
            if x2 <= x1 {
                return Err(SizerError::InvalidCurve(format!(
                    "confidence anchors must strictly increase ({x1} then {x2})"
                )));
            }
            if y2 < y1 {
                return Err(SizerError::InvalidCurve(format!(
                    "multipliers must not decrease ({y1} at {x1}, {y2} at {x2})"
                )));
            }
        }

        Ok(Self { points })
    }

    pub fn points(&self) -> &[(f64, f64)] {
        &self.points
    }

    /// Multiplier for a confidence level
    pub fn multiplier(&self, confidence: f64) -> f64 {
        interpolate(&self.points, confidence)
    }
}

impl TryFrom<Vec<(f64, f64)>> for ConfidenceCurve {
    type Error = SizerError;

    fn try_from(points: Vec<(f64, f64)>) -> Result<Self> {
        Self::new(points)
    }
}

impl From<ConfidenceCurve> for Vec<(f64, f64)> {
    fn from(curve: ConfidenceCurve) -> Self {
        curve.points
    }
}

/// Piecewise-linear interpolation over sorted `(x, y)` anchors.
///
/// Clamps to the first/last `y` outside the anchor range. Returns 0 for an
/// empty table.
pub fn interpolate(points: &[(f64, f64)], x: f64) -> f64 {
    let (Some(&(first_x, first_y)), Some(&(last_x, last_y))) = (points.first(), points.last())
    else {
        return 0.0;
    };

    if x <= first_x {
        return first_y;
    }
    if x >= last_x {
        return last_y;
    }

    for pair in points.windows(2) {
        let (x1, y1) = pair[0];
        let (x2, y2) = pair[1];
        if x1 <= x && x <= x2 {
            return y1 + (y2 - y1) * (x - x1) / (x2 - x1);
        }
    }

    0.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_anchor_values() {
        let curve = ConfidenceCurve::default();
        for (x, y) in DEFAULT_ANCHORS {
            assert!(close(curve.multiplier(x), y), "x={x}");
        }
    }

    #[test]
    fn test_interpolation_between_anchors() {
        let curve = ConfidenceCurve::default();
        assert!(close(curve.multiplier(0.85), 0.875));
        assert!(close(curve.multiplier(0.65), 0.35));
        assert!(close(curve.multiplier(0.95), 0.975));
    }

    #[test]
    fn test_clamps_outside_range() {
        let curve = ConfidenceCurve::default();
        assert_eq!(curve.multiplier(0.1), 0.0);
        assert_eq!(curve.multiplier(1.5), 1.0);
    }

    #[test]
    fn test_curve_is_monotonic() {
        let curve = ConfidenceCurve::default();
        let mut previous = 0.0;
        for i in 0..=100 {
            let m = curve.multiplier(f64::from(i) / 100.0);
            assert!(m + 1e-12 >= previous);
            assert!((0.0..=1.0).contains(&m));
            previous = m;
        }
    }

    #[test]
    fn test_custom_curve() {
        let curve = ConfidenceCurve::new(vec![(0.0, 0.0), (1.0, 0.5)]).unwrap();
        assert!(close(curve.multiplier(0.5), 0.25));
        assert_eq!(curve.points().len(), 2);
    }

    #[test]
    fn test_invalid_curves() {
        assert!(ConfidenceCurve::new(vec![]).is_err());
        assert!(ConfidenceCurve::new(vec![(0.5, 0.2), (0.5, 0.3)]).is_err());
        assert!(ConfidenceCurve::new(vec![(0.5, 0.6), (0.7, 0.3)]).is_err());
        assert!(ConfidenceCurve::new(vec![(0.5, 1.3)]).is_err());
        assert!(ConfidenceCurve::new(vec![(f64::NAN, 0.3)]).is_err());
    }

    #[test]
    fn test_deserialize_validates() {
        let curve: ConfidenceCurve = serde_json::from_str("[[0.5, 0.0], [1.0, 1.0]]").unwrap();
        assert!(close(curve.multiplier(0.75), 0.5));

        let bad = serde_json::from_str::<ConfidenceCurve>("[[0.5, 0.9], [1.0, 0.1]]");
        assert!(bad.is_err());
    }

    #[test]
    fn test_interpolate_empty_and_single() {
        assert_eq!(interpolate(&[], 0.7), 0.0);
        assert_eq!(interpolate(&[(0.5, 0.4)], 0.9), 0.4);
        assert_eq!(interpolate(&[(0.5, 0.4)], 0.1), 0.4);
    }
}
