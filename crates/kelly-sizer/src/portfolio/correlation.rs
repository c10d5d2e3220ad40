//! Correlation Matrix

use serde::{Deserialize, Serialize};

use crate::error::{Result, SizerError};

const DIAGONAL_TOLERANCE: f64 = 1e-9;

/// Square correlation matrix between markets, in opportunity order
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<f64>>", into = "Vec<Vec<f64>>")]
pub struct CorrelationMatrix {
    rows: Vec<Vec<f64>>,
}

impl CorrelationMatrix {
    pub fn new(rows: Vec<Vec<f64>>) -> Result<Self> {
        let n = rows.len();

        for (i, row) in rows.iter().enumerate() {
            if row.len() != n {
                return Err(SizerError::InvalidCorrelation(format!(
                    "row {i} has {} entries, expected {n}",
                    row.len()
                )));
            }
            if let Some(value) = row.iter().find(|v| !(-1.0..=1.0).contains(*v)) {
                return Err(SizerError::InvalidCorrelation(format!(
                    "row {i} contains {value}, outside [-1, 1]"
                )));
            }
            if (row[i] - 1.0).abs() > DIAGONAL_TOLERANCE {
                return Err(SizerError::InvalidCorrelation(format!(
                    "diagonal entry {i} is {}, expected 1",
                    row[i]
                )));
            }
        }

        Ok(Self { rows })
    }

    /// Identity matrix (independent markets)
    pub fn identity(n: usize) -> Self {
        let rows = (0..n)
            .map(|i| (0..n).map(|j| if i == j { 1.0 } else { 0.0 }).collect())
            .collect();
        Self { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, i: usize, j: usize) -> Option<f64> {
        self.rows.get(i).and_then(|row| row.get(j)).copied()
    }
}

impl TryFrom<Vec<Vec<f64>>> for CorrelationMatrix {
    type Error = SizerError;

    fn try_from(rows: Vec<Vec<f64>>) -> Result<Self> {
        Self::new(rows)
    }
}

impl From<CorrelationMatrix> for Vec<Vec<f64>> {
    fn from(matrix: CorrelationMatrix) -> Self {
        matrix.rows
    }
}
