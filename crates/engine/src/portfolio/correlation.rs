//! Validated correlation matrices.

use serde::{Deserialize, Serialize};

use super::Company;
use crate::errors::{Result, ValidationError};

const SYMMETRY_TOLERANCE: f64 = 1e-9;

/// Same-sector pairs start from this correlation
const SAME_SECTOR_BASE: f64 = 0.6;
/// Cross-sector pairs start from this correlation
const CROSS_SECTOR_BASE: f64 = 0.25;
/// Weight of the shared market exposure (min beta) added on top
const BETA_LOADING: f64 = 0.1;
const MAX_HEURISTIC_CORRELATION: f64 = 0.95;

/// An N×N symmetric matrix with unit diagonal and entries in `[-1, 1]`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(try_from = "Vec<Vec<f64>>", into = "Vec<Vec<f64>>")]
pub struct CorrelationMatrix {
    rows: Vec<Vec<f64>>,
}

impl CorrelationMatrix {
    /// Validates and wraps `rows`.
    pub fn new(rows: Vec<Vec<f64>>) -> Result<Self> {
        let n = rows.len();
        for (i, row) in rows.iter().enumerate() {
            if row.len() != n {
                return Err(ValidationError::dimension_mismatch(
                    format!("correlation row {i}"),
                    n,
                    row.len(),
                )
                .into());
            }
            for (j, &value) in row.iter().enumerate() {
                if !value.is_finite() || !(-1.0..=1.0).contains(&value) {
                    return Err(ValidationError::invalid_input(format!(
                        "correlation[{i}][{j}] = {value} is outside [-1, 1]"
                    ))
                    .into());
                }
            }
            if (row[i] - 1.0).abs() > SYMMETRY_TOLERANCE {
                return Err(ValidationError::invalid_input(format!(
                    "correlation[{i}][{i}] must be 1.0, got {}",
                    row[i]
                ))
                .into());
            }
        }
        for i in 0..n {
            for j in (i + 1)..n {
                if (rows[i][j] - rows[j][i]).abs() > SYMMETRY_TOLERANCE {
                    return Err(ValidationError::invalid_input(format!(
                        "correlation matrix is not symmetric at ({i}, {j})"
                    ))
                    .into());
                }
            }
        }
        Ok(Self { rows })
    }

    pub fn identity(n: usize) -> Self {
        let rows = (0..n)
            .map(|i| (0..n).map(|j| if i == j { 1.0 } else { 0.0 }).collect())
            .collect();
        Self { rows }
    }

    /// Builds a correlation estimate from sector membership and beta.
    ///
    /// Pairs in the same sector start at 0.6, others at 0.25; both gain
    /// `0.1 × min(β_i, β_j)` for shared market exposure, capped at 0.95.
    pub fn from_sector_heuristic(companies: &[Company]) -> Self {
        let n = companies.len();
        let mut rows = vec![vec![0.0; n]; n];
        for i in 0..n {
            rows[i][i] = 1.0;
            for j in (i + 1)..n {
                let (a, b) = (&companies[i], &companies[j]);
                let base = if a.sector.eq_ignore_ascii_case(&b.sector) {
                    SAME_SECTOR_BASE
                } else {
                    CROSS_SECTOR_BASE
                };
                let shared_beta = a.beta.min(b.beta).max(0.0);
                let rho = (base + BETA_LOADING * shared_beta).min(MAX_HEURISTIC_CORRELATION);
                rows[i][j] = rho;
                rows[j][i] = rho;
            }
        }
        Self { rows }
    }

    pub fn size(&self) -> usize {
        self.rows.len()
    }

    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.rows[i][j]
    }

    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }
}

impl TryFrom<Vec<Vec<f64>>> for CorrelationMatrix {
    type Error = crate::errors::Error;

    fn try_from(rows: Vec<Vec<f64>>) -> Result<Self> {
        Self::new(rows)
    }
}

impl From<CorrelationMatrix> for Vec<Vec<f64>> {
    fn from(matrix: CorrelationMatrix) -> Self {
        matrix.rows
    }
}
