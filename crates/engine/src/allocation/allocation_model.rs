//! Allocation models.

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_MAX_POSITION, DEFAULT_MAX_POSITIONS, DEFAULT_MIN_POSITION};
use crate::validation::ValidationReport;

/// Structural limits applied to a weight vector.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct AllocationOptions {
    /// Largest allowed single weight (default: 0.40)
    pub max_position: f64,
    /// Weights below this are dust (default: 0.01)
    pub min_position: f64,
    /// Largest allowed number of non-zero positions (default: 50)
    pub max_positions: usize,
}

impl Default for AllocationOptions {
    fn default() -> Self {
        Self {
            max_position: DEFAULT_MAX_POSITION,
            min_position: DEFAULT_MIN_POSITION,
            max_positions: DEFAULT_MAX_POSITIONS,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AllocationMetrics {
    pub sum: f64,
    pub max_weight: f64,
    /// Herfindahl-Hirschman index
    pub hhi: f64,
    pub non_zero_positions: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AllocationValidation {
    pub report: ValidationReport,
    pub metrics: AllocationMetrics,
}

/// Why a weight was changed during constraint repair.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChangeReason {
    /// Clipped down to the position cap
    MaxPositionCap,
    /// Zeroed because it was below the dust threshold
    BelowMinPosition,
    /// Rescaled so the vector sums to 1.0
    Renormalized,
}

/// Audit entry for one repair step on one asset.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ConstraintChange {
    pub asset_index: usize,
    pub original: f64,
    pub adjusted: f64,
    pub reason: ChangeReason,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ConstraintAdjustment {
    pub adjusted: Vec<f64>,
    pub changes: Vec<ConstraintChange>,
}

/// Discrete share allocation for one position.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PositionAllocation {
    pub asset_index: usize,
    pub target_weight: f64,
    pub price: f64,
    pub target_value: f64,
    pub shares: u64,
    pub actual_value: f64,
    pub actual_weight: f64,
    /// `actual_weight − target_weight`
    pub drift: f64,
    /// True when the target value cannot buy a single share
    pub too_small_to_buy: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PositionSizing {
    pub positions: Vec<PositionAllocation>,
    pub total_invested: f64,
    pub cash_remaining: f64,
    /// Sum of absolute per-position drift
    pub total_drift: f64,
    pub unbuyable_positions: Vec<usize>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RebalanceRecommendation {
    RebalanceNow,
    Consider,
    Defer,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RebalancingFeasibility {
    /// One-sided turnover as a fraction of the portfolio
    pub turnover: f64,
    /// Estimated cost in percent of portfolio value
    pub estimated_cost_percent: f64,
    pub recommendation: RebalanceRecommendation,
}
