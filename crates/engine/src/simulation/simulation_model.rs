//! Simulation configuration and result models.

use serde::{Deserialize, Serialize};

use crate::constants::*;

/// Path counts and market frictions for the Monte Carlo routines.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct SimulationConfig {
    pub drift_paths: usize,
    pub rebalancing_paths: usize,
    pub dca_paths: usize,
    pub panic_selling_paths: usize,
    /// Paths per candidate threshold
    pub threshold_paths: usize,
    /// Cost charged on one-sided turnover at each rebalance (default: 5 bps)
    pub transaction_cost_bps: f64,
    /// Annual risk-free rate as a fraction, for Sharpe ratios (default: 0.02)
    pub risk_free_rate: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            drift_paths: DRIFT_PATHS,
            rebalancing_paths: REBALANCING_PATHS,
            dca_paths: DCA_PATHS,
            panic_selling_paths: PANIC_SELLING_PATHS,
            threshold_paths: THRESHOLD_PATHS,
            transaction_cost_bps: DEFAULT_TRANSACTION_COST_BPS,
            risk_free_rate: DEFAULT_RISK_FREE_RATE,
        }
    }
}

/// Percentile summary of an empirical distribution.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PercentileStats {
    pub median: f64,
    pub p25: f64,
    pub p75: f64,
    pub mean: f64,
}

// =============================================================================
// Portfolio drift
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DriftCheckpoint {
    pub month: u32,
    /// Mean absolute deviation from target across assets, percentage points
    pub average_drift: PercentileStats,
    /// Largest single-asset deviation, percentage points
    pub max_asset_drift: PercentileStats,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioDrift {
    pub paths: usize,
    pub checkpoints: Vec<DriftCheckpoint>,
    /// Median terminal weight per asset
    pub median_final_weights: Vec<f64>,
}

// =============================================================================
// Rebalancing
// =============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RebalancingStrategy {
    None,
    Monthly,
    Annual,
}

impl RebalancingStrategy {
    pub const ALL: [RebalancingStrategy; 3] = [
        RebalancingStrategy::None,
        RebalancingStrategy::Monthly,
        RebalancingStrategy::Annual,
    ];
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StrategyOutcome {
    pub strategy: RebalancingStrategy,
    /// Annualized return after costs, percent
    pub annualized_return: PercentileStats,
    pub sharpe_ratio: PercentileStats,
    /// Mean total transaction cost, percent of initial value
    pub average_cost_percent: f64,
    pub average_rebalances: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RebalancingImpact {
    pub paths: usize,
    pub years: u32,
    pub transaction_cost_bps: f64,
    pub strategies: Vec<StrategyOutcome>,
    /// Strategy with the highest median Sharpe ratio
    pub best_strategy: RebalancingStrategy,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ThresholdOutcome {
    /// Drift threshold in percentage points
    pub threshold: f64,
    /// Annualized return after costs, percent
    pub net_return: PercentileStats,
    pub sharpe_ratio: PercentileStats,
    pub average_rebalances: f64,
    pub average_cost_percent: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OptimalThreshold {
    pub optimal_threshold: f64,
    pub outcomes: Vec<ThresholdOutcome>,
}

// =============================================================================
// Behavioural
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DcaOutcome {
    pub terminal_value: PercentileStats,
    /// Percent of paths where DCA finished ahead of the lump sum
    pub win_rate: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DcaComparison {
    pub paths: usize,
    pub lump_sum: PercentileStats,
    pub dca: DcaOutcome,
    /// Months DCA needs to deploy the full principal
    pub months_to_deploy: u32,
    /// Mean of (lump sum − DCA) terminal value
    pub average_lump_sum_advantage: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PanicSellingImpact {
    pub paths: usize,
    pub initial_value: f64,
    pub buy_and_hold: PercentileStats,
    pub panic_selling: PercentileStats,
    /// Median buy-and-hold minus median panic-selling terminal value
    pub opportunity_cost: f64,
    /// Opportunity cost relative to the buy-and-hold median, percent
    pub opportunity_cost_percent: f64,
    /// Percent of paths that hit the panic trigger
    pub trigger_rate: f64,
    /// Mean (buy-and-hold − panic) over triggered paths only
    pub average_cost_when_triggered: f64,
}
