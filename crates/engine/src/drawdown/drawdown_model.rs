use serde::{Deserialize, Serialize};

/// Share of a portfolio drawdown attributed to one asset.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DrawdownContribution {
    pub asset_index: usize,
    pub weight: f64,
    /// Annualized volatility in percent
    pub risk: f64,
    pub beta: f64,
    /// `weight × beta × risk / 100`
    pub marginal_contribution: f64,
    /// Marginal contribution scaled by the portfolio drawdown
    pub drawdown_contribution: f64,
    /// Share of total attributed drawdown, all assets sum to 100
    pub percent_of_drawdown: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DiversificationBenefit {
    pub actual_drawdown: f64,
    /// Riskiest asset's volatility × 1.5
    pub worst_case_drawdown: f64,
    /// Weighted average asset volatility
    pub weighted_average_risk: f64,
    /// `(worst − actual) / worst × 100`, floored at 0
    pub benefit_percent: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RecoveryEstimate {
    /// Gain required to recover, in percent
    pub recovery_return_needed: f64,
    /// Years at the expected return, ignoring volatility
    pub deterministic_years: f64,
    /// Deterministic estimate penalized for volatility
    pub expected_years: f64,
    pub optimistic_years: f64,
    pub pessimistic_years: f64,
    pub expected_months: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SectorDrawdown {
    pub sector: String,
    pub drawdown_contribution: f64,
    pub percent_of_drawdown: f64,
    pub total_weight: f64,
    pub asset_count: usize,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConcentrationLevel {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TailRiskConcentration {
    /// Combined drawdown share of the three largest contributors
    pub top3_share: f64,
    pub level: ConcentrationLevel,
    /// Asset indices of the top contributors, largest first
    pub top_contributors: Vec<usize>,
}
