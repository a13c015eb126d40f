use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::errors::{ensure_finite, ensure_len, Result};
use crate::portfolio::CorrelationMatrix;

/// Tolerances for snapshot verification and the metric registry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct ConsistencyConfig {
    /// Allowed absolute gap between recomputed and reported return/risk (percent)
    pub tolerance: f64,
    /// Relative weight change that counts as drift (0.05 = 5%)
    pub drift_threshold: f64,
    /// Allowed gap before a registered metric overrides a new value
    pub registry_tolerance: f64,
}

impl Default for ConsistencyConfig {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_CONSISTENCY_TOLERANCE,
            drift_threshold: DEFAULT_DRIFT_THRESHOLD,
            registry_tolerance: DEFAULT_CONSISTENCY_TOLERANCE,
        }
    }
}

/// Inputs to one portfolio calculation pass.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioData {
    pub symbols: Vec<String>,
    pub weights: Vec<f64>,
    /// Expected annual returns in percent
    pub expected_returns: Vec<f64>,
    /// Annualized volatilities in percent
    pub risks: Vec<f64>,
    pub correlation: CorrelationMatrix,
}

impl PortfolioData {
    pub fn new(
        symbols: Vec<String>,
        weights: Vec<f64>,
        expected_returns: Vec<f64>,
        risks: Vec<f64>,
        correlation: CorrelationMatrix,
    ) -> Self {
        Self {
            symbols,
            weights,
            expected_returns,
            risks,
            correlation,
        }
    }

    /// Every per-asset vector and the correlation matrix must match `symbols`.
    pub fn validate(&self) -> Result<()> {
        let n = self.symbols.len();
        ensure_len("weights", n, self.weights.len())?;
        ensure_len("expected returns", n, self.expected_returns.len())?;
        ensure_len("risks", n, self.risks.len())?;
        ensure_len("correlation matrix", n, self.correlation.size())?;
        ensure_finite("weights", &self.weights)?;
        ensure_finite("expected returns", &self.expected_returns)?;
        ensure_finite("risks", &self.risks)
    }
}

/// Inputs after rounding; the only part of a snapshot that is hashed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RoundedInputs {
    pub symbols: Vec<String>,
    pub weights: Vec<f64>,
    pub expected_returns: Vec<f64>,
    pub risks: Vec<f64>,
    pub correlation: Vec<Vec<f64>>,
}

/// Reproducibility fingerprint of one calculation pass.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub session_id: String,
    pub timestamp: DateTime<Utc>,
    pub rounded_inputs: RoundedInputs,
    /// Hex SHA-256 of the canonical JSON of `rounded_inputs`
    pub hash: String,
}

/// Figures produced by a later calculation, checked against a snapshot.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CalculationResults {
    pub weights: Vec<f64>,
    pub expected_return: f64,
    pub risk: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConsistencySeverity {
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ConsistencyIssueKind {
    WeightSum,
    ReturnMismatch,
    RiskMismatch,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ConsistencyIssue {
    pub kind: ConsistencyIssueKind,
    pub severity: ConsistencySeverity,
    pub message: String,
    pub expected: f64,
    pub actual: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ConsistencyReport {
    pub is_consistent: bool,
    pub snapshot_hash: String,
    pub issues: Vec<ConsistencyIssue>,
}

impl ConsistencyReport {
    pub fn highest_severity(&self) -> Option<ConsistencySeverity> {
        self.issues.iter().map(|i| i.severity).max()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AssetDrift {
    pub symbol: String,
    pub original_weight: f64,
    pub current_weight: f64,
    /// `(current − original) / original`; `None` for assets added since the snapshot
    pub relative_change: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DriftReport {
    pub has_drift: bool,
    pub threshold: f64,
    pub drifted_assets: Vec<AssetDrift>,
}

/// Portfolio after renormalization, with figures recomputed from it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AdjustedPortfolio {
    pub portfolio: PortfolioData,
    pub expected_return: f64,
    pub risk: f64,
    pub adjusted: bool,
}

/// First value recorded for a metric key within a session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RegisteredMetric {
    pub key: String,
    pub value: f64,
    pub registered_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EnforcedMetric {
    /// Value to display
    pub value: f64,
    /// Value the caller computed
    pub original_value: f64,
    pub was_adjusted: bool,
    pub reason: Option<String>,
}
