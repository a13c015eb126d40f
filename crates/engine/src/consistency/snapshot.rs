//! Session snapshots: rounding, hashing, verification and drift detection.

use std::collections::HashMap;

use chrono::Utc;
use log::{debug, warn};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use super::consistency_model::*;
use crate::constants::*;
use crate::errors::{ensure_finite, ensure_len, Result, ValidationError};
use crate::portfolio::{
    normalize_weights, portfolio_expected_return, portfolio_risk, round_to, weight_sum,
    CorrelationMatrix,
};

/// Snapshots `portfolio` under a fresh session id.
pub fn create_session_snapshot(portfolio: &PortfolioData) -> Result<Snapshot> {
    create_session_snapshot_with_id(&Uuid::new_v4().to_string(), portfolio)
}

/// Snapshots `portfolio` under `session_id`.
///
/// Weights are rounded to 6 decimals, returns, risks and correlations to 4.
/// The hash covers the rounded inputs only, so two passes over the same
/// portfolio hash identically whatever their session or timestamp.
pub fn create_session_snapshot_with_id(session_id: &str, portfolio: &PortfolioData) -> Result<Snapshot> {
    portfolio.validate()?;

    let rounded_inputs = RoundedInputs {
        symbols: portfolio.symbols.clone(),
        weights: round_all(&portfolio.weights, WEIGHT_DECIMALS),
        expected_returns: round_all(&portfolio.expected_returns, RETURN_RISK_DECIMALS),
        risks: round_all(&portfolio.risks, RETURN_RISK_DECIMALS),
        correlation: round_correlation(&portfolio.correlation),
    };
    let hash = hash_inputs(&rounded_inputs)?;
    debug!("Created snapshot {} for session {}", hash, session_id);

    Ok(Snapshot {
        session_id: session_id.to_string(),
        timestamp: Utc::now(),
        rounded_inputs,
        hash,
    })
}

/// Recomputes the hash of `snapshot.rounded_inputs` and compares it.
pub fn verify_snapshot_hash(snapshot: &Snapshot) -> Result<bool> {
    Ok(hash_inputs(&snapshot.rounded_inputs)? == snapshot.hash)
}

/// Checks a later calculation against the inputs locked in `snapshot`.
///
/// Weights off `1 ± 0.001` are a high-severity issue. Return or risk that
/// differ from the snapshot's recomputed figures by more than `tolerance`
/// are medium-severity.
pub fn verify_consistency(
    results: &CalculationResults,
    snapshot: &Snapshot,
    tolerance: f64,
) -> Result<ConsistencyReport> {
    ensure_finite("weights", &results.weights)?;
    ensure_finite("results", &[results.expected_return, results.risk])?;
    if !tolerance.is_finite() || tolerance < 0.0 {
        return Err(ValidationError::invalid_input(format!(
            "tolerance must be a non-negative number, got {tolerance}"
        ))
        .into());
    }

    let (expected_return, risk) = snapshot_figures(&snapshot.rounded_inputs)?;
    let mut issues = Vec::new();

    let sum = weight_sum(&results.weights);
    if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
        issues.push(ConsistencyIssue {
            kind: ConsistencyIssueKind::WeightSum,
            severity: ConsistencySeverity::High,
            message: format!("Weights sum to {sum:.6}, expected 1.0"),
            expected: 1.0,
            actual: sum,
        });
    }
    if (results.expected_return - expected_return).abs() > tolerance {
        issues.push(ConsistencyIssue {
            kind: ConsistencyIssueKind::ReturnMismatch,
            severity: ConsistencySeverity::Medium,
            message: format!(
                "Expected return {:.4} differs from snapshot value {:.4}",
                results.expected_return, expected_return
            ),
            expected: expected_return,
            actual: results.expected_return,
        });
    }
    if (results.risk - risk).abs() > tolerance {
        issues.push(ConsistencyIssue {
            kind: ConsistencyIssueKind::RiskMismatch,
            severity: ConsistencySeverity::Medium,
            message: format!("Risk {:.4} differs from snapshot value {:.4}", results.risk, risk),
            expected: risk,
            actual: results.risk,
        });
    }

    if !issues.is_empty() {
        warn!(
            "Snapshot {} failed verification with {} issue(s)",
            snapshot.hash,
            issues.len()
        );
    }

    Ok(ConsistencyReport {
        is_consistent: issues.is_empty(),
        snapshot_hash: snapshot.hash.clone(),
        issues,
    })
}

/// Flags assets whose weight moved more than `threshold` relative to the snapshot.
///
/// Assets are matched by symbol. Assets added since the snapshot always
/// count as drift, removed assets are reported with a current weight of 0.
pub fn detect_drift(snapshot: &Snapshot, current: &PortfolioData, threshold: f64) -> Result<DriftReport> {
    ensure_len("weights", current.symbols.len(), current.weights.len())?;
    ensure_finite("weights", &current.weights)?;

    let original = &snapshot.rounded_inputs;
    let current_by_symbol: HashMap<&str, f64> = current
        .symbols
        .iter()
        .map(String::as_str)
        .zip(current.weights.iter().copied())
        .collect();

    let mut drifted_assets = Vec::new();
    for (symbol, &original_weight) in original.symbols.iter().zip(&original.weights) {
        let current_weight = current_by_symbol.get(symbol.as_str()).copied().unwrap_or(0.0);
        if let Some(drift) = asset_drift(symbol, original_weight, current_weight, threshold) {
            drifted_assets.push(drift);
        }
    }
    for (symbol, &current_weight) in current.symbols.iter().zip(&current.weights) {
        if !original.symbols.contains(symbol) && current_weight > 0.0 {
            drifted_assets.push(AssetDrift {
                symbol: symbol.clone(),
                original_weight: 0.0,
                current_weight,
                relative_change: None,
            });
        }
    }

    if !drifted_assets.is_empty() {
        debug!(
            "{} asset(s) drifted beyond {:.1}% since snapshot {}",
            drifted_assets.len(),
            threshold * 100.0,
            snapshot.hash
        );
    }

    Ok(DriftReport {
        has_drift: !drifted_assets.is_empty(),
        threshold,
        drifted_assets,
    })
}

/// Renormalizes weights to sum to exactly one and recomputes return and risk.
pub fn apply_consistency_adjustments(portfolio: &PortfolioData) -> Result<AdjustedPortfolio> {
    portfolio.validate()?;

    let weights = normalize_weights(&portfolio.weights)?;
    let expected_return = portfolio_expected_return(&weights, &portfolio.expected_returns)?;
    let risk = portfolio_risk(&weights, &portfolio.risks, &portfolio.correlation)?;
    debug!(
        "Renormalized {} weights from sum {:.6}",
        weights.len(),
        weight_sum(&portfolio.weights)
    );

    Ok(AdjustedPortfolio {
        portfolio: PortfolioData {
            weights,
            ..portfolio.clone()
        },
        expected_return,
        risk,
        adjusted: true,
    })
}

/// Rounds the mean of each mirrored pair so the stored matrix stays exactly symmetric.
fn round_correlation(matrix: &CorrelationMatrix) -> Vec<Vec<f64>> {
    let n = matrix.size();
    (0..n)
        .map(|i| {
            (0..n)
                .map(|j| round_to((matrix.get(i, j) + matrix.get(j, i)) / 2.0, CORRELATION_DECIMALS))
                .collect()
        })
        .collect()
}

fn round_all(values: &[f64], decimals: u32) -> Vec<f64> {
    values.iter().map(|v| round_to(*v, decimals)).collect()
}

fn hash_inputs(inputs: &RoundedInputs) -> Result<String> {
    let canonical = serde_json::to_vec(inputs)?;
    let mut hasher = Sha256::new();
    hasher.update(&canonical);
    Ok(hex::encode(hasher.finalize()))
}

/// Return and risk implied by the rounded inputs.
fn snapshot_figures(inputs: &RoundedInputs) -> Result<(f64, f64)> {
    let correlation = CorrelationMatrix::new(inputs.correlation.clone())?;
    let expected_return = portfolio_expected_return(&inputs.weights, &inputs.expected_returns)?;
    let risk = portfolio_risk(&inputs.weights, &inputs.risks, &correlation)?;
    Ok((expected_return, risk))
}

fn asset_drift(symbol: &str, original: f64, current: f64, threshold: f64) -> Option<AssetDrift> {
    if original == 0.0 {
        return (current > 0.0).then(|| AssetDrift {
            symbol: symbol.to_string(),
            original_weight: original,
            current_weight: current,
            relative_change: None,
        });
    }
    let relative_change = (current - original) / original;
    (relative_change.abs() > threshold).then(|| AssetDrift {
        symbol: symbol.to_string(),
        original_weight: original,
        current_weight: current,
        relative_change: Some(relative_change),
    })
}
