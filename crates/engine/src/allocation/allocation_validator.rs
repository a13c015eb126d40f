use log::{debug, info};

use super::allocation_model::*;
use crate::constants::{
    HIGH_CONCENTRATION_HHI, REBALANCE_CONSIDER_COST_PERCENT, REBALANCE_NOW_COST_PERCENT,
    WEIGHT_SUM_TOLERANCE,
};
use crate::errors::{ensure_finite, ensure_len, Result, ValidationError};
use crate::portfolio::{herfindahl_index, weight_sum};
use crate::validation::{IssueCode, ValidationIssue, ValidationReport};

/// Weights at or below this count as empty positions
const ZERO_WEIGHT_EPSILON: f64 = 1e-12;

/// Checks a weight vector against the structural constraints.
///
/// Never fails: every finding is reported in the returned report.
pub fn validate_allocation(weights: &[f64], options: &AllocationOptions) -> AllocationValidation {
    let mut issues = Vec::new();

    let sum = weight_sum(weights);
    let max_weight = weights.iter().copied().fold(0.0, f64::max);
    let hhi = herfindahl_index(weights);
    let non_zero_positions = weights.iter().filter(|w| w.abs() > ZERO_WEIGHT_EPSILON).count();

    for (index, &w) in weights.iter().enumerate() {
        if !w.is_finite() {
            issues.push(
                ValidationIssue::error(
                    IssueCode::NonFiniteWeight,
                    format!("weight {index} is not a finite number"),
                )
                .for_asset(index),
            );
        } else if w < 0.0 {
            issues.push(
                ValidationIssue::error(
                    IssueCode::NegativeWeight,
                    format!("weight {index} is negative ({w:.4})"),
                )
                .for_asset(index),
            );
        } else if w > options.max_position {
            issues.push(
                ValidationIssue::warning(
                    IssueCode::MaxPosition,
                    format!(
                        "weight {index} ({:.1}%) exceeds the {:.1}% position cap",
                        w * 100.0,
                        options.max_position * 100.0
                    ),
                )
                .for_asset(index),
            );
        } else if w > ZERO_WEIGHT_EPSILON && w < options.min_position {
            issues.push(
                ValidationIssue::info(
                    IssueCode::DustPosition,
                    format!(
                        "weight {index} ({:.2}%) is below the {:.2}% minimum position",
                        w * 100.0,
                        options.min_position * 100.0
                    ),
                )
                .for_asset(index),
            );
        }
    }

    if !sum.is_finite() || (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
        issues.push(ValidationIssue::error(
            IssueCode::SumConstraint,
            format!("weights sum to {sum:.4}, expected 1.0 ± {WEIGHT_SUM_TOLERANCE}"),
        ));
    }

    if non_zero_positions > options.max_positions {
        issues.push(ValidationIssue::warning(
            IssueCode::MaxPositions,
            format!(
                "{non_zero_positions} positions exceed the limit of {}",
                options.max_positions
            ),
        ));
    }

    if hhi > HIGH_CONCENTRATION_HHI {
        issues.push(ValidationIssue::warning(
            IssueCode::HighConcentration,
            format!("concentration index {hhi:.3} is above {HIGH_CONCENTRATION_HHI}"),
        ));
    }

    AllocationValidation {
        report: ValidationReport::from_issues(issues),
        metrics: AllocationMetrics {
            sum,
            max_weight,
            hhi,
            non_zero_positions,
        },
    }
}

/// Repairs a weight vector: clip to the cap, drop dust, renormalize.
///
/// Fails when the input contains non-finite values or when no position
/// survives the dust filter.
pub fn enforce_constraints(
    weights: &[f64],
    options: &AllocationOptions,
) -> Result<ConstraintAdjustment> {
    ensure_finite("weights", weights)?;
    let mut adjusted = weights.to_vec();
    let mut changes = Vec::new();

    for (index, w) in adjusted.iter_mut().enumerate() {
        if *w > options.max_position {
            changes.push(ConstraintChange {
                asset_index: index,
                original: *w,
                adjusted: options.max_position,
                reason: ChangeReason::MaxPositionCap,
            });
            *w = options.max_position;
        }
    }

    for (index, w) in adjusted.iter_mut().enumerate() {
        if *w != 0.0 && *w < options.min_position {
            changes.push(ConstraintChange {
                asset_index: index,
                original: *w,
                adjusted: 0.0,
                reason: ChangeReason::BelowMinPosition,
            });
            *w = 0.0;
        }
    }

    let sum = weight_sum(&adjusted);
    if sum <= 0.0 {
        return Err(ValidationError::invalid_input(
            "no position remains after removing positions below the minimum size",
        )
        .into());
    }
    for (index, w) in adjusted.iter_mut().enumerate() {
        let scaled = *w / sum;
        if (scaled - *w).abs() > ZERO_WEIGHT_EPSILON {
            changes.push(ConstraintChange {
                asset_index: index,
                original: *w,
                adjusted: scaled,
                reason: ChangeReason::Renormalized,
            });
        }
        *w = scaled;
    }

    if !changes.is_empty() {
        info!("Constraint repair changed {} weights", changes.len());
    }
    Ok(ConstraintAdjustment { adjusted, changes })
}

/// Converts weights into whole share counts for an account.
pub fn validate_position_sizing(
    weights: &[f64],
    prices: &[f64],
    account_value: f64,
) -> Result<PositionSizing> {
    ensure_len("prices", weights.len(), prices.len())?;
    ensure_finite("weights", weights)?;
    ensure_finite("prices", prices)?;
    if !account_value.is_finite() || account_value <= 0.0 {
        return Err(ValidationError::invalid_input(format!(
            "account value must be positive, got {account_value}"
        ))
        .into());
    }
    if let Some(index) = prices.iter().position(|p| *p <= 0.0) {
        return Err(ValidationError::invalid_input(format!(
            "price for asset {index} must be positive"
        ))
        .into());
    }

    let mut positions = Vec::with_capacity(weights.len());
    for (index, (&target_weight, &price)) in weights.iter().zip(prices).enumerate() {
        let target_value = target_weight.max(0.0) * account_value;
        let shares = (target_value / price).floor() as u64;
        let actual_value = shares as f64 * price;
        let actual_weight = actual_value / account_value;
        positions.push(PositionAllocation {
            asset_index: index,
            target_weight,
            price,
            target_value,
            shares,
            actual_value,
            actual_weight,
            drift: actual_weight - target_weight,
            too_small_to_buy: target_weight > 0.0 && shares == 0,
        });
    }

    let total_invested: f64 = positions.iter().map(|p| p.actual_value).sum();
    let total_drift = positions.iter().map(|p| p.drift.abs()).sum();
    let unbuyable_positions: Vec<usize> = positions
        .iter()
        .filter(|p| p.too_small_to_buy)
        .map(|p| p.asset_index)
        .collect();

    debug!(
        "Position sizing: invested {:.2} of {:.2}, {} unbuyable",
        total_invested,
        account_value,
        unbuyable_positions.len()
    );

    Ok(PositionSizing {
        positions,
        total_invested,
        cash_remaining: account_value - total_invested,
        total_drift,
        unbuyable_positions,
    })
}

/// Estimates turnover and cost of moving from `current` to `target` weights.
pub fn check_rebalancing_feasibility(
    current: &[f64],
    target: &[f64],
    cost_bps: f64,
) -> Result<RebalancingFeasibility> {
    ensure_len("target weights", current.len(), target.len())?;
    ensure_finite("current weights", current)?;
    ensure_finite("target weights", target)?;
    if !cost_bps.is_finite() || cost_bps < 0.0 {
        return Err(ValidationError::invalid_input(format!(
            "transaction cost must be non-negative, got {cost_bps} bps"
        ))
        .into());
    }

    let turnover = one_sided_turnover(current, target);
    // bps → percent of portfolio
    let estimated_cost_percent = turnover * cost_bps / 100.0;
    let recommendation = if estimated_cost_percent < REBALANCE_NOW_COST_PERCENT {
        RebalanceRecommendation::RebalanceNow
    } else if estimated_cost_percent <= REBALANCE_CONSIDER_COST_PERCENT {
        RebalanceRecommendation::Consider
    } else {
        RebalanceRecommendation::Defer
    };

    Ok(RebalancingFeasibility {
        turnover,
        estimated_cost_percent,
        recommendation,
    })
}

/// `Σ|target − current| / 2`
pub(crate) fn one_sided_turnover(current: &[f64], target: &[f64]) -> f64 {
    current
        .iter()
        .zip(target)
        .map(|(c, t)| (t - c).abs())
        .sum::<f64>()
        / 2.0
}
