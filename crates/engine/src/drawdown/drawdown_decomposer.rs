//! Drawdown attribution, diversification benefit and recovery time.

use std::collections::HashMap;

use super::drawdown_model::*;
use crate::constants::{
    RECOVERY_PESSIMISTIC_MULTIPLIER, RECOVERY_VOLATILITY_PENALTY, TAIL_RISK_HIGH_SHARE,
    TAIL_RISK_MEDIUM_SHARE, WORST_CASE_DRAWDOWN_MULTIPLIER,
};
use crate::errors::{ensure_finite, ensure_len, Result, ValidationError};

/// Attributes `portfolio_drawdown` to each asset.
///
/// Results are sorted by drawdown contribution, largest first. When every
/// marginal contribution is zero there is nothing to attribute and all
/// percentages are zero.
pub fn decompose_drawdown(
    weights: &[f64],
    risks: &[f64],
    betas: &[f64],
    portfolio_drawdown: f64,
) -> Result<Vec<DrawdownContribution>> {
    ensure_len("risks", weights.len(), risks.len())?;
    ensure_len("betas", weights.len(), betas.len())?;
    ensure_finite("weights", weights)?;
    ensure_finite("risks", risks)?;
    ensure_finite("betas", betas)?;
    ensure_finite("portfolio drawdown", &[portfolio_drawdown])?;

    let mut contributions: Vec<DrawdownContribution> = weights
        .iter()
        .zip(risks)
        .zip(betas)
        .enumerate()
        .map(|(asset_index, ((&weight, &risk), &beta))| {
            let marginal_contribution = weight * beta * (risk / 100.0);
            DrawdownContribution {
                asset_index,
                weight,
                risk,
                beta,
                marginal_contribution,
                drawdown_contribution: marginal_contribution * portfolio_drawdown,
                percent_of_drawdown: 0.0,
            }
        })
        .collect();

    let total: f64 = contributions.iter().map(|c| c.drawdown_contribution).sum();
    if total != 0.0 {
        for c in &mut contributions {
            c.percent_of_drawdown = c.drawdown_contribution / total * 100.0;
        }
    }

    contributions.sort_by(|a, b| b.drawdown_contribution.total_cmp(&a.drawdown_contribution));
    Ok(contributions)
}

/// Assets whose share of drawdown exceeds `threshold` percent.
pub fn identify_top_contributors(
    contributions: &[DrawdownContribution],
    threshold: f64,
) -> Vec<DrawdownContribution> {
    contributions
        .iter()
        .filter(|c| c.percent_of_drawdown > threshold)
        .cloned()
        .collect()
}

/// Compares the actual drawdown to an undiversified worst case.
pub fn calculate_drawdown_diversification_benefit(
    weights: &[f64],
    risks: &[f64],
    portfolio_drawdown: f64,
) -> Result<DiversificationBenefit> {
    ensure_len("risks", weights.len(), risks.len())?;
    ensure_finite("risks", risks)?;
    ensure_finite("weights", weights)?;
    if risks.is_empty() {
        return Err(ValidationError::EmptyPortfolio("diversification benefit".to_string()).into());
    }

    let max_risk = risks.iter().copied().fold(f64::MIN, f64::max);
    let worst_case_drawdown = max_risk * WORST_CASE_DRAWDOWN_MULTIPLIER;
    let weighted_average_risk: f64 = weights.iter().zip(risks).map(|(w, r)| w * r).sum();
    let benefit_percent = if worst_case_drawdown > 0.0 {
        ((worst_case_drawdown - portfolio_drawdown) / worst_case_drawdown * 100.0).max(0.0)
    } else {
        0.0
    };

    Ok(DiversificationBenefit {
        actual_drawdown: portfolio_drawdown,
        worst_case_drawdown,
        weighted_average_risk,
        benefit_percent,
    })
}

/// Estimates how long a portfolio needs to recover from a drawdown.
///
/// `drawdown_percent`, `expected_return` and `volatility` are percentages.
pub fn estimate_recovery_time(
    drawdown_percent: f64,
    expected_return: f64,
    volatility: f64,
) -> Result<RecoveryEstimate> {
    ensure_finite("recovery inputs", &[drawdown_percent, expected_return, volatility])?;
    if !(0.0..100.0).contains(&drawdown_percent) {
        return Err(ValidationError::invalid_input(format!(
            "drawdown must be within [0, 100), got {drawdown_percent}"
        ))
        .into());
    }
    if expected_return <= 0.0 {
        return Err(ValidationError::invalid_input(format!(
            "recovery requires a positive expected return, got {expected_return}"
        ))
        .into());
    }

    let d = drawdown_percent / 100.0;
    let recovery_return = d / (1.0 - d);
    let deterministic_years = (1.0 + recovery_return).ln() / (1.0 + expected_return / 100.0).ln();
    let expected_years =
        deterministic_years * (1.0 + RECOVERY_VOLATILITY_PENALTY * (volatility.max(0.0) / 100.0));

    Ok(RecoveryEstimate {
        recovery_return_needed: recovery_return * 100.0,
        deterministic_years,
        expected_years,
        optimistic_years: expected_years,
        pessimistic_years: expected_years * RECOVERY_PESSIMISTIC_MULTIPLIER,
        expected_months: (expected_years * 12.0).ceil() as u32,
    })
}

/// Aggregates asset contributions by sector, largest first.
///
/// `sectors[i]` names the sector of the asset with `asset_index == i`.
pub fn decompose_drawdown_by_sector(
    contributions: &[DrawdownContribution],
    sectors: &[String],
) -> Result<Vec<SectorDrawdown>> {
    let mut by_sector: HashMap<&str, SectorDrawdown> = HashMap::new();
    for c in contributions {
        let sector = sectors.get(c.asset_index).ok_or_else(|| {
            ValidationError::invalid_input(format!("no sector for asset {}", c.asset_index))
        })?;
        let entry = by_sector
            .entry(sector.as_str())
            .or_insert_with(|| SectorDrawdown {
                sector: sector.clone(),
                drawdown_contribution: 0.0,
                percent_of_drawdown: 0.0,
                total_weight: 0.0,
                asset_count: 0,
            });
        entry.drawdown_contribution += c.drawdown_contribution;
        entry.percent_of_drawdown += c.percent_of_drawdown;
        entry.total_weight += c.weight;
        entry.asset_count += 1;
    }

    let mut result: Vec<SectorDrawdown> = by_sector.into_values().collect();
    result.sort_by(|a, b| {
        b.drawdown_contribution
            .total_cmp(&a.drawdown_contribution)
            .then_with(|| a.sector.cmp(&b.sector))
    });
    Ok(result)
}

/// Classifies how much of the drawdown sits in the three largest contributors.
pub fn analyze_tail_risk_concentration(
    contributions: &[DrawdownContribution],
) -> TailRiskConcentration {
    let mut sorted: Vec<&DrawdownContribution> = contributions.iter().collect();
    sorted.sort_by(|a, b| b.percent_of_drawdown.total_cmp(&a.percent_of_drawdown));

    let top: Vec<&DrawdownContribution> = sorted.into_iter().take(3).collect();
    let top3_share: f64 = top.iter().map(|c| c.percent_of_drawdown).sum();
    let level = if top3_share > TAIL_RISK_HIGH_SHARE {
        ConcentrationLevel::High
    } else if top3_share > TAIL_RISK_MEDIUM_SHARE {
        ConcentrationLevel::Medium
    } else {
        ConcentrationLevel::Low
    };

    TailRiskConcentration {
        top3_share,
        level,
        top_contributors: top.iter().map(|c| c.asset_index).collect(),
    }
}
