//! The single published goal-progress formula.
//!
//! ```text
//! holdingsValue   = Σ quantity × (current_price or average_cost)
//! portfolioValue  = max(0, initialCapital + holdingsValue)
//! progressPercent = portfolioValue / target × 100          (0.1)
//! remainingGap    = max(0, target − portfolioValue)        (whole units)
//! ```
//!
//! Holdings are positions acquired on top of the goal's initial allocation,
//! so a goal with capital and no tracked holdings reports the capital itself.

use chrono::{Datelike, NaiveDate, Utc};
use log::debug;
use num_traits::ToPrimitive;
use rust_decimal::Decimal;

use super::goals_model::{Goal, GoalMetrics, Holding};
use crate::errors::{Result, ValidationError};
use crate::portfolio::round_to;

/// Computes goal progress as of today (UTC).
pub fn compute_goal_metrics(goal: &Goal, holdings: &[Holding]) -> Result<GoalMetrics> {
    compute_goal_metrics_at(goal, holdings, Utc::now().date_naive())
}

/// Computes goal progress as of `today`.
pub fn compute_goal_metrics_at(
    goal: &Goal,
    holdings: &[Holding],
    today: NaiveDate,
) -> Result<GoalMetrics> {
    let target_amount = validated_target(goal)?;

    let initial_capital = match goal.current_allocation {
        None => 0.0,
        Some(v) if v.is_finite() => v,
        Some(v) => {
            return Err(ValidationError::invalid_input(format!(
                "goal {} has non-numeric current_allocation {v}",
                goal.id
            ))
            .into())
        }
    };

    let holdings_value = holdings_value(holdings)?;
    let portfolio_value = (initial_capital + holdings_value).max(0.0);
    let progress_percent = round_to(portfolio_value / target_amount * 100.0, 1);
    let remaining_gap = (target_amount - portfolio_value).max(0.0);
    let months_remaining = goal
        .target_date
        .map(|date| whole_months_between(today, date))
        .unwrap_or(0);
    let required_monthly_contribution = if months_remaining > 0 {
        remaining_gap / months_remaining as f64
    } else {
        0.0
    };

    debug!(
        "Goal {}: value {:.2} of {:.2} ({}%), {} months remaining",
        goal.id, portfolio_value, target_amount, progress_percent, months_remaining
    );

    Ok(GoalMetrics {
        goal_id: goal.id.clone(),
        target_amount,
        portfolio_value: portfolio_value.round(),
        holdings_value: holdings_value.round(),
        initial_capital: initial_capital.round(),
        progress_percent,
        remaining_gap: remaining_gap.round(),
        months_remaining,
        required_monthly_contribution: required_monthly_contribution.round(),
        is_achieved: progress_percent >= 100.0,
    })
}

/// Market value of all holdings. Negative quantities are rejected.
pub fn holdings_value(holdings: &[Holding]) -> Result<f64> {
    let mut total = Decimal::ZERO;
    for holding in holdings {
        if holding.quantity.is_sign_negative() && !holding.quantity.is_zero() {
            return Err(ValidationError::invalid_input(format!(
                "holding {} has negative quantity {}",
                holding.symbol, holding.quantity
            ))
            .into());
        }
        total += holding.market_value();
    }
    total.to_f64().ok_or_else(|| {
        ValidationError::invalid_input(format!("holdings value {total} is not representable"))
            .into()
    })
}

fn validated_target(goal: &Goal) -> Result<f64> {
    match goal.target_amount {
        None => Err(ValidationError::InvalidGoal(format!(
            "goal {} has no target_amount",
            goal.id
        ))
        .into()),
        Some(t) if !t.is_finite() => Err(ValidationError::InvalidGoal(format!(
            "goal {} has non-numeric target_amount",
            goal.id
        ))
        .into()),
        Some(t) if t <= 0.0 => Err(ValidationError::InvalidGoal(format!(
            "goal {} target_amount must be positive, got {t}",
            goal.id
        ))
        .into()),
        Some(t) => Ok(t),
    }
}

/// Completed calendar months from `from` to `to`, zero if `to` is not later.
fn whole_months_between(from: NaiveDate, to: NaiveDate) -> u32 {
    let mut months =
        (to.year() - from.year()) * 12 + to.month() as i32 - from.month() as i32;
    if to.day() < from.day() {
        months -= 1;
    }
    months.max(0) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_whole_months_between() {
        assert_eq!(whole_months_between(date(2026, 1, 15), date(2026, 7, 15)), 6);
        assert_eq!(whole_months_between(date(2026, 1, 15), date(2026, 7, 14)), 5);
        assert_eq!(whole_months_between(date(2026, 1, 31), date(2027, 1, 31)), 12);
        assert_eq!(whole_months_between(date(2026, 5, 1), date(2025, 5, 1)), 0);
    }
}
