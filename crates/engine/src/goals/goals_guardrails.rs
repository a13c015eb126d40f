//! Pre-publication checks for goal analyses.
//!
//! Every check runs independently. Critical findings block rendering; the
//! rest are surfaced alongside the numbers.

use log::{error, warn};
use serde::{Deserialize, Serialize};

use super::goals_model::{Goal, GoalMetrics, Recommendation};
use crate::portfolio::round_to;
use crate::validation::{IssueCode, ValidationIssue, ValidationReport};

/// Allowed gap between a recommendation's total and 100%, in percentage points
const RECOMMENDATION_SUM_TOLERANCE: f64 = 1.0;

/// Outcome of the render gate.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RenderDecision {
    pub can_render: bool,
    pub report: ValidationReport,
}

/// Runs all goal-analysis checks.
pub fn validate_goal_analysis(
    goal: &Goal,
    metrics: &GoalMetrics,
    recommendation: Option<&Recommendation>,
) -> ValidationReport {
    let mut issues = Vec::new();

    let target = match goal.target_amount {
        Some(t) if t.is_finite() && t > 0.0 => Some(t),
        other => {
            issues.push(ValidationIssue::critical(
                IssueCode::InvalidTargetAmount,
                format!("target_amount must be a positive number, got {other:?}"),
            ));
            None
        }
    };

    if let Some(allocation) = goal.current_allocation {
        if !allocation.is_finite() {
            issues.push(ValidationIssue::critical(
                IssueCode::InvalidCurrentAllocation,
                format!("current_allocation must be numeric, got {allocation}"),
            ));
        }
    }

    let value_ok = metrics.portfolio_value.is_finite();
    if !value_ok {
        issues.push(ValidationIssue::critical(
            IssueCode::InvalidPortfolioValue,
            format!("portfolio value is not numeric: {}", metrics.portfolio_value),
        ));
    }
    let progress_ok = metrics.progress_percent.is_finite();
    if !progress_ok {
        issues.push(ValidationIssue::critical(
            IssueCode::InvalidProgressPercent,
            format!("progress percent is not numeric: {}", metrics.progress_percent),
        ));
    }

    if progress_ok {
        let capital = goal.current_allocation.unwrap_or(0.0);
        if capital > 0.0 && metrics.progress_percent == 0.0 {
            warn!(
                "Goal {} reports 0% progress despite {:.2} initial capital",
                goal.id, capital
            );
            issues.push(ValidationIssue::warning(
                IssueCode::ProgressFragmentation,
                format!(
                    "goal has {capital:.2} initial capital but progress is 0%; progress may \
                     have been computed from a different formula"
                ),
            ));
        }

        if metrics.progress_percent > 100.0 {
            issues.push(ValidationIssue::info(
                IssueCode::GoalExceeded,
                format!("goal exceeded at {}% of target", metrics.progress_percent),
            ));
        }
    }

    if let (Some(target), true, true) = (target, value_ok, progress_ok) {
        // portfolio_value is rounded to whole units, which moves the ratio by
        // up to 0.5 / target.
        let expected = round_to(metrics.portfolio_value / target * 100.0, 1);
        let tolerance = 0.1 + 50.0 / target;
        if (expected - metrics.progress_percent).abs() > tolerance {
            issues.push(ValidationIssue::critical(
                IssueCode::ProgressFormulaMismatch,
                format!(
                    "progress {}% does not match portfolio value {} of target {} ({}%)",
                    metrics.progress_percent, metrics.portfolio_value, target, expected
                ),
            ));
        }
    }

    if let Some(recommendation) = recommendation {
        let total = recommendation.total_percent();
        if (total - 100.0).abs() > RECOMMENDATION_SUM_TOLERANCE {
            issues.push(ValidationIssue::warning(
                IssueCode::RecommendationSum,
                format!("recommended allocations sum to {total:.1}%, expected 100%"),
            ));
        }
    }

    ValidationReport::from_issues(issues)
}

/// Validates the analysis and decides whether it may be shown.
pub fn can_render_goal_analysis(
    goal: &Goal,
    metrics: &GoalMetrics,
    recommendation: Option<&Recommendation>,
) -> RenderDecision {
    let report = validate_goal_analysis(goal, metrics, recommendation);
    let can_render = !report.has_critical();
    if !can_render {
        error!(
            "Blocking goal analysis for {}: {}",
            goal.id,
            report
                .errors
                .iter()
                .map(|i| i.code.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        );
    }
    RenderDecision { can_render, report }
}
