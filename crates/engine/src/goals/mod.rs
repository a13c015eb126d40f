//! Goals module - progress metrics and the pre-publication guardrails.

mod goals_calculator;
mod goals_guardrails;
mod goals_model;

pub use goals_calculator::{compute_goal_metrics, compute_goal_metrics_at, holdings_value};
pub use goals_guardrails::{can_render_goal_analysis, validate_goal_analysis, RenderDecision};
pub use goals_model::{Goal, GoalMetrics, Holding, Recommendation, RecommendedAllocation};
