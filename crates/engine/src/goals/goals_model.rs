//! Goals domain models.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A user-defined savings goal.
///
/// `target_amount` is optional because the goal editor can persist a goal
/// before the amount is filled in; such a goal cannot be measured.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Goal {
    pub id: String,
    pub title: String,
    pub target_amount: Option<f64>,
    /// Initial capital set aside for the goal
    pub current_allocation: Option<f64>,
    pub target_date: Option<NaiveDate>,
}

impl Goal {
    pub fn new(id: impl Into<String>, target_amount: f64) -> Self {
        Self {
            id: id.into(),
            target_amount: Some(target_amount),
            ..Default::default()
        }
    }

    pub fn with_current_allocation(mut self, amount: f64) -> Self {
        self.current_allocation = Some(amount);
        self
    }

    pub fn with_target_date(mut self, date: NaiveDate) -> Self {
        self.target_date = Some(date);
        self
    }
}

/// A tracked position counted toward a goal.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Holding {
    pub symbol: String,
    pub quantity: Decimal,
    pub average_cost: Decimal,
    pub current_price: Option<Decimal>,
}

impl Holding {
    pub fn new(symbol: impl Into<String>, quantity: Decimal, average_cost: Decimal) -> Self {
        Self {
            symbol: symbol.into(),
            quantity,
            average_cost,
            current_price: None,
        }
    }

    pub fn with_price(mut self, price: Decimal) -> Self {
        self.current_price = Some(price);
        self
    }

    /// Quantity at the current price, falling back to average cost.
    pub fn market_value(&self) -> Decimal {
        self.quantity * self.current_price.unwrap_or(self.average_cost)
    }
}

/// Progress of one goal, produced only by `compute_goal_metrics`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GoalMetrics {
    pub goal_id: String,
    pub target_amount: f64,
    /// Initial allocation plus holdings, whole units
    pub portfolio_value: f64,
    /// Market value of tracked holdings, whole units
    pub holdings_value: f64,
    pub initial_capital: f64,
    /// One decimal place
    pub progress_percent: f64,
    pub remaining_gap: f64,
    pub months_remaining: u32,
    /// Monthly saving that closes the gap by the target date
    pub required_monthly_contribution: f64,
    pub is_achieved: bool,
}

/// Allocation suggested alongside a goal analysis.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub allocations: Vec<RecommendedAllocation>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RecommendedAllocation {
    pub label: String,
    /// Share of the portfolio in percent
    pub percent: f64,
}

impl Recommendation {
    pub fn total_percent(&self) -> f64 {
        self.allocations.iter().map(|a| a.percent).sum()
    }
}
