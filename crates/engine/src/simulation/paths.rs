//! Single-path evolution shared by the portfolio-level routines.

use rand::Rng;

use super::random::standard_normal;
use crate::allocation::one_sided_turnover;
use crate::portfolio::Company;

/// When a path restores its target weights.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum RebalancePolicy {
    Never,
    /// Every `n` months
    Periodic(u32),
    /// When any weight deviates from target by more than this fraction
    Threshold(f64),
}

#[derive(Debug, Clone, Default)]
pub(crate) struct PathOutcome {
    pub terminal_value: f64,
    /// End-of-month returns after costs
    pub monthly_returns: Vec<f64>,
    pub total_cost: f64,
    pub rebalances: u32,
}

/// Monthly standard-normal shocks, `months × assets`.
pub(crate) fn draw_shocks<R: Rng + ?Sized>(rng: &mut R, months: u32, assets: usize) -> Vec<Vec<f64>> {
    (0..months)
        .map(|_| (0..assets).map(|_| standard_normal(rng)).collect())
        .collect()
}

/// Applies one month of shocks to `holdings` in place. Values are clamped at zero.
pub(crate) fn step_holdings(holdings: &mut [f64], companies: &[Company], shocks: &[f64]) {
    for ((value, company), z) in holdings.iter_mut().zip(companies).zip(shocks) {
        let r = company.monthly_return() + z * company.monthly_volatility();
        *value = (*value * (1.0 + r)).max(0.0);
    }
}

pub(crate) fn current_weights(holdings: &[f64], total: f64) -> Vec<f64> {
    if total <= 0.0 {
        return vec![0.0; holdings.len()];
    }
    holdings.iter().map(|h| h / total).collect()
}

/// Runs a unit-value portfolio through `shocks` under `policy`.
pub(crate) fn run_path(
    companies: &[Company],
    weights: &[f64],
    shocks: &[Vec<f64>],
    policy: RebalancePolicy,
    cost_bps: f64,
) -> PathOutcome {
    let mut holdings = weights.to_vec();
    let mut outcome = PathOutcome {
        monthly_returns: Vec::with_capacity(shocks.len()),
        ..PathOutcome::default()
    };

    for (index, month_shocks) in shocks.iter().enumerate() {
        let month = index as u32 + 1;
        let start: f64 = holdings.iter().sum();
        step_holdings(&mut holdings, companies, month_shocks);
        let mut end: f64 = holdings.iter().sum();

        if end > 0.0 {
            let drifted = current_weights(&holdings, end);
            let due = match policy {
                RebalancePolicy::Never => false,
                RebalancePolicy::Periodic(every) => every > 0 && month % every == 0,
                RebalancePolicy::Threshold(limit) => drifted
                    .iter()
                    .zip(weights)
                    .any(|(w, target)| (w - target).abs() > limit),
            };
            if due {
                let cost = one_sided_turnover(&drifted, weights) * cost_bps / 10_000.0 * end;
                end -= cost;
                outcome.total_cost += cost;
                outcome.rebalances += 1;
                for (h, w) in holdings.iter_mut().zip(weights) {
                    *h = w * end;
                }
            }
        }

        let monthly = if start > 0.0 { end / start - 1.0 } else { 0.0 };
        outcome.monthly_returns.push(monthly);
    }

    outcome.terminal_value = holdings.iter().sum();
    outcome
}
