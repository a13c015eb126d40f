//! Monte Carlo routines over monthly-compounded normal returns.

use std::sync::Arc;

use log::debug;
use rayon::prelude::*;

use super::paths::{current_weights, draw_shocks, run_path, step_holdings, RebalancePolicy};
use super::random::{standard_normal, stream_id, EntropyRandomSource, RandomSource};
use super::simulation_model::*;
use super::statistics::{annualized_return_percent, annualized_sharpe, mean};
use crate::constants::*;
use crate::errors::{ensure_finite, ensure_len, Error, Result, ValidationError};
use crate::portfolio::{normalize_weights, weight_sum, weights_sum_to_one, Company};

const DRIFT_ROUTINE: u64 = 1;
const REBALANCING_ROUTINE: u64 = 2;
const DCA_ROUTINE: u64 = 3;
const PANIC_ROUTINE: u64 = 4;
const THRESHOLD_ROUTINE: u64 = 5;

/// Runs the stochastic routines with a configured path count and random source.
///
/// Each path draws from `random.stream(..)` keyed by routine and path index,
/// so a [`SeededRandomSource`](super::SeededRandomSource) gives identical
/// results on any number of threads.
#[derive(Clone)]
pub struct MonteCarloSimulator {
    config: SimulationConfig,
    random: Arc<dyn RandomSource>,
}

impl Default for MonteCarloSimulator {
    fn default() -> Self {
        Self::new(SimulationConfig::default(), Arc::new(EntropyRandomSource))
    }
}

impl MonteCarloSimulator {
    pub fn new(config: SimulationConfig, random: Arc<dyn RandomSource>) -> Self {
        Self { config, random }
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Lets an unrebalanced portfolio drift for `months`, sampling the
    /// deviation from target each quarter and at the final month.
    pub fn simulate_portfolio_drift(
        &self,
        companies: &[Company],
        weights: &[f64],
        months: u32,
    ) -> Result<PortfolioDrift> {
        let weights = validate_portfolio(companies, weights)?;
        ensure_horizon("months", months)?;
        let paths = ensure_paths("driftPaths", self.config.drift_paths)?;
        let n = companies.len();
        debug!("Simulating drift: {} assets, {} months, {} paths", n, months, paths);

        let checkpoints: Vec<u32> = (1..=months)
            .filter(|m| is_drift_checkpoint(*m, months))
            .collect();

        let per_path: Vec<(Vec<(f64, f64)>, Vec<f64>)> = (0..paths)
            .into_par_iter()
            .map(|path| {
                let mut rng = self.random.stream(stream_id(DRIFT_ROUTINE, path));
                let mut holdings = weights.clone();
                let mut samples = Vec::with_capacity(checkpoints.len());
                for month in 1..=months {
                    let shocks: Vec<f64> = (0..n).map(|_| standard_normal(&mut rng)).collect();
                    step_holdings(&mut holdings, companies, &shocks);
                    if is_drift_checkpoint(month, months) {
                        let total: f64 = holdings.iter().sum();
                        samples.push(drift_sample(&current_weights(&holdings, total), &weights));
                    }
                }
                let total: f64 = holdings.iter().sum();
                (samples, current_weights(&holdings, total))
            })
            .collect();

        let checkpoints = checkpoints
            .iter()
            .enumerate()
            .map(|(index, month)| {
                let mut average: Vec<f64> = per_path.iter().map(|(s, _)| s[index].0).collect();
                let mut max: Vec<f64> = per_path.iter().map(|(s, _)| s[index].1).collect();
                DriftCheckpoint {
                    month: *month,
                    average_drift: PercentileStats::from_samples(&mut average),
                    max_asset_drift: PercentileStats::from_samples(&mut max),
                }
            })
            .collect();

        let median_final_weights = (0..n)
            .map(|asset| {
                let mut finals: Vec<f64> = per_path.iter().map(|(_, w)| w[asset]).collect();
                PercentileStats::from_samples(&mut finals).median
            })
            .collect();

        Ok(PortfolioDrift {
            paths,
            checkpoints,
            median_final_weights,
        })
    }

    /// Compares never, monthly and annual rebalancing on shared market paths.
    pub fn calculate_rebalancing_impact(
        &self,
        companies: &[Company],
        weights: &[f64],
        years: u32,
    ) -> Result<RebalancingImpact> {
        let weights = validate_portfolio(companies, weights)?;
        ensure_horizon("years", years)?;
        let paths = ensure_paths("rebalancingPaths", self.config.rebalancing_paths)?;
        let cost_bps = self.config.transaction_cost_bps;
        let risk_free = self.config.risk_free_rate;
        let months = years * 12;
        debug!(
            "Simulating rebalancing impact: {} assets, {} years, {} paths, {} bps",
            companies.len(),
            years,
            paths,
            cost_bps
        );

        let per_path: Vec<[PathSummary; 3]> = (0..paths)
            .into_par_iter()
            .map(|path| {
                let mut rng = self.random.stream(stream_id(REBALANCING_ROUTINE, path));
                let shocks = draw_shocks(&mut rng, months, companies.len());
                RebalancingStrategy::ALL.map(|strategy| {
                    let outcome = run_path(companies, &weights, &shocks, strategy.policy(), cost_bps);
                    PathSummary {
                        annualized_return: annualized_return_percent(1.0, outcome.terminal_value, months),
                        sharpe_ratio: annualized_sharpe(&outcome.monthly_returns, risk_free),
                        cost_percent: outcome.total_cost * 100.0,
                        rebalances: f64::from(outcome.rebalances),
                    }
                })
            })
            .collect();

        let strategies: Vec<StrategyOutcome> = RebalancingStrategy::ALL
            .iter()
            .enumerate()
            .map(|(index, strategy)| {
                let summaries: Vec<PathSummary> = per_path.iter().map(|p| p[index]).collect();
                let mut returns: Vec<f64> = summaries.iter().map(|s| s.annualized_return).collect();
                let mut sharpes: Vec<f64> = summaries.iter().map(|s| s.sharpe_ratio).collect();
                let costs: Vec<f64> = summaries.iter().map(|s| s.cost_percent).collect();
                let rebalances: Vec<f64> = summaries.iter().map(|s| s.rebalances).collect();
                StrategyOutcome {
                    strategy: *strategy,
                    annualized_return: PercentileStats::from_samples(&mut returns),
                    sharpe_ratio: PercentileStats::from_samples(&mut sharpes),
                    average_cost_percent: mean(&costs),
                    average_rebalances: mean(&rebalances),
                }
            })
            .collect();

        let best_strategy = strategies
            .iter()
            .fold(None::<&StrategyOutcome>, |best, candidate| match best {
                Some(b) if b.sharpe_ratio.median >= candidate.sharpe_ratio.median => Some(b),
                _ => Some(candidate),
            })
            .map_or(RebalancingStrategy::None, |s| s.strategy);

        Ok(RebalancingImpact {
            paths,
            years,
            transaction_cost_bps: cost_bps,
            strategies,
            best_strategy,
        })
    }

    /// Invests `principal` at once versus `monthly_amount` per month, on
    /// paired paths of a single asset.
    pub fn compare_dca_vs_lump_sum(
        &self,
        principal: f64,
        monthly_amount: f64,
        expected_return: f64,
        volatility: f64,
        years: u32,
    ) -> Result<DcaComparison> {
        ensure_positive("principal", principal)?;
        ensure_positive("monthlyAmount", monthly_amount)?;
        ensure_finite("expectedReturn", &[expected_return])?;
        ensure_volatility(volatility)?;
        ensure_horizon("years", years)?;
        let paths = ensure_paths("dcaPaths", self.config.dca_paths)?;
        let months = years * 12;
        let (mu, sigma) = monthly_parameters(expected_return, volatility);
        debug!(
            "Simulating DCA vs lump sum: principal {}, monthly {}, {} years, {} paths",
            principal, monthly_amount, years, paths
        );

        let per_path: Vec<(f64, f64)> = (0..paths)
            .into_par_iter()
            .map(|path| {
                let mut rng = self.random.stream(stream_id(DCA_ROUTINE, path));
                let mut lump = principal;
                let mut invested = 0.0;
                let mut cash = principal;
                for _ in 0..months {
                    if cash > 0.0 {
                        let tranche = monthly_amount.min(cash);
                        cash -= tranche;
                        invested += tranche;
                    }
                    let r = mu + standard_normal(&mut rng) * sigma;
                    lump = (lump * (1.0 + r)).max(0.0);
                    invested = (invested * (1.0 + r)).max(0.0);
                }
                (lump, invested + cash)
            })
            .collect();

        let wins = per_path.iter().filter(|(lump, dca)| dca > lump).count();
        let advantages: Vec<f64> = per_path.iter().map(|(lump, dca)| lump - dca).collect();
        let mut lump: Vec<f64> = per_path.iter().map(|(l, _)| *l).collect();
        let mut dca: Vec<f64> = per_path.iter().map(|(_, d)| *d).collect();

        Ok(DcaComparison {
            paths,
            lump_sum: PercentileStats::from_samples(&mut lump),
            dca: DcaOutcome {
                terminal_value: PercentileStats::from_samples(&mut dca),
                win_rate: wins as f64 / paths as f64 * 100.0,
            },
            months_to_deploy: (principal / monthly_amount).ceil() as u32,
            average_lump_sum_advantage: mean(&advantages),
        })
    }

    /// Buy-and-hold versus an investor who sells after a 20% fall from the
    /// initial value, sits in cash for six months, then buys back in.
    pub fn calculate_panic_selling_impact(
        &self,
        expected_return: f64,
        volatility: f64,
        years: u32,
    ) -> Result<PanicSellingImpact> {
        ensure_finite("expectedReturn", &[expected_return])?;
        ensure_volatility(volatility)?;
        ensure_horizon("years", years)?;
        let paths = ensure_paths("panicSellingPaths", self.config.panic_selling_paths)?;
        let months = years * 12;
        let (mu, sigma) = monthly_parameters(expected_return, volatility);
        let initial = PANIC_INITIAL_VALUE;
        let trigger = initial * (1.0 - PANIC_DRAWDOWN_TRIGGER);
        debug!("Simulating panic selling: {} years, {} paths", years, paths);

        let per_path: Vec<(f64, f64, bool)> = (0..paths)
            .into_par_iter()
            .map(|path| {
                let mut rng = self.random.stream(stream_id(PANIC_ROUTINE, path));
                let mut held = initial;
                let mut panicked = initial;
                let mut state = PanicState::Invested;
                for _ in 0..months {
                    let r = mu + standard_normal(&mut rng) * sigma;
                    held = (held * (1.0 + r)).max(0.0);
                    state = match state {
                        PanicState::Invested => {
                            panicked = (panicked * (1.0 + r)).max(0.0);
                            if panicked <= trigger {
                                PanicState::InCash(PANIC_CASH_MONTHS)
                            } else {
                                PanicState::Invested
                            }
                        }
                        PanicState::InCash(left) if left > 1 => PanicState::InCash(left - 1),
                        PanicState::InCash(_) => PanicState::Reentered,
                        PanicState::Reentered => {
                            panicked = (panicked * (1.0 + r)).max(0.0);
                            PanicState::Reentered
                        }
                    };
                }
                (held, panicked, state != PanicState::Invested)
            })
            .collect();

        let triggered_costs: Vec<f64> = per_path
            .iter()
            .filter(|(_, _, triggered)| *triggered)
            .map(|(held, panicked, _)| held - panicked)
            .collect();
        let mut held: Vec<f64> = per_path.iter().map(|p| p.0).collect();
        let mut panicked: Vec<f64> = per_path.iter().map(|p| p.1).collect();
        let buy_and_hold = PercentileStats::from_samples(&mut held);
        let panic_selling = PercentileStats::from_samples(&mut panicked);
        let opportunity_cost = buy_and_hold.median - panic_selling.median;
        let opportunity_cost_percent = if buy_and_hold.median > 0.0 {
            opportunity_cost / buy_and_hold.median * 100.0
        } else {
            0.0
        };

        Ok(PanicSellingImpact {
            paths,
            initial_value: initial,
            buy_and_hold,
            panic_selling,
            opportunity_cost,
            opportunity_cost_percent,
            trigger_rate: triggered_costs.len() as f64 / paths as f64 * 100.0,
            average_cost_when_triggered: mean(&triggered_costs),
        })
    }

    /// Tries each candidate drift threshold over ten years and picks the one
    /// with the best median return after costs.
    pub fn calculate_optimal_threshold(
        &self,
        companies: &[Company],
        weights: &[f64],
        transaction_cost_bps: f64,
    ) -> Result<OptimalThreshold> {
        let weights = validate_portfolio(companies, weights)?;
        if !transaction_cost_bps.is_finite() || transaction_cost_bps < 0.0 {
            return Err(ValidationError::invalid_input(format!(
                "transaction cost must be a non-negative number of basis points, got {transaction_cost_bps}"
            ))
            .into());
        }
        let paths = ensure_paths("thresholdPaths", self.config.threshold_paths)?;
        let months = THRESHOLD_HORIZON_YEARS * 12;
        let risk_free = self.config.risk_free_rate;
        debug!(
            "Searching rebalancing thresholds {:?}: {} paths each, {} bps",
            REBALANCING_THRESHOLDS, paths, transaction_cost_bps
        );

        // Every threshold sees the same market paths.
        let per_path: Vec<Vec<PathSummary>> = (0..paths)
            .into_par_iter()
            .map(|path| {
                let mut rng = self.random.stream(stream_id(THRESHOLD_ROUTINE, path));
                let shocks = draw_shocks(&mut rng, months, companies.len());
                REBALANCING_THRESHOLDS
                    .iter()
                    .map(|threshold| {
                        let policy = RebalancePolicy::Threshold(threshold / 100.0);
                        let outcome = run_path(companies, &weights, &shocks, policy, transaction_cost_bps);
                        PathSummary {
                            annualized_return: annualized_return_percent(1.0, outcome.terminal_value, months),
                            sharpe_ratio: annualized_sharpe(&outcome.monthly_returns, risk_free),
                            cost_percent: outcome.total_cost * 100.0,
                            rebalances: f64::from(outcome.rebalances),
                        }
                    })
                    .collect()
            })
            .collect();

        let outcomes: Vec<ThresholdOutcome> = REBALANCING_THRESHOLDS
            .iter()
            .enumerate()
            .map(|(index, threshold)| {
                let mut returns: Vec<f64> = per_path.iter().map(|p| p[index].annualized_return).collect();
                let mut sharpes: Vec<f64> = per_path.iter().map(|p| p[index].sharpe_ratio).collect();
                let costs: Vec<f64> = per_path.iter().map(|p| p[index].cost_percent).collect();
                let rebalances: Vec<f64> = per_path.iter().map(|p| p[index].rebalances).collect();
                ThresholdOutcome {
                    threshold: *threshold,
                    net_return: PercentileStats::from_samples(&mut returns),
                    sharpe_ratio: PercentileStats::from_samples(&mut sharpes),
                    average_rebalances: mean(&rebalances),
                    average_cost_percent: mean(&costs),
                }
            })
            .collect();

        let optimal_threshold = outcomes
            .iter()
            .fold(None::<&ThresholdOutcome>, |best, candidate| match best {
                Some(b) if b.net_return.median >= candidate.net_return.median => Some(b),
                _ => Some(candidate),
            })
            .map_or(REBALANCING_THRESHOLDS[0], |o| o.threshold);

        Ok(OptimalThreshold {
            optimal_threshold,
            outcomes,
        })
    }
}

#[derive(Debug, Clone, Copy)]
struct PathSummary {
    annualized_return: f64,
    sharpe_ratio: f64,
    cost_percent: f64,
    rebalances: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PanicState {
    Invested,
    /// Months left in cash
    InCash(u32),
    Reentered,
}

impl RebalancingStrategy {
    fn policy(self) -> RebalancePolicy {
        match self {
            RebalancingStrategy::None => RebalancePolicy::Never,
            RebalancingStrategy::Monthly => RebalancePolicy::Periodic(1),
            RebalancingStrategy::Annual => RebalancePolicy::Periodic(12),
        }
    }
}

fn is_drift_checkpoint(month: u32, months: u32) -> bool {
    month % 3 == 0 || month == months
}

/// `(mean, max)` absolute deviation from target, in percentage points.
fn drift_sample(current: &[f64], target: &[f64]) -> (f64, f64) {
    let deviations: Vec<f64> = current
        .iter()
        .zip(target)
        .map(|(w, t)| (w - t).abs() * 100.0)
        .collect();
    let max = deviations.iter().copied().fold(0.0, f64::max);
    (mean(&deviations), max)
}

fn monthly_parameters(expected_return: f64, volatility: f64) -> (f64, f64) {
    (expected_return / 100.0 / 12.0, volatility / 100.0 / 12f64.sqrt())
}

/// Checks companies against weights. Weights must already sum to one within
/// tolerance; the returned copy closes the remaining rounding gap.
fn validate_portfolio(companies: &[Company], weights: &[f64]) -> Result<Vec<f64>> {
    if companies.is_empty() {
        return Err(ValidationError::EmptyPortfolio("no companies to simulate".to_string()).into());
    }
    ensure_len("weights", companies.len(), weights.len())?;
    ensure_finite("weights", weights)?;
    if let Some(index) = weights.iter().position(|w| *w < 0.0) {
        return Err(ValidationError::invalid_input(format!(
            "weights[{index}] is negative"
        ))
        .into());
    }
    for company in companies {
        ensure_finite(&company.symbol, &[company.expected_return, company.risk])?;
        if company.risk < 0.0 {
            return Err(ValidationError::invalid_input(format!(
                "{} has negative risk {}",
                company.symbol, company.risk
            ))
            .into());
        }
    }
    if !weights_sum_to_one(weights) {
        return Err(ValidationError::invalid_input(format!(
            "weights sum to {:.6}, expected 1.0 ± {WEIGHT_SUM_TOLERANCE}",
            weight_sum(weights)
        ))
        .into());
    }
    normalize_weights(weights)
}

fn ensure_horizon(field: &str, value: u32) -> Result<()> {
    if value == 0 {
        return Err(ValidationError::invalid_input(format!("{field} must be at least 1")).into());
    }
    Ok(())
}

fn ensure_positive(field: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(ValidationError::invalid_input(format!(
            "{field} must be a positive number, got {value}"
        ))
        .into());
    }
    Ok(())
}

fn ensure_volatility(volatility: f64) -> Result<()> {
    if !volatility.is_finite() || volatility < 0.0 {
        return Err(ValidationError::invalid_input(format!(
            "volatility must be a non-negative number, got {volatility}"
        ))
        .into());
    }
    Ok(())
}

fn ensure_paths(field: &str, paths: usize) -> Result<usize> {
    if paths == 0 {
        return Err(Error::InvalidConfigValue(format!("{field} must be at least 1")));
    }
    Ok(paths)
}
