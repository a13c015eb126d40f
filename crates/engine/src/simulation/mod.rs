//! Simulation module - Monte Carlo analysis of drift, rebalancing and investor behaviour.
//!
//! The free functions use [`MonteCarloSimulator::default`], which draws from OS
//! entropy on every call. Build a simulator with a [`SeededRandomSource`] for
//! reproducible runs.

mod monte_carlo;
mod paths;
mod random;
mod simulation_model;
mod statistics;

pub use monte_carlo::MonteCarloSimulator;
pub use random::{standard_normal, EntropyRandomSource, RandomSource, SeededRandomSource};
pub use simulation_model::*;

use crate::errors::Result;
use crate::portfolio::Company;


pub fn simulate_portfolio_drift(companies: &[Company], weights: &[f64], months: u32) -> Result<PortfolioDrift> {
    MonteCarloSimulator::default().simulate_portfolio_drift(companies, weights, months)
}

pub fn calculate_rebalancing_impact(
    companies: &[Company],
    weights: &[f64],
    years: u32,
) -> Result<RebalancingImpact> {
    MonteCarloSimulator::default().calculate_rebalancing_impact(companies, weights, years)
}

pub fn compare_dca_vs_lump_sum(
    principal: f64,
    monthly_amount: f64,
    expected_return: f64,
    volatility: f64,
    years: u32,
) -> Result<DcaComparison> {
    MonteCarloSimulator::default().compare_dca_vs_lump_sum(
        principal,
        monthly_amount,
        expected_return,
        volatility,
        years,
    )
}

pub fn calculate_panic_selling_impact(
    expected_return: f64,
    volatility: f64,
    years: u32,
) -> Result<PanicSellingImpact> {
    MonteCarloSimulator::default().calculate_panic_selling_impact(expected_return, volatility, years)
}

pub fn calculate_optimal_threshold(
    companies: &[Company],
    weights: &[f64],
    transaction_cost_bps: f64,
) -> Result<OptimalThreshold> {
    MonteCarloSimulator::default().calculate_optimal_threshold(companies, weights, transaction_cost_bps)
}
