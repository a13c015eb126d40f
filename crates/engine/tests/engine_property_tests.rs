//! Property-based integration tests for the portfolio engine.
//!
//! These tests verify that universal properties hold across all valid inputs,
//! using the `proptest` crate for random test case generation.

use std::sync::Arc;

use portfolio_engine::allocation::{enforce_constraints, validate_allocation, AllocationOptions};
use portfolio_engine::consistency::{create_session_snapshot, PortfolioData};
use portfolio_engine::drawdown::decompose_drawdown;
use portfolio_engine::goals::{compute_goal_metrics, Goal, Holding};
use portfolio_engine::portfolio::{Company, CorrelationMatrix};
use portfolio_engine::simulation::{MonteCarloSimulator, SeededRandomSource, SimulationConfig};
use portfolio_engine::validation::IssueCode;
use proptest::prelude::*;
use rust_decimal::Decimal;

// =============================================================================
// Generators
// =============================================================================

const SECTORS: [&str; 4] = ["Technology", "Healthcare", "Energy", "Bonds"];

/// Generates a company with plausible return, risk and beta.
fn arb_company() -> impl Strategy<Value = Company> {
    (
        "[A-Z]{3,5}",  // symbol
        -5.0f64..25.0, // expected return
        1.0f64..60.0,  // risk
        0.1f64..2.0,   // beta
        0usize..4,     // sector
    )
        .prop_map(|(symbol, er, risk, beta, sector)| Company::new(symbol, er, risk, beta, SECTORS[sector]))
}

/// Generates a portfolio with a heuristic correlation matrix.
fn arb_portfolio(max_assets: usize) -> impl Strategy<Value = PortfolioData> {
    proptest::collection::vec((arb_company(), 0.0f64..1.0), 1..=max_assets).prop_map(|assets| {
        let companies: Vec<Company> = assets.iter().map(|(c, _)| c.clone()).collect();
        PortfolioData::new(
            companies.iter().map(|c| c.symbol.clone()).collect(),
            assets.iter().map(|(_, w)| *w).collect(),
            companies.iter().map(|c| c.expected_return).collect(),
            companies.iter().map(|c| c.risk).collect(),
            CorrelationMatrix::from_sector_heuristic(&companies),
        )
    })
}

/// Generates a raw weight vector that is not necessarily normalized.
fn arb_weights(max_len: usize) -> impl Strategy<Value = Vec<f64>> {
    proptest::collection::vec(0.0f64..1.0, 1..=max_len)
}

// =============================================================================
// Property Tests
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// **Feature: consistency, Property 1: Snapshot hashing is idempotent**
    ///
    /// Snapshotting the same inputs twice, or snapshotting inputs that are
    /// already rounded, yields the same hash.
    #[test]
    fn prop_snapshot_hash_is_idempotent(portfolio in arb_portfolio(8)) {
        let first = create_session_snapshot(&portfolio).unwrap();
        let second = create_session_snapshot(&portfolio).unwrap();
        prop_assert_eq!(&first.hash, &second.hash);

        let rounded = &first.rounded_inputs;
        let again = PortfolioData::new(
            rounded.symbols.clone(),
            rounded.weights.clone(),
            rounded.expected_returns.clone(),
            rounded.risks.clone(),
            CorrelationMatrix::new(rounded.correlation.clone()).unwrap(),
        );
        let third = create_session_snapshot(&again).unwrap();
        prop_assert_eq!(&first.hash, &third.hash);
    }

    /// **Feature: allocation, Property 2: Repaired weights sum to one**
    ///
    /// Whenever constraint repair succeeds, the adjusted vector sums to 1
    /// within 1e-6 and passes the sum check.
    #[test]
    fn prop_enforced_weights_sum_to_one(weights in arb_weights(20)) {
        let options = AllocationOptions::default();
        let result = enforce_constraints(&weights, &options);
        prop_assume!(result.is_ok());
        let adjusted = result.unwrap().adjusted;

        let sum: f64 = adjusted.iter().sum();
        prop_assert!((sum - 1.0).abs() < 1e-6, "sum was {}", sum);
        prop_assert!(adjusted.iter().all(|w| *w >= 0.0));

        let validation = validate_allocation(&adjusted, &options);
        prop_assert!(!validation.report.has_code(IssueCode::SumConstraint));
    }

    /// **Feature: drawdown, Property 3: Drawdown shares sum to 100%**
    #[test]
    fn prop_drawdown_contributions_close(
        assets in proptest::collection::vec((0.01f64..1.0, 1.0f64..80.0, 0.1f64..2.0), 1..12),
        drawdown in 1.0f64..60.0,
    ) {
        let weights: Vec<f64> = assets.iter().map(|a| a.0).collect();
        let risks: Vec<f64> = assets.iter().map(|a| a.1).collect();
        let betas: Vec<f64> = assets.iter().map(|a| a.2).collect();

        let contributions = decompose_drawdown(&weights, &risks, &betas, drawdown).unwrap();
        let total: f64 = contributions.iter().map(|c| c.percent_of_drawdown).sum();
        prop_assert!((total - 100.0).abs() < 1e-6, "total was {}", total);
        prop_assert_eq!(contributions.len(), weights.len());
    }

    /// **Feature: goals, Property 4: Progress is monotonic in holdings value**
    #[test]
    fn prop_goal_progress_monotonic_in_holdings(
        target in 1_000.0f64..1_000_000.0,
        capital in 0.0f64..100_000.0,
        price in 1u32..1_000,
        low in 0u32..500,
        extra in 0u32..500,
    ) {
        let goal = Goal::new("goal", target).with_current_allocation(capital);
        let holding = |qty: u32| vec![Holding::new("VTI", Decimal::from(qty), Decimal::from(price))];

        let smaller = compute_goal_metrics(&goal, &holding(low)).unwrap();
        let larger = compute_goal_metrics(&goal, &holding(low + extra)).unwrap();
        prop_assert!(smaller.progress_percent <= larger.progress_percent);
        prop_assert!(smaller.portfolio_value <= larger.portfolio_value);
        prop_assert!(smaller.remaining_gap >= larger.remaining_gap);
    }

    /// **Feature: goals, Property 5: Portfolio value is capital plus holdings**
    ///
    /// Initial capital and holdings are additive: holdings represent value
    /// beyond the initial allocation, so neither is ever dropped.
    #[test]
    fn prop_portfolio_value_is_capital_plus_holdings(
        target in 1_000.0f64..1_000_000.0,
        capital in 0.0f64..100_000.0,
        qty in 0u32..1_000,
        price in 1u32..500,
    ) {
        let goal = Goal::new("goal", target).with_current_allocation(capital);
        let holdings = vec![Holding::new("BND", Decimal::from(qty), Decimal::from(price))];
        let metrics = compute_goal_metrics(&goal, &holdings).unwrap();

        let expected = capital + f64::from(qty) * f64::from(price);
        prop_assert!((metrics.portfolio_value - expected).abs() <= 0.5,
            "portfolio value {} vs {}", metrics.portfolio_value, expected);

        let expected_progress = expected / target * 100.0;
        prop_assert!((metrics.progress_percent - expected_progress).abs() <= 0.05 + 1e-9);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(10))]

    /// **Feature: simulation, Property 6: Percentiles are ordered for every strategy**
    #[test]
    fn prop_rebalancing_percentiles_ordered(
        companies in proptest::collection::vec(arb_company(), 1..5),
        seed in any::<u64>(),
        years in 1u32..4,
    ) {
        let weights = vec![1.0 / companies.len() as f64; companies.len()];
        let config = SimulationConfig { rebalancing_paths: 60, ..SimulationConfig::default() };
        let simulator = MonteCarloSimulator::new(config, Arc::new(SeededRandomSource::new(seed)));

        let impact = simulator.calculate_rebalancing_impact(&companies, &weights, years).unwrap();
        prop_assert_eq!(impact.strategies.len(), 3);
        for outcome in &impact.strategies {
            let r = &outcome.annualized_return;
            prop_assert!(r.p25 <= r.median && r.median <= r.p75);
            let s = &outcome.sharpe_ratio;
            prop_assert!(s.p25 <= s.median && s.median <= s.p75);
        }
    }
}
