//! Engine service.
//!
//! `EngineService` bundles the configuration, the random source and the
//! metric registry so hosts pass one context object instead of threading
//! tolerances and path counts through every call.

use std::sync::Arc;

use log::{debug, info};

use crate::allocation::{
    check_rebalancing_feasibility, enforce_constraints, validate_allocation,
    validate_position_sizing, AllocationValidation, ConstraintAdjustment, PositionSizing,
    RebalancingFeasibility,
};
use crate::config::EngineConfig;
use crate::consistency::{
    apply_consistency_adjustments, create_session_snapshot_with_id, detect_drift,
    verify_consistency, verify_snapshot_hash, AdjustedPortfolio, CalculationResults,
    ConsistencyReport, DriftReport, EnforcedMetric, MetricRegistry, PortfolioData,
    RegisteredMetric, Snapshot,
};
use crate::drawdown::{
    analyze_tail_risk_concentration, calculate_drawdown_diversification_benefit,
    decompose_drawdown, decompose_drawdown_by_sector, estimate_recovery_time,
    identify_top_contributors, DiversificationBenefit, DrawdownContribution, RecoveryEstimate,
    SectorDrawdown, TailRiskConcentration,
};
use crate::errors::Result;
use crate::goals::{
    can_render_goal_analysis, compute_goal_metrics, validate_goal_analysis, Goal, GoalMetrics,
    Holding, Recommendation, RenderDecision,
};
use crate::portfolio::Company;
use crate::simulation::{
    DcaComparison, EntropyRandomSource, MonteCarloSimulator, OptimalThreshold,
    PanicSellingImpact, PortfolioDrift, RandomSource, RebalancingImpact,
};
use crate::validation::ValidationReport;

/// Every engine operation, evaluated against one configuration.
#[derive(Clone)]
pub struct EngineService {
    config: EngineConfig,
    simulator: MonteCarloSimulator,
    registry: Arc<MetricRegistry>,
}

impl EngineService {
    /// Creates a service with entropy-backed simulations and a fresh registry.
    pub fn new(config: EngineConfig) -> Result<Self> {
        let registry = Arc::new(MetricRegistry::new(config.consistency.registry_tolerance));
        Self::with_dependencies(config, Arc::new(EntropyRandomSource), registry)
    }

    /// Creates a service with an injected random source and registry.
    pub fn with_dependencies(
        config: EngineConfig,
        random: Arc<dyn RandomSource>,
        registry: Arc<MetricRegistry>,
    ) -> Result<Self> {
        config.validate()?;
        info!(
            "Engine service ready: {} rebalancing paths, {} bps",
            config.simulation.rebalancing_paths, config.simulation.transaction_cost_bps
        );
        Ok(Self {
            simulator: MonteCarloSimulator::new(config.simulation.clone(), random),
            config,
            registry,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn registry(&self) -> &Arc<MetricRegistry> {
        &self.registry
    }

    // ==================== Goals ====================

    pub fn compute_goal_metrics(&self, goal: &Goal, holdings: &[Holding]) -> Result<GoalMetrics> {
        compute_goal_metrics(goal, holdings)
    }

    pub fn validate_goal_analysis(
        &self,
        goal: &Goal,
        metrics: &GoalMetrics,
        recommendation: Option<&Recommendation>,
    ) -> ValidationReport {
        validate_goal_analysis(goal, metrics, recommendation)
    }

    pub fn can_render_goal_analysis(
        &self,
        goal: &Goal,
        metrics: &GoalMetrics,
        recommendation: Option<&Recommendation>,
    ) -> RenderDecision {
        can_render_goal_analysis(goal, metrics, recommendation)
    }

    // ==================== Allocation ====================

    pub fn validate_allocation(&self, weights: &[f64]) -> AllocationValidation {
        validate_allocation(weights, &self.config.allocation)
    }

    pub fn enforce_constraints(&self, weights: &[f64]) -> Result<ConstraintAdjustment> {
        enforce_constraints(weights, &self.config.allocation)
    }

    pub fn validate_position_sizing(
        &self,
        weights: &[f64],
        prices: &[f64],
        account_value: f64,
    ) -> Result<PositionSizing> {
        validate_position_sizing(weights, prices, account_value)
    }

    /// Feasibility at the configured transaction cost.
    pub fn check_rebalancing_feasibility(
        &self,
        current: &[f64],
        target: &[f64],
    ) -> Result<RebalancingFeasibility> {
        check_rebalancing_feasibility(current, target, self.config.simulation.transaction_cost_bps)
    }

    // ==================== Drawdown ====================

    pub fn decompose_drawdown(
        &self,
        weights: &[f64],
        risks: &[f64],
        betas: &[f64],
        portfolio_drawdown: f64,
    ) -> Result<Vec<DrawdownContribution>> {
        decompose_drawdown(weights, risks, betas, portfolio_drawdown)
    }

    pub fn identify_top_contributors(
        &self,
        contributions: &[DrawdownContribution],
        threshold: f64,
    ) -> Vec<DrawdownContribution> {
        identify_top_contributors(contributions, threshold)
    }

    pub fn calculate_drawdown_diversification_benefit(
        &self,
        weights: &[f64],
        risks: &[f64],
        portfolio_drawdown: f64,
    ) -> Result<DiversificationBenefit> {
        calculate_drawdown_diversification_benefit(weights, risks, portfolio_drawdown)
    }

    pub fn estimate_recovery_time(
        &self,
        drawdown_percent: f64,
        expected_return: f64,
        volatility: f64,
    ) -> Result<RecoveryEstimate> {
        estimate_recovery_time(drawdown_percent, expected_return, volatility)
    }

    pub fn decompose_drawdown_by_sector(
        &self,
        contributions: &[DrawdownContribution],
        sectors: &[String],
    ) -> Result<Vec<SectorDrawdown>> {
        decompose_drawdown_by_sector(contributions, sectors)
    }

    pub fn analyze_tail_risk_concentration(
        &self,
        contributions: &[DrawdownContribution],
    ) -> TailRiskConcentration {
        analyze_tail_risk_concentration(contributions)
    }

    // ==================== Simulation ====================

    pub fn simulate_portfolio_drift(
        &self,
        companies: &[Company],
        weights: &[f64],
        months: u32,
    ) -> Result<PortfolioDrift> {
        self.simulator.simulate_portfolio_drift(companies, weights, months)
    }

    pub fn calculate_rebalancing_impact(
        &self,
        companies: &[Company],
        weights: &[f64],
        years: u32,
    ) -> Result<RebalancingImpact> {
        self.simulator.calculate_rebalancing_impact(companies, weights, years)
    }

    pub fn compare_dca_vs_lump_sum(
        &self,
        principal: f64,
        monthly_amount: f64,
        expected_return: f64,
        volatility: f64,
        years: u32,
    ) -> Result<DcaComparison> {
        self.simulator
            .compare_dca_vs_lump_sum(principal, monthly_amount, expected_return, volatility, years)
    }

    pub fn calculate_panic_selling_impact(
        &self,
        expected_return: f64,
        volatility: f64,
        years: u32,
    ) -> Result<PanicSellingImpact> {
        self.simulator
            .calculate_panic_selling_impact(expected_return, volatility, years)
    }

    /// Threshold search at the configured transaction cost.
    pub fn calculate_optimal_threshold(
        &self,
        companies: &[Company],
        weights: &[f64],
    ) -> Result<OptimalThreshold> {
        self.simulator.calculate_optimal_threshold(
            companies,
            weights,
            self.config.simulation.transaction_cost_bps,
        )
    }

    // ==================== Consistency ====================

    pub fn create_session_snapshot(&self, session_id: &str, portfolio: &PortfolioData) -> Result<Snapshot> {
        create_session_snapshot_with_id(session_id, portfolio)
    }

    pub fn verify_snapshot_hash(&self, snapshot: &Snapshot) -> Result<bool> {
        verify_snapshot_hash(snapshot)
    }

    pub fn verify_consistency(
        &self,
        results: &CalculationResults,
        snapshot: &Snapshot,
    ) -> Result<ConsistencyReport> {
        verify_consistency(results, snapshot, self.config.consistency.tolerance)
    }

    pub fn detect_drift(&self, snapshot: &Snapshot, current: &PortfolioData) -> Result<DriftReport> {
        detect_drift(snapshot, current, self.config.consistency.drift_threshold)
    }

    pub fn apply_consistency_adjustments(&self, portfolio: &PortfolioData) -> Result<AdjustedPortfolio> {
        apply_consistency_adjustments(portfolio)
    }

    pub fn register_metric(&self, session_id: &str, key: &str, value: f64) -> Result<RegisteredMetric> {
        self.registry.register_metric(session_id, key, value)
    }

    pub fn get_registered_metric(&self, session_id: &str, key: &str) -> Option<RegisteredMetric> {
        self.registry.get_registered_metric(session_id, key)
    }

    pub fn enforce_consistency(&self, session_id: &str, key: &str, value: f64) -> Result<EnforcedMetric> {
        self.registry.enforce_consistency(session_id, key, value)
    }

    /// Forgets a finished session's registered metrics.
    pub fn end_session(&self, session_id: &str) -> usize {
        let removed = self.registry.clear_session(session_id);
        debug!("Cleared {} metric(s) for session {}", removed, session_id);
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::Error;
    use crate::simulation::SeededRandomSource;

    fn seeded_service() -> EngineService {
        let config = EngineConfig::from_json_str(
            r#"{"simulation": {"dcaPaths": 500, "rebalancingPaths": 100, "thresholdPaths": 50}}"#,
        )
        .unwrap();
        EngineService::with_dependencies(
            config,
            Arc::new(SeededRandomSource::new(99)),
            Arc::new(MetricRegistry::default()),
        )
        .unwrap()
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let mut config = EngineConfig::default();
        config.simulation.drift_paths = 0;
        assert!(matches!(EngineService::new(config), Err(Error::InvalidConfigValue(_))));
    }

    #[test]
    fn test_seeded_service_is_reproducible() {
        let a = seeded_service().compare_dca_vs_lump_sum(10_000.0, 500.0, 8.0, 15.0, 10).unwrap();
        let b = seeded_service().compare_dca_vs_lump_sum(10_000.0, 500.0, 8.0, 15.0, 10).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.paths, 500);
    }

    #[test]
    fn test_allocation_uses_configured_limits() {
        let service = seeded_service();
        let result = service.enforce_constraints(&[0.7, 0.2, 0.1]).unwrap();
        let sum: f64 = result.adjusted.iter().sum();
        assert!((sum - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_registry_is_shared_across_clones() {
        let service = seeded_service();
        let clone = service.clone();
        service.register_metric("s1", "risk_AAPL", 18.0).unwrap();

        let enforced = clone.enforce_consistency("s1", "risk_AAPL", 20.0).unwrap();
        assert!(enforced.was_adjusted);
        assert_eq!(clone.end_session("s1"), 1);
        assert!(service.get_registered_metric("s1", "risk_AAPL").is_none());
    }

    #[test]
    fn test_snapshot_round_trip_through_service() {
        let service = seeded_service();
        let portfolio = PortfolioData::new(
            vec!["AAA".into(), "BBB".into()],
            vec![0.6, 0.4],
            vec![8.0, 5.0],
            vec![18.0, 9.0],
            crate::portfolio::CorrelationMatrix::identity(2),
        );
        let snapshot = service.create_session_snapshot("s1", &portfolio).unwrap();
        assert!(service.verify_snapshot_hash(&snapshot).unwrap());
        assert_eq!(snapshot.session_id, "s1");

        let drift = service.detect_drift(&snapshot, &portfolio).unwrap();
        assert!(!drift.has_drift);
    }
}
