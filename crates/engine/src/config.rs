//! Engine configuration.
//!
//! Every threshold the engine applies has a default in `constants.rs`. Hosts
//! may override any subset by loading a JSON document; omitted fields keep
//! their defaults.

use serde::{Deserialize, Serialize};

use crate::allocation::AllocationOptions;
use crate::consistency::ConsistencyConfig;
use crate::errors::{Error, Result};
use crate::simulation::SimulationConfig;

/// Top-level configuration for an [`EngineService`](crate::service::EngineService).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineConfig {
    /// Position caps and diversification limits
    pub allocation: AllocationOptions,

    /// Path counts, costs and risk-free rate for Monte Carlo routines
    pub simulation: SimulationConfig,

    /// Tolerances for snapshot verification and the metric registry
    pub consistency: ConsistencyConfig,
}

impl EngineConfig {
    /// Parses a (possibly partial) JSON configuration and validates it.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: EngineConfig = serde_json::from_str(json)
            .map_err(|e| Error::InvalidConfigValue(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects values no calculation can run with.
    pub fn validate(&self) -> Result<()> {
        let a = &self.allocation;
        if !(0.0..=1.0).contains(&a.max_position) || !(0.0..=1.0).contains(&a.min_position) {
            return Err(Error::InvalidConfigValue(
                "position limits must lie within [0, 1]".to_string(),
            ));
        }
        if a.min_position > a.max_position {
            return Err(Error::InvalidConfigValue(format!(
                "minPosition ({}) exceeds maxPosition ({})",
                a.min_position, a.max_position
            )));
        }
        if a.max_positions == 0 {
            return Err(Error::InvalidConfigValue(
                "maxPositions must be at least 1".to_string(),
            ));
        }

        let s = &self.simulation;
        let counts = [
            ("driftPaths", s.drift_paths),
            ("rebalancingPaths", s.rebalancing_paths),
            ("dcaPaths", s.dca_paths),
            ("panicSellingPaths", s.panic_selling_paths),
            ("thresholdPaths", s.threshold_paths),
        ];
        if let Some((name, _)) = counts.iter().find(|(_, n)| *n == 0) {
            return Err(Error::InvalidConfigValue(format!("{name} must be positive")));
        }
        if !s.transaction_cost_bps.is_finite() || s.transaction_cost_bps < 0.0 {
            return Err(Error::InvalidConfigValue(
                "transactionCostBps must be a non-negative number".to_string(),
            ));
        }
        if !s.risk_free_rate.is_finite() {
            return Err(Error::InvalidConfigValue(
                "riskFreeRate must be finite".to_string(),
            ));
        }

        let c = &self.consistency;
        if !(c.tolerance.is_finite() && c.tolerance >= 0.0)
            || !(c.drift_threshold.is_finite() && c.drift_threshold >= 0.0)
            || !(c.registry_tolerance.is_finite() && c.registry_tolerance >= 0.0)
        {
            return Err(Error::InvalidConfigValue(
                "consistency tolerances must be non-negative numbers".to_string(),
            ));
        }
        Ok(())
    }
}
