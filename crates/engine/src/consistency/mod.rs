//! Consistency module - session snapshots, drift detection and the metric registry.

mod consistency_model;
mod metric_registry;
mod snapshot;

pub use consistency_model::*;
pub use metric_registry::MetricRegistry;
pub use snapshot::{
    apply_consistency_adjustments, create_session_snapshot, create_session_snapshot_with_id,
    detect_drift, verify_consistency, verify_snapshot_hash,
};

#[cfg(test)]
mod snapshot_tests;
