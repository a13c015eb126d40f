//! Per-session registry that pins the first value computed for each metric.

use chrono::Utc;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use log::warn;

use super::consistency_model::{EnforcedMetric, RegisteredMetric};
use crate::constants::DEFAULT_CONSISTENCY_TOLERANCE;
use crate::errors::{ensure_finite, Result};

/// Keeps a metric (for example `risk_AAPL`) from showing two different
/// values within one session.
///
/// Entries are keyed by `(session_id, metric_key)`. Registration and
/// comparison go through `DashMap::entry`, which holds the shard lock for the
/// whole read-modify-write, so concurrent callers never lose an update.
#[derive(Debug)]
pub struct MetricRegistry {
    metrics: DashMap<(String, String), RegisteredMetric>,
    tolerance: f64,
}

impl Default for MetricRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_CONSISTENCY_TOLERANCE)
    }
}

impl MetricRegistry {
    pub fn new(tolerance: f64) -> Self {
        Self {
            metrics: DashMap::new(),
            tolerance,
        }
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// Records `value` unless the key is already registered; returns the
    /// registered entry either way.
    pub fn register_metric(&self, session_id: &str, key: &str, value: f64) -> Result<RegisteredMetric> {
        ensure_finite(key, &[value])?;
        let entry = self
            .metrics
            .entry((session_id.to_string(), key.to_string()))
            .or_insert_with(|| RegisteredMetric {
                key: key.to_string(),
                value,
                registered_at: Utc::now(),
            });
        Ok(entry.value().clone())
    }

    pub fn get_registered_metric(&self, session_id: &str, key: &str) -> Option<RegisteredMetric> {
        self.metrics
            .get(&(session_id.to_string(), key.to_string()))
            .map(|entry| entry.value().clone())
    }

    /// Returns the value to display for `key`.
    ///
    /// The first call registers `value`. Later values within tolerance pass
    /// through unchanged; values further away are replaced by the registered
    /// one and flagged.
    pub fn enforce_consistency(&self, session_id: &str, key: &str, value: f64) -> Result<EnforcedMetric> {
        ensure_finite(key, &[value])?;

        match self.metrics.entry((session_id.to_string(), key.to_string())) {
            Entry::Vacant(vacant) => {
                vacant.insert(RegisteredMetric {
                    key: key.to_string(),
                    value,
                    registered_at: Utc::now(),
                });
                Ok(EnforcedMetric {
                    value,
                    original_value: value,
                    was_adjusted: false,
                    reason: None,
                })
            }
            Entry::Occupied(occupied) => {
                let registered = occupied.get().value;
                let difference = (value - registered).abs();
                if difference <= self.tolerance {
                    return Ok(EnforcedMetric {
                        value,
                        original_value: value,
                        was_adjusted: false,
                        reason: None,
                    });
                }

                let reason = format!(
                    "{key} was {value:.4} but {registered:.4} was already shown in this session (difference {difference:.4})"
                );
                warn!("Session {}: {}", session_id, reason);
                Ok(EnforcedMetric {
                    value: registered,
                    original_value: value,
                    was_adjusted: true,
                    reason: Some(reason),
                })
            }
        }
    }

    /// Drops every metric registered for `session_id`, returning how many were removed.
    pub fn clear_session(&self, session_id: &str) -> usize {
        let before = self.metrics.len();
        self.metrics.retain(|(session, _), _| session != session_id);
        before.saturating_sub(self.metrics.len())
    }

    pub fn len(&self) -> usize {
        self.metrics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_first_registration_wins() {
        let registry = MetricRegistry::default();
        let first = registry.register_metric("s1", "risk_AAPL", 18.5).unwrap();
        let second = registry.register_metric("s1", "risk_AAPL", 22.0).unwrap();

        assert_eq!(first.value, 18.5);
        assert_eq!(second.value, 18.5);
        assert_eq!(registry.get_registered_metric("s1", "risk_AAPL").unwrap().value, 18.5);
        assert!(registry.get_registered_metric("s2", "risk_AAPL").is_none());
    }

    #[test]
    fn test_enforce_within_tolerance_passes_through() {
        let registry = MetricRegistry::default();
        registry.enforce_consistency("s1", "return_MSFT", 9.0).unwrap();
        let result = registry.enforce_consistency("s1", "return_MSFT", 9.005).unwrap();

        assert!(!result.was_adjusted);
        assert_eq!(result.value, 9.005);
        assert!(result.reason.is_none());
    }

    #[test]
    fn test_enforce_beyond_tolerance_uses_registered_value() {
        let registry = MetricRegistry::default();
        let first = registry.enforce_consistency("s1", "risk_AAPL", 18.5).unwrap();
        assert!(!first.was_adjusted);

        let result = registry.enforce_consistency("s1", "risk_AAPL", 19.0).unwrap();
        assert!(result.was_adjusted);
        assert_eq!(result.value, 18.5);
        assert_eq!(result.original_value, 19.0);
        assert!(result.reason.unwrap().contains("risk_AAPL"));
    }

    #[test]
    fn test_sessions_are_isolated() {
        let registry = MetricRegistry::default();
        registry.enforce_consistency("s1", "risk_AAPL", 18.5).unwrap();
        let other = registry.enforce_consistency("s2", "risk_AAPL", 30.0).unwrap();
        assert!(!other.was_adjusted);

        assert_eq!(registry.clear_session("s1"), 1);
        assert!(registry.get_registered_metric("s1", "risk_AAPL").is_none());
        assert_eq!(registry.get_registered_metric("s2", "risk_AAPL").unwrap().value, 30.0);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_rejects_non_finite_values() {
        let registry = MetricRegistry::default();
        assert!(registry.register_metric("s1", "risk", f64::NAN).is_err());
        assert!(registry.enforce_consistency("s1", "risk", f64::INFINITY).is_err());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_concurrent_registration_keeps_one_value() {
        let registry = Arc::new(MetricRegistry::default());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let registry = Arc::clone(&registry);
                thread::spawn(move || registry.enforce_consistency("s1", "hhi", f64::from(i)).unwrap())
            })
            .collect();
        let results: Vec<EnforcedMetric> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        let registered = registry.get_registered_metric("s1", "hhi").unwrap().value;
        assert_eq!(results.iter().filter(|r| !r.was_adjusted).count(), 1);
        assert!(results.iter().all(|r| r.value == registered));
    }
}
