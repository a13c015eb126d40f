//! Tests for session snapshots and consistency checks.

#[cfg(test)]
mod tests {
    use crate::consistency::{
        apply_consistency_adjustments, create_session_snapshot, create_session_snapshot_with_id,
        detect_drift, verify_consistency, verify_snapshot_hash, CalculationResults,
        ConsistencyIssueKind, ConsistencySeverity, PortfolioData,
    };
    use crate::errors::{Error, ValidationError};
    use crate::portfolio::CorrelationMatrix;

    fn portfolio() -> PortfolioData {
        PortfolioData::new(
            vec!["AAPL".into(), "MSFT".into(), "BND".into()],
            vec![0.5, 0.3, 0.2],
            vec![10.0, 9.0, 4.0],
            vec![25.0, 22.0, 6.0],
            CorrelationMatrix::new(vec![
                vec![1.0, 0.7, 0.1],
                vec![0.7, 1.0, 0.15],
                vec![0.1, 0.15, 1.0],
            ])
            .unwrap(),
        )
    }

    fn matching_results(snapshot_portfolio: &PortfolioData) -> CalculationResults {
        let adjusted = apply_consistency_adjustments(snapshot_portfolio).unwrap();
        CalculationResults {
            weights: adjusted.portfolio.weights,
            expected_return: adjusted.expected_return,
            risk: adjusted.risk,
        }
    }

    // ==================== Snapshot ====================

    #[test]
    fn test_snapshot_rounds_inputs() {
        let mut data = portfolio();
        data.weights = vec![0.123_456_789, 0.5, 0.376_543_211];
        data.expected_returns = vec![10.123_456, 9.0, 4.0];
        let snapshot = create_session_snapshot(&data).unwrap();

        assert_eq!(snapshot.rounded_inputs.weights[0], 0.123457);
        assert_eq!(snapshot.rounded_inputs.expected_returns[0], 10.1235);
        assert_eq!(snapshot.hash.len(), 64);
        assert!(verify_snapshot_hash(&snapshot).unwrap());
    }

    #[test]
    fn test_hash_ignores_session_and_time() {
        let a = create_session_snapshot_with_id("session-a", &portfolio()).unwrap();
        let b = create_session_snapshot_with_id("session-b", &portfolio()).unwrap();

        assert_ne!(a.session_id, b.session_id);
        assert_eq!(a.hash, b.hash);
    }

    #[test]
    fn test_hash_changes_with_inputs() {
        let a = create_session_snapshot(&portfolio()).unwrap();
        let mut changed = portfolio();
        changed.weights[0] = 0.51;
        let b = create_session_snapshot(&changed).unwrap();
        assert_ne!(a.hash, b.hash);
    }

    #[test]
    fn test_tampered_snapshot_fails_verification() {
        let mut snapshot = create_session_snapshot(&portfolio()).unwrap();
        snapshot.rounded_inputs.risks[2] = 7.0;
        assert!(!verify_snapshot_hash(&snapshot).unwrap());
    }

    #[test]
    fn test_snapshot_rejects_mismatched_lengths() {
        let mut data = portfolio();
        data.risks.pop();
        let err = create_session_snapshot(&data).unwrap_err();
        assert!(matches!(err, Error::Validation(ValidationError::DimensionMismatch { .. })));
    }

    #[test]
    fn test_snapshot_serializes_camel_case() {
        let snapshot = create_session_snapshot(&portfolio()).unwrap();
        let json = serde_json::to_value(&snapshot).unwrap();
        assert!(json.get("sessionId").is_some());
        assert!(json["roundedInputs"].get("expectedReturns").is_some());
    }

    // ==================== Verification ====================

    #[test]
    fn test_matching_results_are_consistent() {
        let data = portfolio();
        let snapshot = create_session_snapshot(&data).unwrap();
        let report = verify_consistency(&matching_results(&data), &snapshot, 0.01).unwrap();

        assert!(report.is_consistent, "{:?}", report.issues);
        assert_eq!(report.snapshot_hash, snapshot.hash);
        assert!(report.highest_severity().is_none());
    }

    #[test]
    fn test_near_symmetric_correlation_rounds_symmetrically() {
        // Off-diagonal pair within the symmetry tolerance but on either side of a rounding boundary.
        let data = PortfolioData::new(
            vec!["AAA".into(), "BBB".into()],
            vec![0.6, 0.4],
            vec![8.0, 5.0],
            vec![18.0, 9.0],
            CorrelationMatrix::new(vec![vec![1.0, 0.12345], vec![0.12345 - 5e-10, 1.0]]).unwrap(),
        );
        let snapshot = create_session_snapshot(&data).unwrap();
        let rounded = &snapshot.rounded_inputs.correlation;

        assert_eq!(rounded[0][1], rounded[1][0]);
        assert_eq!(rounded[0][0], 1.0);
        assert!(CorrelationMatrix::new(rounded.clone()).is_ok());

        let report = verify_consistency(&matching_results(&data), &snapshot, 0.01).unwrap();
        assert!(report.is_consistent, "{:?}", report.issues);
    }

    #[test]
    fn test_bad_weight_sum_is_high_severity() {
        let data = portfolio();
        let snapshot = create_session_snapshot(&data).unwrap();
        let mut results = matching_results(&data);
        results.weights = vec![0.5, 0.3, 0.3];

        let report = verify_consistency(&results, &snapshot, 0.01).unwrap();
        assert!(!report.is_consistent);
        assert_eq!(report.issues[0].kind, ConsistencyIssueKind::WeightSum);
        assert_eq!(report.highest_severity(), Some(ConsistencySeverity::High));
    }

    #[test]
    fn test_return_and_risk_mismatch_are_medium() {
        let data = portfolio();
        let snapshot = create_session_snapshot(&data).unwrap();
        let mut results = matching_results(&data);
        results.expected_return += 0.5;
        results.risk -= 0.02;

        let report = verify_consistency(&results, &snapshot, 0.01).unwrap();
        let kinds: Vec<ConsistencyIssueKind> = report.issues.iter().map(|i| i.kind).collect();
        assert_eq!(
            kinds,
            vec![ConsistencyIssueKind::ReturnMismatch, ConsistencyIssueKind::RiskMismatch]
        );
        assert_eq!(report.highest_severity(), Some(ConsistencySeverity::Medium));
    }

    #[test]
    fn test_verification_rejects_nan_results() {
        let data = portfolio();
        let snapshot = create_session_snapshot(&data).unwrap();
        let mut results = matching_results(&data);
        results.risk = f64::NAN;
        assert!(verify_consistency(&results, &snapshot, 0.01).is_err());
    }

    // ==================== Drift ====================

    #[test]
    fn test_small_relative_moves_are_not_drift() {
        let snapshot = create_session_snapshot(&portfolio()).unwrap();
        let mut current = portfolio();
        current.weights = vec![0.51, 0.295, 0.195];

        let report = detect_drift(&snapshot, &current, 0.05).unwrap();
        assert!(!report.has_drift, "{:?}", report.drifted_assets);
    }

    #[test]
    fn test_relative_drift_is_flagged() {
        let snapshot = create_session_snapshot(&portfolio()).unwrap();
        let mut current = portfolio();
        // BND 0.2 -> 0.23 is +15% relative.
        current.weights = vec![0.47, 0.3, 0.23];

        let report = detect_drift(&snapshot, &current, 0.05).unwrap();
        let symbols: Vec<&str> = report.drifted_assets.iter().map(|d| d.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["AAPL", "BND"]);
        let bnd = &report.drifted_assets[1];
        assert!((bnd.relative_change.unwrap() - 0.15).abs() < 1e-9);
    }

    #[test]
    fn test_added_and_removed_assets_drift() {
        let snapshot = create_session_snapshot(&portfolio()).unwrap();
        let current = PortfolioData::new(
            vec!["AAPL".into(), "MSFT".into(), "GLD".into()],
            vec![0.5, 0.3, 0.2],
            vec![10.0, 9.0, 3.0],
            vec![25.0, 22.0, 15.0],
            CorrelationMatrix::identity(3),
        );

        let report = detect_drift(&snapshot, &current, 0.05).unwrap();
        let bnd = report.drifted_assets.iter().find(|d| d.symbol == "BND").unwrap();
        assert_eq!(bnd.current_weight, 0.0);
        assert_eq!(bnd.relative_change, Some(-1.0));
        let gld = report.drifted_assets.iter().find(|d| d.symbol == "GLD").unwrap();
        assert_eq!(gld.relative_change, None);
    }

    // ==================== Adjustments ====================

    #[test]
    fn test_adjustment_renormalizes_and_recomputes() {
        let mut data = portfolio();
        data.weights = vec![0.55, 0.33, 0.22];
        let adjusted = apply_consistency_adjustments(&data).unwrap();

        let sum: f64 = adjusted.portfolio.weights.iter().sum();
        assert!((sum - 1.0).abs() < 1e-12);
        assert!(adjusted.adjusted);
        assert!((adjusted.expected_return - (0.5 * 10.0 + 0.3 * 9.0 + 0.2 * 4.0)).abs() < 1e-9);
        assert!(adjusted.risk > 0.0 && adjusted.risk < 25.0);
    }

    #[test]
    fn test_adjustment_propagates_zero_weights_error() {
        let mut data = portfolio();
        data.weights = vec![0.0, 0.0, 0.0];
        assert!(apply_consistency_adjustments(&data).is_err());
    }
}
