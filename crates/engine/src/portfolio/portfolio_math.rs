use super::CorrelationMatrix;
use crate::constants::WEIGHT_SUM_TOLERANCE;
use crate::errors::{ensure_len, Result, ValidationError};

/// Rounds `value` to `decimals` places, half away from zero.
///
/// Negative zero is folded into positive zero so rounded values serialize
/// identically.
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor + 0.0
}

pub fn weight_sum(weights: &[f64]) -> f64 {
    weights.iter().sum()
}

/// True when weights sum to 1.0 within the standard tolerance.
pub fn weights_sum_to_one(weights: &[f64]) -> bool {
    (weight_sum(weights) - 1.0).abs() <= WEIGHT_SUM_TOLERANCE
}

/// Herfindahl-Hirschman concentration index, `Σ wᵢ²`.
pub fn herfindahl_index(weights: &[f64]) -> f64 {
    weights.iter().map(|w| w * w).sum()
}

/// Scales weights so they sum to exactly 1.0.
pub fn normalize_weights(weights: &[f64]) -> Result<Vec<f64>> {
    let sum = weight_sum(weights);
    if !sum.is_finite() || sum <= 0.0 {
        return Err(ValidationError::invalid_input(format!(
            "cannot normalize weights with sum {sum}"
        ))
        .into());
    }
    Ok(weights.iter().map(|w| w / sum).collect())
}

/// Weighted expected return, in the unit of `returns` (percent in, percent out).
pub fn portfolio_expected_return(weights: &[f64], returns: &[f64]) -> Result<f64> {
    ensure_len("expected returns", weights.len(), returns.len())?;
    Ok(weights.iter().zip(returns).map(|(w, r)| w * r).sum())
}

/// Portfolio volatility `√(wᵀ Σ w)` with `Σᵢⱼ = ρᵢⱼ σᵢ σⱼ`.
pub fn portfolio_risk(weights: &[f64], risks: &[f64], correlation: &CorrelationMatrix) -> Result<f64> {
    let n = weights.len();
    ensure_len("risks", n, risks.len())?;
    ensure_len("correlation matrix", n, correlation.size())?;

    let mut variance = 0.0;
    for i in 0..n {
        for j in 0..n {
            variance += weights[i] * weights[j] * risks[i] * risks[j] * correlation.get(i, j);
        }
    }
    Ok(variance.max(0.0).sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(0.1234567, 6), 0.123457);
        assert_eq!(round_to(12.34567, 4), 12.3457);
        assert_eq!(round_to(2.5, 0), 3.0);
        assert!(round_to(-0.00001, 2).is_sign_positive());
    }

    #[test]
    fn test_round_to_is_idempotent() {
        for v in [0.1, 0.333333333, 12.987654321, 99.99995] {
            let once = round_to(v, 4);
            assert_eq!(round_to(once, 4), once);
        }
    }

    #[test]
    fn test_portfolio_risk_uncorrelated() {
        let risk = portfolio_risk(
            &[0.5, 0.5],
            &[20.0, 20.0],
            &CorrelationMatrix::identity(2),
        )
        .unwrap();
        assert!((risk - (200.0f64).sqrt()).abs() < 1e-9);
    }

    #[test]
    fn test_portfolio_risk_perfectly_correlated_is_weighted_average() {
        let corr = CorrelationMatrix::new(vec![vec![1.0, 1.0], vec![1.0, 1.0]]).unwrap();
        let risk = portfolio_risk(&[0.6, 0.4], &[20.0, 30.0], &corr).unwrap();
        assert!((risk - 24.0).abs() < 1e-9);
    }

    #[test]
    fn test_expected_return_and_mismatch() {
        assert!((portfolio_expected_return(&[0.6, 0.4], &[10.0, 5.0]).unwrap() - 8.0).abs() < 1e-12);
        assert!(portfolio_expected_return(&[0.6, 0.4], &[10.0]).is_err());
    }

    #[test]
    fn test_normalize_weights() {
        let w = normalize_weights(&[0.5, 0.3, 0.3]).unwrap();
        assert!((weight_sum(&w) - 1.0).abs() < 1e-12);
        assert!(normalize_weights(&[0.0, 0.0]).is_err());
    }
}
