use super::simulation_model::PercentileStats;

impl PercentileStats {
    /// Summarises `samples`, sorting them in place.
    ///
    /// Percentiles index the sorted array at `⌊p·n⌋`. An empty slice yields zeros.
    pub fn from_samples(samples: &mut [f64]) -> Self {
        let n = samples.len();
        if n == 0 {
            return Self::default();
        }
        samples.sort_by(|a, b| a.total_cmp(b));

        let at = |p: f64| samples[((p * n as f64).floor() as usize).min(n - 1)];
        Self {
            median: at(0.5),
            p25: at(0.25),
            p75: at(0.75),
            mean: mean(samples),
        }
    }
}

pub(crate) fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (n − 1).
pub(crate) fn std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    let var = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    var.sqrt()
}

/// Annualized Sharpe ratio from monthly returns. Zero when volatility is zero.
pub(crate) fn annualized_sharpe(monthly_returns: &[f64], risk_free_rate: f64) -> f64 {
    let annual_vol = std_dev(monthly_returns) * 12f64.sqrt();
    if annual_vol <= f64::EPSILON {
        return 0.0;
    }
    (mean(monthly_returns) * 12.0 - risk_free_rate) / annual_vol
}

/// Compound annual growth in percent; −100 when the path is wiped out.
pub(crate) fn annualized_return_percent(initial: f64, terminal: f64, months: u32) -> f64 {
    if initial <= 0.0 || terminal <= 0.0 || months == 0 {
        return -100.0;
    }
    ((terminal / initial).powf(12.0 / months as f64) - 1.0) * 100.0
}
