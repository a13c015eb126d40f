use serde::{Deserialize, Serialize};

/// Market characteristics of one asset, supplied by the host application.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub symbol: String,
    /// Expected annual return in percent (8.0 = 8%)
    pub expected_return: f64,
    /// Annualized volatility in percent
    pub risk: f64,
    pub beta: f64,
    pub sector: String,
}

impl Company {
    pub fn new(
        symbol: impl Into<String>,
        expected_return: f64,
        risk: f64,
        beta: f64,
        sector: impl Into<String>,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            expected_return,
            risk,
            beta,
            sector: sector.into(),
        }
    }

    /// Mean monthly return as a fraction.
    pub fn monthly_return(&self) -> f64 {
        self.expected_return / 100.0 / 12.0
    }

    /// Monthly volatility as a fraction.
    pub fn monthly_volatility(&self) -> f64 {
        self.risk / 100.0 / 12f64.sqrt()
    }
}
