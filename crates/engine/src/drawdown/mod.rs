//! Drawdown module - attribution of portfolio drawdown to assets and sectors.

mod drawdown_decomposer;
mod drawdown_model;

pub use drawdown_decomposer::*;
pub use drawdown_model::*;
