//! Market characteristics and portfolio-level return/risk math.

mod correlation;
mod portfolio_math;
mod portfolio_model;

pub use correlation::CorrelationMatrix;
pub use portfolio_math::*;
pub use portfolio_model::Company;
