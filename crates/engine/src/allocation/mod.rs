//! Allocation module - weight vector validation and repair.

mod allocation_model;
mod allocation_validator;

pub use allocation_model::*;
pub use allocation_validator::{
    check_rebalancing_feasibility, enforce_constraints, validate_allocation,
    validate_position_sizing,
};
pub(crate) use allocation_validator::one_sided_turnover;
