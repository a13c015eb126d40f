//! Portfolio Engine - goal progress, allocation repair, drawdown attribution,
//! Monte Carlo strategy comparison and cross-call consistency.
//!
//! The engine is computation-only: no I/O, no async. Hosts call the free
//! functions in each module directly, or go through [`EngineService`] to
//! apply one configuration, random source and metric registry throughout.

pub mod allocation;
pub mod config;
pub mod consistency;
pub mod constants;
pub mod drawdown;
pub mod errors;
pub mod goals;
pub mod portfolio;
pub mod service;
pub mod simulation;
pub mod validation;

pub use config::EngineConfig;
pub use service::EngineService;

// Re-export error types
pub use errors::Error;
pub use errors::Result;
