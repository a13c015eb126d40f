//! Validation reports shared by the guardrails and the allocation validator.
//!
//! A check emits [`ValidationIssue`]s. `Error` and `Critical` issues land in
//! `ValidationReport::errors`, `Info` and `Warning` in `warnings`. Only
//! `Critical` issues block rendering.

mod validation_model;

pub use validation_model::{IssueCode, Severity, ValidationIssue, ValidationReport};
