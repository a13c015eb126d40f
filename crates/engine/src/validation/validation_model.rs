use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// =============================================================================
// Severity
// =============================================================================

/// Severity levels for validation issues.
///
/// Ordered from lowest to highest: Info < Warning < Error < Critical.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    #[default]
    Info,
    Warning,
    Error,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "INFO",
            Severity::Warning => "WARNING",
            Severity::Error => "ERROR",
            Severity::Critical => "CRITICAL",
        }
    }

    /// Error and Critical issues invalidate a report.
    pub fn is_error(&self) -> bool {
        *self >= Severity::Error
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// =============================================================================
// Issue Code
// =============================================================================

/// Stable machine-readable identifier of a check outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueCode {
    // Goal analysis
    InvalidTargetAmount,
    InvalidCurrentAllocation,
    InvalidPortfolioValue,
    InvalidProgressPercent,
    ProgressFragmentation,
    ProgressFormulaMismatch,
    GoalExceeded,
    RecommendationSum,

    // Allocation
    SumConstraint,
    NegativeWeight,
    NonFiniteWeight,
    MaxPosition,
    DustPosition,
    MaxPositions,
    HighConcentration,
}

impl IssueCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueCode::InvalidTargetAmount => "invalid_target_amount",
            IssueCode::InvalidCurrentAllocation => "invalid_current_allocation",
            IssueCode::InvalidPortfolioValue => "invalid_portfolio_value",
            IssueCode::InvalidProgressPercent => "invalid_progress_percent",
            IssueCode::ProgressFragmentation => "progress_fragmentation",
            IssueCode::ProgressFormulaMismatch => "progress_formula_mismatch",
            IssueCode::GoalExceeded => "goal_exceeded",
            IssueCode::RecommendationSum => "recommendation_sum",
            IssueCode::SumConstraint => "sum_constraint",
            IssueCode::NegativeWeight => "negative_weight",
            IssueCode::NonFiniteWeight => "non_finite_weight",
            IssueCode::MaxPosition => "max_position",
            IssueCode::DustPosition => "dust_position",
            IssueCode::MaxPositions => "max_positions",
            IssueCode::HighConcentration => "high_concentration",
        }
    }
}

impl std::fmt::Display for IssueCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// =============================================================================
// Validation Issue
// =============================================================================

/// A single finding produced by a check.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ValidationIssue {
    pub code: IssueCode,
    pub severity: Severity,
    /// Human-readable explanation
    pub message: String,
    /// Index of the offending asset, for per-position allocation findings
    #[serde(skip_serializing_if = "Option::is_none")]
    pub asset_index: Option<usize>,
}

impl ValidationIssue {
    pub fn new(code: IssueCode, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            code,
            severity,
            message: message.into(),
            asset_index: None,
        }
    }

    pub fn critical(code: IssueCode, message: impl Into<String>) -> Self {
        Self::new(code, Severity::Critical, message)
    }

    pub fn error(code: IssueCode, message: impl Into<String>) -> Self {
        Self::new(code, Severity::Error, message)
    }

    pub fn warning(code: IssueCode, message: impl Into<String>) -> Self {
        Self::new(code, Severity::Warning, message)
    }

    pub fn info(code: IssueCode, message: impl Into<String>) -> Self {
        Self::new(code, Severity::Info, message)
    }

    pub fn for_asset(mut self, index: usize) -> Self {
        self.asset_index = Some(index);
        self
    }
}

// =============================================================================
// Validation Report
// =============================================================================

/// Aggregated outcome of a set of independent checks.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    /// True when no Error or Critical issue was found
    pub is_valid: bool,
    pub errors: Vec<ValidationIssue>,
    pub warnings: Vec<ValidationIssue>,
}

impl ValidationReport {
    /// Creates a report without findings.
    pub fn valid() -> Self {
        Self {
            is_valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Splits issues into errors and warnings by severity.
    pub fn from_issues(issues: Vec<ValidationIssue>) -> Self {
        let (errors, warnings): (Vec<_>, Vec<_>) =
            issues.into_iter().partition(|i| i.severity.is_error());
        Self {
            is_valid: errors.is_empty(),
            errors,
            warnings,
        }
    }

    /// Highest severity across all findings, `None` for a clean report.
    pub fn highest_severity(&self) -> Option<Severity> {
        self.errors
            .iter()
            .chain(self.warnings.iter())
            .map(|i| i.severity)
            .max()
    }

    pub fn has_critical(&self) -> bool {
        self.errors.iter().any(|i| i.severity == Severity::Critical)
    }

    /// True if any finding (error or warning) carries `code`.
    pub fn has_code(&self, code: IssueCode) -> bool {
        self.errors
            .iter()
            .chain(self.warnings.iter())
            .any(|i| i.code == code)
    }

    /// Count of findings at each severity level.
    pub fn issue_counts(&self) -> HashMap<Severity, u32> {
        let mut counts = HashMap::new();
        for issue in self.errors.iter().chain(self.warnings.iter()) {
            *counts.entry(issue.severity).or_insert(0) += 1;
        }
        counts
    }
}
