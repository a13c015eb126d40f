/// Tolerance for a weight vector summing to 1.0
pub const WEIGHT_SUM_TOLERANCE: f64 = 1e-3;

/// Default maximum single position (40%)
pub const DEFAULT_MAX_POSITION: f64 = 0.40;

/// Default dust threshold (1%)
pub const DEFAULT_MIN_POSITION: f64 = 0.01;

/// Default maximum number of non-zero positions
pub const DEFAULT_MAX_POSITIONS: usize = 50;

/// Herfindahl-Hirschman index above which a portfolio counts as concentrated
pub const HIGH_CONCENTRATION_HHI: f64 = 0.25;

/// Rebalancing cost (percent of portfolio) below which rebalancing is advised immediately
pub const REBALANCE_NOW_COST_PERCENT: f64 = 0.1;

/// Rebalancing cost (percent of portfolio) up to which rebalancing is worth considering
pub const REBALANCE_CONSIDER_COST_PERCENT: f64 = 0.5;

/// Monte Carlo path counts
pub const DRIFT_PATHS: usize = 2_000;
pub const REBALANCING_PATHS: usize = 5_000;
pub const DCA_PATHS: usize = 5_000;
pub const PANIC_SELLING_PATHS: usize = 3_000;
pub const THRESHOLD_PATHS: usize = 1_000;

/// Default transaction cost in basis points
pub const DEFAULT_TRANSACTION_COST_BPS: f64 = 5.0;

/// Annual risk-free rate used for Sharpe ratios
pub const DEFAULT_RISK_FREE_RATE: f64 = 0.02;

/// Drawdown from the initial value that triggers a panic sale
pub const PANIC_DRAWDOWN_TRIGGER: f64 = 0.20;

/// Months spent in cash after a panic sale
pub const PANIC_CASH_MONTHS: u32 = 6;

/// Starting value of each buy-and-hold / panic-selling path
pub const PANIC_INITIAL_VALUE: f64 = 10_000.0;

/// Candidate drift thresholds (percent) for threshold rebalancing
pub const REBALANCING_THRESHOLDS: [f64; 5] = [5.0, 10.0, 15.0, 20.0, 25.0];

/// Horizon (years) for threshold rebalancing simulations
pub const THRESHOLD_HORIZON_YEARS: u32 = 10;

/// Default tolerance when comparing recalculated metrics
pub const DEFAULT_CONSISTENCY_TOLERANCE: f64 = 0.01;

/// Relative weight change that counts as drift (5%)
pub const DEFAULT_DRIFT_THRESHOLD: f64 = 0.05;

/// Rounding precision for snapshot inputs
pub const WEIGHT_DECIMALS: u32 = 6;
pub const RETURN_RISK_DECIMALS: u32 = 4;
pub const CORRELATION_DECIMALS: u32 = 4;

/// Share of drawdown (percent) above which an asset is a top contributor
pub const DEFAULT_TOP_CONTRIBUTOR_THRESHOLD: f64 = 10.0;

/// Top-3 drawdown share (percent) thresholds for tail risk concentration
pub const TAIL_RISK_HIGH_SHARE: f64 = 70.0;
pub const TAIL_RISK_MEDIUM_SHARE: f64 = 50.0;

/// Worst-case drawdown multiplier applied to the riskiest asset
pub const WORST_CASE_DRAWDOWN_MULTIPLIER: f64 = 1.5;

/// Volatility penalty applied to recovery time estimates
pub const RECOVERY_VOLATILITY_PENALTY: f64 = 0.3;

/// Pessimistic multiplier on the stochastic recovery estimate
pub const RECOVERY_PESSIMISTIC_MULTIPLIER: f64 = 1.5;
