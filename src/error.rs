use thiserror::Error;

/// Errors raised while building billing periods or estimating a home's
/// balance point and UA.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum HeatLossError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error(
        "Billing period {period} has no heating degree days at balance point {balance_point}°F"
    )]
    ZeroDegreeDayPeriod { period: usize, balance_point: f64 },

    #[error(
        "Balance point {balance_point}°F plus {sensitivity}°F exceeds the set point {set_point}°F"
    )]
    InfeasibleBalancePoint {
        balance_point: f64,
        sensitivity: f64,
        set_point: f64,
    },

    #[error("At least 2 billing periods are required for UA spread, {retained} retained")]
    InsufficientPeriods { retained: usize },

    #[error("Balance point search did not settle within {max_steps} steps")]
    SearchLimitExceeded { max_steps: usize },
}

pub type Result<T> = std::result::Result<T, HeatLossError>;

impl From<validator::ValidationErrors> for HeatLossError {
    fn from(errors: validator::ValidationErrors) -> Self {
        HeatLossError::InvalidInput(errors.to_string())
    }
}
