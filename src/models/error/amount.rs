use serde::Serialize;
use thiserror::Error;

/// Reasons a display amount cannot be turned into a transferable quantity.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
pub enum AmountError {
    #[error("Amount is empty")]
    Empty,

    #[error("Amount is not a decimal number: {0}")]
    Invalid(String),

    #[error("Amount must be greater than zero: {0}")]
    NonPositive(String),

    #[error("Amount has too many digits: {0}")]
    TooManyDigits(String),

    #[error("Amount {amount} is below the smallest unit for {decimals} decimals")]
    BelowPrecision { amount: String, decimals: u8 },

    #[error("Amount {amount} does not fit in base units for {decimals} decimals")]
    Overflow { amount: String, decimals: u8 },
}
