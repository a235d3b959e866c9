//! Recipient-side data model: raw rows as typed in by a user, validated
//! entries, and per-recipient resolution results.

use serde::{Deserialize, Serialize};
use solana_sdk::pubkey::Pubkey;
use std::{fmt, str::FromStr};
use thiserror::Error;

use super::AmountError;

/// Number of significant digits a `u128` mantissa can always hold.
const MAX_AMOUNT_DIGITS: usize = 38;

/// An exact, strictly positive decimal amount in display units.
///
/// Stored as `mantissa / 10^scale` with trailing fractional zeros removed,
/// so `"10.50"` and `"10.5"` compare equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TokenAmount {
    mantissa: u128,
    scale: u32,
}

impl TokenAmount {
    pub fn mantissa(&self) -> u128 {
        self.mantissa
    }

    pub fn scale(&self) -> u32 {
        self.scale
    }

    /// Converts the display amount into base units for a mint with
    /// `decimals` decimal places. Fractional digits beyond `decimals` are
    /// truncated.
    pub fn to_base_units(&self, decimals: u8) -> Result<u64, AmountError> {
        let decimals_u32 = u32::from(decimals);
        let scaled = if self.scale <= decimals_u32 {
            10u128
                .checked_pow(decimals_u32 - self.scale)
                .and_then(|factor| self.mantissa.checked_mul(factor))
        } else {
            // scale never exceeds MAX_AMOUNT_DIGITS, so the divisor fits
            Some(self.mantissa / 10u128.pow(self.scale - decimals_u32))
        };

        let base_units = scaled.ok_or_else(|| AmountError::Overflow {
            amount: self.to_string(),
            decimals,
        })?;

        if base_units == 0 {
            return Err(AmountError::BelowPrecision {
                amount: self.to_string(),
                decimals,
            });
        }

        u64::try_from(base_units).map_err(|_| AmountError::Overflow {
            amount: self.to_string(),
            decimals,
        })
    }
}

impl FromStr for TokenAmount {
    type Err = AmountError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(AmountError::Empty);
        }

        let (negative, unsigned) = match trimmed.as_bytes()[0] {
            b'-' => (true, &trimmed[1..]),
            b'+' => (false, &trimmed[1..]),
            _ => (false, trimmed),
        };

        let (int_part, frac_part) = match unsigned.split_once('.') {
            Some((int_part, frac_part)) => (int_part, frac_part),
            None => (unsigned, ""),
        };

        let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
        if (int_part.is_empty() && frac_part.is_empty())
            || !all_digits(int_part)
            || !all_digits(frac_part)
        {
            return Err(AmountError::Invalid(trimmed.to_string()));
        }

        let frac_part = frac_part.trim_end_matches('0');
        let int_part = int_part.trim_start_matches('0');
        if int_part.len() + frac_part.len() > MAX_AMOUNT_DIGITS {
            return Err(AmountError::TooManyDigits(trimmed.to_string()));
        }

        let mantissa = int_part
            .bytes()
            .chain(frac_part.bytes())
            .fold(0u128, |acc, digit| acc * 10 + u128::from(digit - b'0'));

        if negative || mantissa == 0 {
            return Err(AmountError::NonPositive(trimmed.to_string()));
        }

        Ok(Self {
            mantissa,
            scale: frac_part.len() as u32,
        })
    }
}

impl fmt::Display for TokenAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.scale == 0 {
            return write!(f, "{}", self.mantissa);
        }
        let digits = format!("{:0>width$}", self.mantissa, width = self.scale as usize + 1);
        let (int_part, frac_part) = digits.split_at(digits.len() - self.scale as usize);
        write!(f, "{}.{}", int_part, frac_part)
    }
}

impl Serialize for TokenAmount {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

/// An editable, untyped recipient row, as entered in a form or a JSON body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRecipientRow {
    pub address: String,
    pub amount: String,
}

impl RawRecipientRow {
    pub fn new(address: impl Into<String>, amount: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            amount: amount.into(),
        }
    }
}

/// Raw recipient input accepted by the normalizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecipientInput {
    /// Delimited text, one `address,amount` pair per line.
    Text { data: String, has_header: bool },
    /// Pre-structured rows.
    Rows(Vec<RawRecipientRow>),
}

/// A validated recipient. Only the normalizer creates these.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecipientEntry {
    #[serde(serialize_with = "crate::utils::serialize_pubkey")]
    pub address: Pubkey,
    pub amount: TokenAmount,
}

/// Why a raw row was dropped from the distribution.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
pub enum RejectionReason {
    #[error("Recipient address is empty")]
    EmptyAddress,

    #[error("Recipient address is not a valid account: {0}")]
    InvalidAddress(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(#[from] AmountError),

    #[error("Malformed row: {0}")]
    MalformedRow(String),
}

/// A dropped row together with its 1-based position in the input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowRejection {
    pub line: usize,
    pub address: String,
    pub amount: String,
    pub reason: RejectionReason,
}

/// Output of the normalizer: valid entries in input order plus the rows
/// that were dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NormalizedRecipients {
    pub entries: Vec<RecipientEntry>,
    /// 1-based input line of each entry, parallel to `entries`.
    pub lines: Vec<usize>,
    pub rejected: Vec<RowRejection>,
}

impl NormalizedRecipients {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Result of a holding-account existence query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AccountExistence {
    Exists,
    Missing,
    /// The query failed; treated as `Missing` when building instructions.
    Unknown,
}

impl AccountExistence {
    pub fn needs_creation(&self) -> bool {
        !matches!(self, AccountExistence::Exists)
    }
}

/// A recipient ready for instruction building.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecipientResolution {
    /// Index of the entry in the normalized recipient list.
    pub entry_index: usize,
    pub entry: RecipientEntry,
    #[serde(serialize_with = "crate::utils::serialize_pubkey")]
    pub holding_account: Pubkey,
    pub existence: AccountExistence,
    pub base_units: u64,
}
