//! Deserialization utilities for lamport amounts
//!
//! Accepts a JSON integer (`100000000`), an integer string (`"100000000"`)
//! or a SOL amount with a unit suffix (`"0.1 SOL"`).
use std::fmt;

use serde::{de, Deserializer};

use crate::{constants::SOL_DECIMALS, models::TokenAmount};

#[derive(Debug)]
struct LamportsVisitor;

/// Parses a lamport amount from its textual configuration form.
pub fn parse_lamports(value: &str) -> Result<u64, String> {
    let trimmed = value.trim();
    let sol_amount = trimmed
        .strip_suffix("SOL")
        .or_else(|| trimmed.strip_suffix("sol"));

    match sol_amount {
        Some(amount) => amount
            .trim()
            .parse::<TokenAmount>()
            .and_then(|amount| amount.to_base_units(SOL_DECIMALS))
            .map_err(|e| e.to_string()),
        None => trimmed.parse::<u64>().map_err(|e| e.to_string()),
    }
}

impl de::Visitor<'_> for LamportsVisitor {
    type Value = u64;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a lamport integer, an integer string or a \"<amount> SOL\" string")
    }

    fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        parse_lamports(value).map_err(de::Error::custom)
    }

    fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        Ok(value)
    }

    fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        u64::try_from(value)
            .map_err(|_| de::Error::custom("negative value cannot be converted to lamports"))
    }
}

pub fn deserialize_lamports<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    deserializer.deserialize_any(LamportsVisitor)
}
