//! Ledger access providers.

pub mod solana;
pub use solana::*;
