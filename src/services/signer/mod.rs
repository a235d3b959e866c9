//! Signing identities.

pub mod solana;
pub use solana::*;
