//! Core domain logic: the distribution pipeline and the Solana-specific
//! pieces it compiles down to.

pub mod solana;
pub use solana::*;

pub mod distribution;
pub use distribution::*;
