//! Solana-specific building blocks shared by the distribution pipeline:
//! token program dispatch and instruction compilation.

mod token;
pub use token::*;

mod instructions;
pub use instructions::*;
