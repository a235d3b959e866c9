mod network;
mod solana;

pub use network::*;
pub use solana::*;
