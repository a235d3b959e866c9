mod distribution;
pub use distribution::*;

mod solana_transaction;
pub use solana_transaction::*;

mod logging;
pub use logging::*;
