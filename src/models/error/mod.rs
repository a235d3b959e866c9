mod amount;
pub use amount::*;

mod distribution;
pub use distribution::*;

mod signer;
pub use signer::*;
