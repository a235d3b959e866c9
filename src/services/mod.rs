//! Services that talk to the outside world: the RPC provider, the signing
//! identity and the broadcaster that combines both.

pub mod broadcaster;
pub mod provider;
pub mod signer;
