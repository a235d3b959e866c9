//! Constants for Solana transaction processing.
//!
//! This module contains default values used when submitting and confirming
//! distribution transactions, including size limits and confirmation timing.

/// Maximum serialized size of a legacy transaction (the packet data size)
pub const SOLANA_MAX_TRANSACTION_BYTES: usize = 1232;

/// Default time to wait for a single batch to reach the target commitment
pub const DEFAULT_CONFIRMATION_TIMEOUT_SECONDS: u64 = 60;

/// Default delay between two signature status polls
pub const DEFAULT_CONFIRMATION_POLL_INTERVAL_MS: u64 = 500;

/// Default timeout for a single RPC request
pub const DEFAULT_RPC_TIMEOUT_SECONDS: u64 = 30;

