//! Default values for distribution runs.
//!
//! These are used whenever the configuration file leaves a field out.

/// Recipients per transaction when nothing else is configured.
pub const DEFAULT_MAX_RECIPIENTS_PER_BATCH: usize = 10;

/// Instruction ceiling per transaction: ten recipients that each need an
/// account created (two instructions) plus the platform fee transfer.
pub const DEFAULT_MAX_INSTRUCTIONS_PER_BATCH: usize = 21;

/// Largest instruction count a single recipient can contribute
/// (account creation followed by the transfer).
pub const MAX_INSTRUCTIONS_PER_RECIPIENT: usize = 2;

/// Default number of holding-account existence queries in flight.
pub const DEFAULT_EXISTENCE_QUERY_CONCURRENCY: usize = 8;

/// Default platform fee: 0.1 SOL in lamports
pub const DEFAULT_PLATFORM_FEE_LAMPORTS: u64 = 100_000_000;

/// Fee address placeholder shipped in templates; treated as "not configured".
pub const PLATFORM_FEE_ADDRESS_PLACEHOLDER: &str = "YOUR_WALLET_ADDRESS_HERE";

/// Highest decimal precision accepted for a mint.
pub const MAX_TOKEN_DECIMALS: u8 = 18;

/// Decimal places of the native asset (lamports per SOL = 10^9).
pub const SOL_DECIMALS: u8 = 9;
