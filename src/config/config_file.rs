//! Distribution configuration file.
//!
//! Loaded from JSON; every field is optional and falls back to the defaults
//! in `crate::constants`. `validate()` enforces the invariants the batch
//! builder relies on.

use serde::{Deserialize, Serialize};
use solana_sdk::{commitment_config::CommitmentConfig, pubkey::Pubkey};
use std::{fs, path::Path, str::FromStr, time::Duration};
use thiserror::Error;

use crate::{
    constants::{
        DEFAULT_CONFIRMATION_POLL_INTERVAL_MS, DEFAULT_CONFIRMATION_TIMEOUT_SECONDS,
        DEFAULT_EXISTENCE_QUERY_CONCURRENCY, DEFAULT_MAX_INSTRUCTIONS_PER_BATCH,
        DEFAULT_MAX_RECIPIENTS_PER_BATCH, DEFAULT_PLATFORM_FEE_LAMPORTS,
        DEFAULT_RPC_TIMEOUT_SECONDS, MAX_INSTRUCTIONS_PER_RECIPIENT,
        PLATFORM_FEE_ADDRESS_PLACEHOLDER, SOLANA_MAX_TRANSACTION_BYTES,
    },
    models::{Network, SolanaNetwork},
    utils::deserialize_lamports,
};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl ConfigError {
    fn invalid(field: &str, reason: impl Into<String>) -> Self {
        ConfigError::InvalidValue {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommitmentLevel {
    Processed,
    #[default]
    Confirmed,
    Finalized,
}

impl CommitmentLevel {
    pub fn to_commitment_config(self) -> CommitmentConfig {
        match self {
            CommitmentLevel::Processed => CommitmentConfig::processed(),
            CommitmentLevel::Confirmed => CommitmentConfig::confirmed(),
            CommitmentLevel::Finalized => CommitmentConfig::finalized(),
        }
    }
}

/// Platform fee charged once per distribution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeeConfig {
    /// Base58 address receiving the fee.
    pub recipient: Option<String>,
    /// Fee in lamports; accepts `"0.1 SOL"` style strings.
    #[serde(deserialize_with = "deserialize_lamports")]
    pub lamports: u64,
    /// Overrides the network default (fee on mainnet-beta only).
    pub enabled: Option<bool>,
}

impl Default for FeeConfig {
    fn default() -> Self {
        Self {
            recipient: None,
            lamports: DEFAULT_PLATFORM_FEE_LAMPORTS,
            enabled: None,
        }
    }
}

impl FeeConfig {
    /// The configured recipient, ignoring blanks and the template placeholder.
    pub fn configured_recipient(&self) -> Option<&str> {
        self.recipient
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty() && *r != PLATFORM_FEE_ADDRESS_PLACEHOLDER)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DistributionConfig {
    pub network: SolanaNetwork,
    /// Overrides the network's public RPC endpoint.
    pub rpc_url: Option<String>,
    pub commitment: CommitmentLevel,
    pub rpc_timeout_seconds: u64,
    pub max_recipients_per_batch: usize,
    pub max_instructions_per_batch: usize,
    /// `null` disables the serialized size check.
    pub max_transaction_bytes: Option<usize>,
    pub confirmation_timeout_seconds: u64,
    pub confirmation_poll_interval_ms: u64,
    pub existence_query_concurrency: usize,
    pub fee: FeeConfig,
}

impl Default for DistributionConfig {
    fn default() -> Self {
        Self {
            network: SolanaNetwork::default(),
            rpc_url: None,
            commitment: CommitmentLevel::default(),
            rpc_timeout_seconds: DEFAULT_RPC_TIMEOUT_SECONDS,
            max_recipients_per_batch: DEFAULT_MAX_RECIPIENTS_PER_BATCH,
            max_instructions_per_batch: DEFAULT_MAX_INSTRUCTIONS_PER_BATCH,
            max_transaction_bytes: Some(SOLANA_MAX_TRANSACTION_BYTES),
            confirmation_timeout_seconds: DEFAULT_CONFIRMATION_TIMEOUT_SECONDS,
            confirmation_poll_interval_ms: DEFAULT_CONFIRMATION_POLL_INTERVAL_MS,
            existence_query_concurrency: DEFAULT_EXISTENCE_QUERY_CONCURRENCY,
            fee: FeeConfig::default(),
        }
    }
}

impl DistributionConfig {
    /// Whether the platform fee applies to runs with this configuration.
    pub fn fee_required(&self) -> bool {
        self.fee.lamports > 0
            && self
                .fee
                .enabled
                .unwrap_or_else(|| self.network.requires_platform_fee())
    }

    pub fn rpc_url(&self) -> String {
        self.rpc_url
            .clone()
            .unwrap_or_else(|| self.network.default_rpc_url().to_string())
    }

    pub fn confirmation_timeout(&self) -> Duration {
        Duration::from_secs(self.confirmation_timeout_seconds)
    }

    pub fn confirmation_poll_interval(&self) -> Duration {
        Duration::from_millis(self.confirmation_poll_interval_ms)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_recipients_per_batch == 0 {
            return Err(ConfigError::invalid(
                "max_recipients_per_batch",
                "must be at least 1",
            ));
        }

        let fee_slot = usize::from(self.fee_required());
        let min_instructions = MAX_INSTRUCTIONS_PER_RECIPIENT + fee_slot;
        if self.max_instructions_per_batch < min_instructions {
            return Err(ConfigError::invalid(
                "max_instructions_per_batch",
                format!(
                    "must be at least {} so a single recipient fits in one transaction",
                    min_instructions
                ),
            ));
        }

        if self.max_transaction_bytes == Some(0) {
            return Err(ConfigError::invalid(
                "max_transaction_bytes",
                "must be positive or null",
            ));
        }
        if self.confirmation_timeout_seconds == 0 {
            return Err(ConfigError::invalid(
                "confirmation_timeout_seconds",
                "must be positive",
            ));
        }
        if self.confirmation_poll_interval_ms == 0 {
            return Err(ConfigError::invalid(
                "confirmation_poll_interval_ms",
                "must be positive",
            ));
        }
        if self.existence_query_concurrency == 0 {
            return Err(ConfigError::invalid(
                "existence_query_concurrency",
                "must be at least 1",
            ));
        }
        if self.rpc_timeout_seconds == 0 {
            return Err(ConfigError::invalid("rpc_timeout_seconds", "must be positive"));
        }

        if let Some(url) = &self.rpc_url {
            reqwest::Url::parse(url)
                .map_err(|e| ConfigError::invalid("rpc_url", format!("{}: {}", url, e)))?;
        }

        if let Some(recipient) = self.fee.configured_recipient() {
            Pubkey::from_str(recipient).map_err(|e| {
                ConfigError::invalid("fee.recipient", format!("{}: {}", recipient, e))
            })?;
        }

        Ok(())
    }
}

/// Reads and validates a configuration file.
pub fn load_config(path: impl AsRef<Path>) -> Result<DistributionConfig, ConfigError> {
    let config_str = fs::read_to_string(path)?;
    let config: DistributionConfig = serde_json::from_str(&config_str)?;
    config.validate()?;
    Ok(config)
}
