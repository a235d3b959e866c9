use core::time::Duration;
use serde::{Deserialize, Serialize};
use strum::Display;
use thiserror::Error;

use super::Network;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown Solana network: {0}")]
pub struct UnknownNetworkError(pub String);

/// Solana clusters a distribution can target.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum SolanaNetwork {
    MainnetBeta,
    #[default]
    Devnet,
    Testnet,
}

impl SolanaNetwork {
    pub fn from_network_str(network: &str) -> Result<Self, UnknownNetworkError> {
        match network.trim().to_lowercase().as_str() {
            "mainnet-beta" | "mainnet" => Ok(SolanaNetwork::MainnetBeta),
            "devnet" => Ok(SolanaNetwork::Devnet),
            "testnet" => Ok(SolanaNetwork::Testnet),
            _ => Err(UnknownNetworkError(network.to_string())),
        }
    }

    /// First public RPC endpoint, used when no override is configured.
    pub fn default_rpc_url(&self) -> &'static str {
        self.public_rpc_urls()[0]
    }

    /// Explorer link for a transaction signature.
    pub fn explorer_tx_url(&self, signature: &str) -> String {
        let base = self.explorer_urls()[0];
        match self {
            SolanaNetwork::MainnetBeta => format!("{}/tx/{}", base, signature),
            other => format!("{}/tx/{}?cluster={}", base, signature, other),
        }
    }
}

impl Network for SolanaNetwork {
    fn average_blocktime(&self) -> Option<Duration> {
        Some(Duration::from_millis(400))
    }

    fn public_rpc_urls(&self) -> &'static [&'static str] {
        match self {
            SolanaNetwork::MainnetBeta => &["https://api.mainnet-beta.solana.com"],
            SolanaNetwork::Devnet => &["https://api.devnet.solana.com"],
            SolanaNetwork::Testnet => &["https://api.testnet.solana.com"],
        }
    }

    fn explorer_urls(&self) -> &'static [&'static str] {
        &["https://explorer.solana.com"]
    }

    fn requires_platform_fee(&self) -> bool {
        matches!(self, SolanaNetwork::MainnetBeta)
    }
}
