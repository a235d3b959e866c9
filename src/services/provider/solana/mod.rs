//! Solana Provider Module
//!
//! Thin asynchronous wrapper over the non-blocking `RpcClient` exposing the
//! reads and writes a distribution needs: account lookups, the latest
//! blockhash, transaction submission and signature status.
//!
//! There is a single endpoint per provider and no retry layer.
use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use reqwest::Url;
use serde::Serialize;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_sdk::{
    account::Account, commitment_config::CommitmentConfig, hash::Hash, pubkey::Pubkey,
    signature::Signature, transaction::Transaction,
};
use std::time::Duration;

mod error;
pub use error::*;

/// Where a submitted transaction stands on the cluster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum SolanaTransactionStatus {
    Processed,
    Confirmed,
    Finalized,
    /// Landed but execution failed.
    Failed(String),
}

impl SolanaTransactionStatus {
    /// Whether the transaction has landed successfully at `commitment`.
    pub fn satisfies(&self, commitment: CommitmentConfig) -> bool {
        match self {
            SolanaTransactionStatus::Finalized => true,
            SolanaTransactionStatus::Confirmed => !commitment.is_finalized(),
            SolanaTransactionStatus::Processed => {
                !commitment.is_finalized() && !commitment.is_confirmed()
            }
            SolanaTransactionStatus::Failed(_) => false,
        }
    }
}

/// Ledger access used by the asset resolver, the existence oracle and the
/// broadcaster.
#[async_trait]
#[cfg_attr(test, automock)]
pub trait SolanaProviderTrait: Send + Sync {
    /// Fetches an account, `None` when it does not exist.
    async fn get_account(&self, pubkey: &Pubkey) -> Result<Option<Account>, SolanaProviderError>;

    async fn account_exists(&self, pubkey: &Pubkey) -> Result<bool, SolanaProviderError>;

    async fn get_latest_blockhash(&self) -> Result<Hash, SolanaProviderError>;

    /// Submits a signed transaction, returning its signature.
    async fn send_transaction(
        &self,
        transaction: &Transaction,
    ) -> Result<Signature, SolanaProviderError>;

    /// Status of a signature; `None` while the cluster has not seen it.
    async fn get_transaction_status(
        &self,
        signature: &Signature,
    ) -> Result<Option<SolanaTransactionStatus>, SolanaProviderError>;
}

pub struct SolanaProvider {
    client: RpcClient,
    commitment: CommitmentConfig,
}

impl std::fmt::Debug for SolanaProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SolanaProvider")
            .field("url", &self.client.url())
            .field("commitment", &self.commitment)
            .finish()
    }
}

impl SolanaProvider {
    pub fn new(
        url: &str,
        timeout_seconds: u64,
        commitment: CommitmentConfig,
    ) -> Result<Self, SolanaProviderError> {
        let rpc_url: Url = url.parse().map_err(|e| {
            SolanaProviderError::NetworkConfiguration(format!("Invalid URL format: {e}"))
        })?;

        let client = RpcClient::new_with_timeout_and_commitment(
            rpc_url.to_string(),
            Duration::from_secs(timeout_seconds),
            commitment,
        );

        Ok(Self { client, commitment })
    }

    pub fn commitment(&self) -> CommitmentConfig {
        self.commitment
    }
}

#[async_trait]
impl SolanaProviderTrait for SolanaProvider {
    async fn get_account(&self, pubkey: &Pubkey) -> Result<Option<Account>, SolanaProviderError> {
        let response = self
            .client
            .get_account_with_commitment(pubkey, self.commitment)
            .await
            .map_err(SolanaProviderError::from_rpc_error)?;
        Ok(response.value)
    }

    async fn account_exists(&self, pubkey: &Pubkey) -> Result<bool, SolanaProviderError> {
        Ok(self.get_account(pubkey).await?.is_some())
    }

    async fn get_latest_blockhash(&self) -> Result<Hash, SolanaProviderError> {
        self.client
            .get_latest_blockhash_with_commitment(self.commitment)
            .await
            .map(|(blockhash, _last_valid_block_height)| blockhash)
            .map_err(SolanaProviderError::from_rpc_error)
    }

    async fn send_transaction(
        &self,
        transaction: &Transaction,
    ) -> Result<Signature, SolanaProviderError> {
        self.client
            .send_transaction(transaction)
            .await
            .map_err(SolanaProviderError::from_rpc_error)
    }

    async fn get_transaction_status(
        &self,
        signature: &Signature,
    ) -> Result<Option<SolanaTransactionStatus>, SolanaProviderError> {
        let response = self
            .client
            .get_signature_statuses(&[*signature])
            .await
            .map_err(SolanaProviderError::from_rpc_error)?;

        let status = match response.value.into_iter().next().flatten() {
            Some(status) => status,
            None => return Ok(None),
        };

        let status = if let Some(err) = &status.err {
            SolanaTransactionStatus::Failed(err.to_string())
        } else if status.satisfies_commitment(CommitmentConfig::finalized()) {
            SolanaTransactionStatus::Finalized
        } else if status.satisfies_commitment(CommitmentConfig::confirmed()) {
            SolanaTransactionStatus::Confirmed
        } else {
            SolanaTransactionStatus::Processed
        };
        Ok(Some(status))
    }
}
