//! Submission and confirmation of transaction batches.
//!
//! The coordinator talks to the network only through [`BroadcasterTrait`]:
//! one call authorizes and sends a batch, another waits for it to land.
use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use serde::Serialize;
use solana_sdk::signature::Signature;
use std::time::Duration;
use thiserror::Error;

use crate::{
    models::{FailureReason, SignerError, TransactionBatch},
    services::provider::SolanaProviderError,
};

mod solana;
pub use solana::*;

#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
pub enum BroadcastError {
    #[error("Signer rejected the transaction: {0}")]
    SignerRejected(String),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Invalid transaction: {0}")]
    InvalidTransaction(String),
}

impl From<SignerError> for BroadcastError {
    fn from(error: SignerError) -> Self {
        BroadcastError::SignerRejected(error.to_string())
    }
}

impl From<SolanaProviderError> for BroadcastError {
    fn from(error: SolanaProviderError) -> Self {
        match error {
            SolanaProviderError::InvalidTransaction(_)
            | SolanaProviderError::InsufficientFunds(_)
            | SolanaProviderError::AlreadyProcessed(_)
            | SolanaProviderError::InvalidAddress(_) => {
                BroadcastError::InvalidTransaction(error.to_string())
            }
            other => BroadcastError::NetworkError(other.to_string()),
        }
    }
}

impl From<BroadcastError> for FailureReason {
    fn from(error: BroadcastError) -> Self {
        match error {
            BroadcastError::SignerRejected(msg) => FailureReason::SignerRejected(msg),
            BroadcastError::NetworkError(msg) => FailureReason::NetworkError(msg),
            BroadcastError::InvalidTransaction(msg) => FailureReason::InvalidTransaction(msg),
        }
    }
}

/// Final word on a submitted transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ConfirmationOutcome {
    Confirmed,
    /// Landed on chain but failed to execute.
    Failed(String),
    TimedOut,
}

#[async_trait]
#[cfg_attr(test, automock)]
pub trait BroadcasterTrait: Send + Sync {
    /// Signs the batch with the funding identity and submits it.
    async fn authorize_and_send(&self, batch: &TransactionBatch)
        -> Result<Signature, BroadcastError>;

    /// Waits up to `timeout` for `signature` to reach the configured commitment.
    async fn await_confirmation(
        &self,
        signature: &Signature,
        timeout: Duration,
    ) -> ConfirmationOutcome;
}
