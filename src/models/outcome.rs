//! Submission, confirmation and per-recipient reporting types.

use serde::Serialize;
use solana_sdk::{pubkey::Pubkey, signature::Signature};
use thiserror::Error;

use super::{AssetDescriptor, RecipientEntry, RowRejection, TokenAmount};

/// Why a batch did not reach confirmation.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
pub enum FailureReason {
    #[error("Confirmation timed out")]
    Timeout,

    #[error("Signer rejected the transaction: {0}")]
    SignerRejected(String),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Transaction failed on chain: {0}")]
    TransactionFailed(String),

    #[error("Invalid transaction: {0}")]
    InvalidTransaction(String),
}

/// Lifecycle of a batch: `Built → Submitted → {Confirmed | Failed | TimedOut}`.
///
/// `NotSubmitted` is terminal for batches skipped by cancellation, and a
/// batch whose submission fails moves straight from `Built` to `Failed`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum BatchState {
    Built,
    Submitted,
    Confirmed,
    Failed(FailureReason),
    TimedOut,
    NotSubmitted,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid batch state transition from {from:?} to {to:?}")]
pub struct InvalidStateTransition {
    pub from: BatchState,
    pub to: BatchState,
}

impl BatchState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            BatchState::Confirmed
                | BatchState::Failed(_)
                | BatchState::TimedOut
                | BatchState::NotSubmitted
        )
    }

    /// Validates and performs a state transition.
    pub fn transition(&self, next: BatchState) -> Result<BatchState, InvalidStateTransition> {
        let allowed = match (self, &next) {
            (BatchState::Built, BatchState::Submitted)
            | (BatchState::Built, BatchState::Failed(_))
            | (BatchState::Built, BatchState::NotSubmitted) => true,
            (BatchState::Submitted, BatchState::Confirmed)
            | (BatchState::Submitted, BatchState::Failed(_))
            | (BatchState::Submitted, BatchState::TimedOut) => true,
            _ => false,
        };

        if allowed {
            Ok(next)
        } else {
            Err(InvalidStateTransition {
                from: self.clone(),
                to: next,
            })
        }
    }
}

/// State of one submitted (or skipped) batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmissionResult {
    pub batch_index: usize,
    #[serde(serialize_with = "crate::utils::serialize_optional_signature")]
    pub signature: Option<Signature>,
    pub state: BatchState,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum RecipientStatus {
    Success,
    Failed(FailureReason),
    NotSubmitted,
}

impl From<&BatchState> for RecipientStatus {
    fn from(state: &BatchState) -> Self {
        match state {
            BatchState::Confirmed => RecipientStatus::Success,
            BatchState::Failed(reason) => RecipientStatus::Failed(reason.clone()),
            BatchState::TimedOut => RecipientStatus::Failed(FailureReason::Timeout),
            // Built/Submitted never survive a completed run; NotSubmitted
            // covers batches skipped by cancellation.
            BatchState::Built | BatchState::Submitted | BatchState::NotSubmitted => {
                RecipientStatus::NotSubmitted
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecipientOutcome {
    pub entry_index: usize,
    #[serde(serialize_with = "crate::utils::serialize_pubkey")]
    pub address: Pubkey,
    pub amount: TokenAmount,
    pub batch_index: usize,
    pub status: RecipientStatus,
}

impl RecipientOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self.status, RecipientStatus::Success)
    }
}

/// Final result of a distribution run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DistributionReport {
    pub asset: AssetDescriptor,
    pub batches: Vec<SubmissionResult>,
    pub outcomes: Vec<RecipientOutcome>,
    pub rejected_rows: Vec<RowRejection>,
}

impl DistributionReport {
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }

    pub fn is_complete_success(&self) -> bool {
        self.failed() == 0
    }

    /// Recipients that did not succeed, ready to be fed into a new run.
    pub fn failed_recipients(&self) -> Vec<RecipientEntry> {
        self.outcomes
            .iter()
            .filter(|o| !o.is_success())
            .map(|o| RecipientEntry {
                address: o.address,
                amount: o.amount,
            })
            .collect()
    }
}
