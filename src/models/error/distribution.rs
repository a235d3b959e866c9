use serde::Serialize;
use thiserror::Error;

use super::SignerError;
use crate::{models::RowRejection, services::provider::SolanaProviderError};

/// Errors that abort a distribution run as a whole.
///
/// Failures scoped to a single batch (signer rejection, network errors while
/// sending, confirmation timeouts) never surface here; they are reported per
/// batch and per recipient in the `DistributionReport`.
#[derive(Error, Debug, Serialize)]
pub enum DistributionError {
    #[error("Invalid asset identifier: {0}")]
    InvalidIdentifier(String),

    #[error("Asset not found: {0}")]
    AssetNotFound(String),

    /// Carries every row that was turned away, so callers can show why.
    #[error(
        "No valid recipients in the distribution list ({} row(s) rejected)",
        rejected.len()
    )]
    EmptyRecipientList { rejected: Vec<RowRejection> },

    #[error("Platform fee is required but no fee recipient is configured")]
    FeeRecipientUnconfigured,

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Distribution was cancelled before submission")]
    Cancelled,

    #[error("Underlying Solana provider error: {0}")]
    UnderlyingSolanaProvider(#[from] SolanaProviderError),

    #[error("Signer error: {0}")]
    Signer(#[from] SignerError),
}

impl DistributionError {
    /// Input and configuration errors are raised before any network call and
    /// will fail again unless the caller changes its request.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            DistributionError::InvalidIdentifier(_)
                | DistributionError::EmptyRecipientList { .. }
                | DistributionError::FeeRecipientUnconfigured
                | DistributionError::InvalidConfiguration(_)
        )
    }
}
