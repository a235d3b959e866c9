//! Solana signing identity.
//!
//! The distribution only ever signs with the funding account, so a signer is
//! a public key plus the ability to sign serialized message bytes.
use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use solana_sdk::{pubkey::Pubkey, signature::Signature, transaction::Transaction};

use crate::models::SignerError;

mod local_signer;
pub use local_signer::*;

#[async_trait]
#[cfg_attr(test, automock)]
pub trait SolanaSignTrait: Sync + Send {
    /// Returns the public key of the signer.
    async fn pubkey(&self) -> Result<Pubkey, SignerError>;

    /// Signs raw message bytes.
    async fn sign(&self, message: &[u8]) -> Result<Signature, SignerError>;
}

/// Signs `transaction` with `signer`, placing the signature in the slot that
/// matches the signer's position among the required signers.
pub async fn sign_sdk_transaction<T: SolanaSignTrait + ?Sized>(
    signer: &T,
    mut transaction: Transaction,
) -> Result<(Transaction, Signature), SignerError> {
    let signer_pubkey = signer.pubkey().await?;

    let signer_index = transaction
        .message
        .account_keys
        .iter()
        .position(|key| *key == signer_pubkey)
        .ok_or_else(|| {
            SignerError::SigningError(
                "Signer public key not found in transaction signers".to_string(),
            )
        })?;

    let num_required = usize::from(transaction.message.header.num_required_signatures);
    if signer_index >= num_required {
        return Err(SignerError::SigningError(format!(
            "Signer is not marked as a required signer in the transaction (position {} >= {})",
            signer_index, num_required
        )));
    }

    let signature = signer.sign(&transaction.message_data()).await?;

    transaction
        .signatures
        .resize(num_required, Signature::default());
    transaction.signatures[signer_index] = signature;

    Ok((transaction, signature))
}
