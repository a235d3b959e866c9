use async_trait::async_trait;
use log::{debug, info, warn};
use solana_sdk::{
    commitment_config::CommitmentConfig, message::Message, signature::Signature,
    transaction::Transaction,
};
use std::{sync::Arc, time::Duration};
use tokio::sync::Mutex;

use super::{BroadcastError, BroadcasterTrait, ConfirmationOutcome};
use crate::{
    domain::compile_instructions,
    models::TransactionBatch,
    services::{
        provider::{SolanaProviderTrait, SolanaTransactionStatus},
        signer::{sign_sdk_transaction, SolanaSignTrait},
    },
    utils::poll_until,
};

/// Broadcaster that signs with a [`SolanaSignTrait`] identity and submits
/// through a [`SolanaProviderTrait`].
pub struct SolanaBroadcaster<P, S>
where
    P: SolanaProviderTrait,
    S: SolanaSignTrait,
{
    provider: Arc<P>,
    signer: Arc<S>,
    commitment: CommitmentConfig,
    poll_interval: Duration,
}

impl<P, S> SolanaBroadcaster<P, S>
where
    P: SolanaProviderTrait + 'static,
    S: SolanaSignTrait,
{
    pub fn new(
        provider: Arc<P>,
        signer: Arc<S>,
        commitment: CommitmentConfig,
        poll_interval: Duration,
    ) -> Self {
        Self {
            provider,
            signer,
            commitment,
            poll_interval,
        }
    }

    async fn build_transaction(&self, batch: &TransactionBatch) -> Result<Transaction, BroadcastError> {
        let instructions = compile_instructions(&batch.instructions)
            .map_err(|e| BroadcastError::InvalidTransaction(e.to_string()))?;
        let payer = self.signer.pubkey().await?;
        let blockhash = self.provider.get_latest_blockhash().await?;
        let message = Message::new_with_blockhash(&instructions, Some(&payer), &blockhash);
        Ok(Transaction::new_unsigned(message))
    }
}

#[async_trait]
impl<P, S> BroadcasterTrait for SolanaBroadcaster<P, S>
where
    P: SolanaProviderTrait + 'static,
    S: SolanaSignTrait,
{
    async fn authorize_and_send(
        &self,
        batch: &TransactionBatch,
    ) -> Result<Signature, BroadcastError> {
        let transaction = self.build_transaction(batch).await?;
        let (signed, signature) = sign_sdk_transaction(self.signer.as_ref(), transaction).await?;

        debug!(
            "Sending batch {} ({} instructions) as {}",
            batch.index,
            batch.instructions.len(),
            signature
        );
        let sent = self.provider.send_transaction(&signed).await?;
        info!("Batch {} submitted: {}", batch.index, sent);
        Ok(sent)
    }

    async fn await_confirmation(
        &self,
        signature: &Signature,
        timeout: Duration,
    ) -> ConfirmationOutcome {
        let last_status: Arc<Mutex<Option<SolanaTransactionStatus>>> = Arc::new(Mutex::new(None));
        let commitment = self.commitment;
        let signature = *signature;

        let check = || {
            let provider = Arc::clone(&self.provider);
            let last_status = Arc::clone(&last_status);
            async move {
                let status = provider.get_transaction_status(&signature).await?;
                let done = match &status {
                    Some(SolanaTransactionStatus::Failed(_)) => true,
                    Some(status) => status.satisfies(commitment),
                    None => false,
                };
                *last_status.lock().await = status;
                Ok::<_, eyre::Report>(done)
            }
        };

        let operation_name = format!("confirmation of {}", signature);
        let landed = match poll_until(check, timeout, self.poll_interval, &operation_name).await {
            Ok(landed) => landed,
            Err(e) => {
                warn!("Polling {} aborted: {}", operation_name, e);
                false
            }
        };

        if !landed {
            return ConfirmationOutcome::TimedOut;
        }

        let status = last_status.lock().await.take();
        match status {
            Some(SolanaTransactionStatus::Failed(reason)) => ConfirmationOutcome::Failed(reason),
            _ => ConfirmationOutcome::Confirmed,
        }
    }
}
