//! Submits batches in order and confirms them concurrently.

use futures::stream::{FuturesUnordered, StreamExt};
use log::{error, info, warn};
use std::time::Duration;

use super::{CancellationFlag, ProgressSender};
use crate::{
    models::{BatchState, DistributionPhase, FailureReason, SubmissionResult, TransactionBatch},
    services::broadcaster::{BroadcasterTrait, ConfirmationOutcome},
};

fn advance(result: &mut SubmissionResult, next: BatchState) {
    match result.state.transition(next) {
        Ok(state) => result.state = state,
        Err(e) => error!("Batch {}: {}", result.batch_index, e),
    }
}

/// Sends every batch through `broadcaster`, then waits for all submitted
/// batches to confirm.
///
/// Submission is sequential and stops at the first cancellation check that
/// finds the flag set; the remaining batches end `NotSubmitted`. Each
/// confirmation is given `confirmation_timeout` and never blocks the others.
/// The hard cutoff is `confirmation_timeout + confirmation_grace`, so a
/// status check that started just before the deadline can still report.
/// Nothing is retried.
pub async fn submit_and_confirm<B: BroadcasterTrait + ?Sized>(
    broadcaster: &B,
    batches: &[TransactionBatch],
    confirmation_timeout: Duration,
    confirmation_grace: Duration,
    progress: &ProgressSender,
    cancel: &CancellationFlag,
) -> Vec<SubmissionResult> {
    let total = batches.len();
    let mut results: Vec<SubmissionResult> = batches
        .iter()
        .map(|batch| SubmissionResult {
            batch_index: batch.index,
            signature: None,
            state: BatchState::Built,
        })
        .collect();

    progress.emit(DistributionPhase::Submitting, 0, total);
    for (position, batch) in batches.iter().enumerate() {
        if cancel.is_cancelled() {
            warn!(
                "Distribution cancelled, {} batch(es) will not be submitted",
                total - position
            );
            for result in &mut results[position..] {
                advance(result, BatchState::NotSubmitted);
            }
            break;
        }

        let result = &mut results[position];
        match broadcaster.authorize_and_send(batch).await {
            Ok(signature) => {
                result.signature = Some(signature);
                advance(result, BatchState::Submitted);
            }
            Err(e) => {
                error!("Batch {} was not submitted: {}", batch.index, e);
                advance(result, BatchState::Failed(FailureReason::from(e)));
            }
        }
        progress.emit(DistributionPhase::Submitting, position + 1, total);
    }

    let submitted: Vec<_> = results
        .iter()
        .enumerate()
        .filter(|(_, result)| result.state == BatchState::Submitted)
        .filter_map(|(position, result)| result.signature.map(|sig| (position, sig)))
        .collect();

    let to_confirm = submitted.len();
    progress.emit(DistributionPhase::Confirming, 0, to_confirm);

    let mut confirmations: FuturesUnordered<_> = submitted
        .into_iter()
        .map(|(position, signature)| async move {
            let outcome = tokio::time::timeout(
                confirmation_timeout + confirmation_grace,
                broadcaster.await_confirmation(&signature, confirmation_timeout),
            )
            .await
            .unwrap_or(ConfirmationOutcome::TimedOut);
            (position, outcome)
        })
        .collect();

    let mut confirmed = 0;
    while let Some((position, outcome)) = confirmations.next().await {
        let result = &mut results[position];
        match outcome {
            ConfirmationOutcome::Confirmed => {
                info!("Batch {} confirmed", result.batch_index);
                advance(result, BatchState::Confirmed);
            }
            ConfirmationOutcome::Failed(reason) => {
                error!("Batch {} failed on chain: {}", result.batch_index, reason);
                advance(
                    result,
                    BatchState::Failed(FailureReason::TransactionFailed(reason)),
                );
            }
            ConfirmationOutcome::TimedOut => {
                warn!(
                    "Batch {} was not confirmed within {:?}",
                    result.batch_index, confirmation_timeout
                );
                advance(result, BatchState::TimedOut);
            }
        }
        confirmed += 1;
        progress.emit(DistributionPhase::Confirming, confirmed, to_confirm);
    }

    results
}
