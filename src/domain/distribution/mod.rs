//! # Distribution engine
//!
//! Turns a recipient list and a mint into confirmed token transfers:
//!
//! 1. normalize the recipient list
//! 2. resolve the asset (mint decimals, token program, funder account)
//! 3. check which recipient holding accounts exist
//! 4. pack instructions into size-bounded batches
//! 5. submit the batches in order and confirm them concurrently
//!
//! Steps 1 to 4 are also available on their own through
//! [`DistributionEngine::plan`].

use log::{info, warn};
use serde::Serialize;
use solana_sdk::pubkey::Pubkey;
use std::{collections::HashMap, sync::Arc};

mod asset_resolver;
mod batch_builder;
mod cancellation;
mod coordinator;
mod existence;
mod normalizer;
mod progress;

pub use asset_resolver::*;
pub use batch_builder::*;
pub use cancellation::*;
pub use coordinator::*;
pub use existence::*;
pub use normalizer::*;
pub use progress::*;

use crate::{
    config::DistributionConfig,
    models::{
        AssetDescriptor, DistributionError, DistributionPhase, DistributionReport,
        InstructionSpec, RecipientInput, RecipientOutcome, RecipientResolution, RecipientStatus, RowRejection,
        TransactionBatch,
    },
    services::{broadcaster::BroadcasterTrait, provider::SolanaProviderTrait, signer::SolanaSignTrait},
};

/// Output of the read-only stages: everything needed to submit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DistributionPlan {
    pub asset: AssetDescriptor,
    pub resolutions: Vec<RecipientResolution>,
    pub batches: Vec<TransactionBatch>,
    pub rejected_rows: Vec<RowRejection>,
}

impl DistributionPlan {
    pub fn recipient_count(&self) -> usize {
        self.resolutions.len()
    }

    pub fn creation_count(&self) -> usize {
        self.batches.iter().map(|b| b.creation_count()).sum()
    }

    /// Lamports charged as platform fee, if any.
    pub fn fee_lamports(&self) -> Option<u64> {
        self.batches
            .first()
            .and_then(|batch| batch.instructions.first())
            .and_then(|ix| match ix {
                InstructionSpec::FeeTransfer { lamports, .. } => Some(*lamports),
                _ => None,
            })
    }

    /// Sum of base units transferred across all batches.
    pub fn total_base_units(&self) -> u128 {
        self.batches.iter().map(|b| b.total_transfer_amount()).sum()
    }
}

pub struct DistributionEngine<P, B>
where
    P: SolanaProviderTrait,
    B: BroadcasterTrait,
{
    provider: Arc<P>,
    broadcaster: Arc<B>,
    funder: Pubkey,
    config: DistributionConfig,
}

impl<P, B> DistributionEngine<P, B>
where
    P: SolanaProviderTrait,
    B: BroadcasterTrait,
{
    pub fn new(
        provider: Arc<P>,
        broadcaster: Arc<B>,
        funder: Pubkey,
        config: DistributionConfig,
    ) -> Result<Self, DistributionError> {
        config
            .validate()
            .map_err(|e| DistributionError::InvalidConfiguration(e.to_string()))?;
        Ok(Self {
            provider,
            broadcaster,
            funder,
            config,
        })
    }

    /// Builds an engine funded by `signer`'s account.
    pub async fn with_signer<S: SolanaSignTrait + ?Sized>(
        provider: Arc<P>,
        broadcaster: Arc<B>,
        signer: &S,
        config: DistributionConfig,
    ) -> Result<Self, DistributionError> {
        let funder = signer.pubkey().await?;
        Self::new(provider, broadcaster, funder, config)
    }

    pub fn funder(&self) -> &Pubkey {
        &self.funder
    }

    pub fn config(&self) -> &DistributionConfig {
        &self.config
    }

    /// Runs the read-only stages without submitting anything.
    pub async fn plan(
        &self,
        asset_identifier: &str,
        recipients: RecipientInput,
    ) -> Result<DistributionPlan, DistributionError> {
        self.prepare(
            asset_identifier,
            recipients,
            &ProgressSender::disabled(),
            &CancellationFlag::new(),
        )
        .await
    }

    /// Runs the whole pipeline.
    ///
    /// Returns `Err` only for failures that abort the run before anything is
    /// submitted. Once submission starts, per-batch failures, timeouts and
    /// cancellation are reported in the returned [`DistributionReport`].
    pub async fn run_distribution(
        &self,
        asset_identifier: &str,
        recipients: RecipientInput,
        progress: ProgressSender,
        cancel: &CancellationFlag,
    ) -> Result<DistributionReport, DistributionError> {
        let plan = self
            .prepare(asset_identifier, recipients, &progress, cancel)
            .await?;
        Ok(self.execute(plan, progress, cancel).await)
    }

    /// Submits and confirms a plan produced by [`Self::plan`], without
    /// reading the recipient list or the ledger again.
    pub async fn execute(
        &self,
        plan: DistributionPlan,
        progress: ProgressSender,
        cancel: &CancellationFlag,
    ) -> DistributionReport {
        let batches = submit_and_confirm(
            self.broadcaster.as_ref(),
            &plan.batches,
            self.config.confirmation_timeout(),
            self.config.confirmation_poll_interval(),
            &progress,
            cancel,
        )
        .await;

        let by_entry: HashMap<usize, &RecipientResolution> = plan
            .resolutions
            .iter()
            .map(|r| (r.entry_index, r))
            .collect();

        let mut outcomes: Vec<RecipientOutcome> = plan
            .batches
            .iter()
            .zip(&batches)
            .flat_map(|(batch, result)| {
                let status = RecipientStatus::from(&result.state);
                batch.recipients.iter().filter_map({
                    let by_entry = &by_entry;
                    move |entry_index| {
                        by_entry.get(entry_index).map(|resolution| RecipientOutcome {
                            entry_index: *entry_index,
                            address: resolution.entry.address,
                            amount: resolution.entry.amount,
                            batch_index: batch.index,
                            status: status.clone(),
                        })
                    }
                })
            })
            .collect();
        outcomes.sort_by_key(|o| o.entry_index);

        let report = DistributionReport {
            asset: plan.asset,
            batches,
            outcomes,
            rejected_rows: plan.rejected_rows,
        };

        progress.emit(
            DistributionPhase::Completed,
            report.batches.len(),
            report.batches.len(),
        );
        info!(
            "Distribution finished: {} succeeded, {} failed, {} row(s) rejected",
            report.succeeded(),
            report.failed(),
            report.rejected_rows.len()
        );
        report
    }

    async fn prepare(
        &self,
        asset_identifier: &str,
        recipients: RecipientInput,
        progress: &ProgressSender,
        cancel: &CancellationFlag,
    ) -> Result<DistributionPlan, DistributionError> {
        let check_cancelled = || {
            if cancel.is_cancelled() {
                warn!("Distribution cancelled before submission");
                Err(DistributionError::Cancelled)
            } else {
                Ok(())
            }
        };

        progress.emit(DistributionPhase::Normalizing, 0, 1);
        let normalized = normalize(recipients);
        progress.emit(DistributionPhase::Normalizing, 1, 1);
        info!(
            "{} valid recipient(s), {} rejected row(s)",
            normalized.entries.len(),
            normalized.rejected.len()
        );
        if normalized.is_empty() {
            return Err(DistributionError::EmptyRecipientList {
                rejected: normalized.rejected,
            });
        }
        check_cancelled()?;

        progress.emit(DistributionPhase::ResolvingAsset, 0, 1);
        let asset = resolve_asset(self.provider.as_ref(), asset_identifier, &self.funder).await?;
        progress.emit(DistributionPhase::ResolvingAsset, 1, 1);
        check_cancelled()?;

        let resolved = resolve_recipients(
            self.provider.as_ref(),
            &asset,
            &normalized,
            self.config.existence_query_concurrency,
            progress,
        )
        .await;
        check_cancelled()?;

        let mut rejected_rows = normalized.rejected;
        rejected_rows.extend(resolved.rejected);
        rejected_rows.sort_by_key(|r| r.line);
        if resolved.resolutions.is_empty() {
            warn!(
                "All {} recipient row(s) were rejected for this asset",
                rejected_rows.len()
            );
            return Err(DistributionError::EmptyRecipientList {
                rejected: rejected_rows,
            });
        }

        progress.emit(DistributionPhase::Building, 0, 1);
        let fee = PlatformFee::from_config(&self.config)?;
        let builder = BatchBuilder::new(&asset, BatchLimits::from(&self.config), fee);
        let batches = builder.build(&resolved.resolutions)?;
        progress.emit(DistributionPhase::Building, 1, 1);
        info!(
            "Planned {} batch(es) for {} recipient(s)",
            batches.len(),
            resolved.resolutions.len()
        );

        Ok(DistributionPlan {
            asset,
            resolutions: resolved.resolutions,
            batches,
            rejected_rows,
        })
    }
}
