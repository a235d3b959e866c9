//! Holding-account existence checks and base-unit conversion.

use futures::{stream, StreamExt};
use log::{debug, info, warn};
use solana_sdk::pubkey::Pubkey;
use std::collections::HashMap;

use super::ProgressSender;
use crate::{
    domain::SolanaTokenProgram,
    models::{
        AccountExistence, AssetDescriptor, DistributionPhase, NormalizedRecipients,
        RecipientResolution, RejectionReason, RowRejection,
    },
    services::provider::SolanaProviderTrait,
};

/// Recipients ready for the batch builder, plus entries whose amount could
/// not be expressed in base units of the asset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedRecipients {
    pub resolutions: Vec<RecipientResolution>,
    pub rejected: Vec<RowRejection>,
}

/// Converts every entry to base units, derives its holding account and
/// queries whether that account exists.
///
/// Each distinct holding account is queried once, with at most
/// `concurrency` queries in flight. A failed query yields
/// [`AccountExistence::Unknown`].
pub async fn resolve_recipients<P: SolanaProviderTrait + ?Sized>(
    provider: &P,
    asset: &AssetDescriptor,
    recipients: &NormalizedRecipients,
    concurrency: usize,
    progress: &ProgressSender,
) -> ResolvedRecipients {
    let mut resolved = ResolvedRecipients::default();
    let mut pending = Vec::with_capacity(recipients.entries.len());

    for (entry_index, entry) in recipients.entries.iter().enumerate() {
        let line = recipients.lines.get(entry_index).copied().unwrap_or(entry_index + 1);
        match entry.amount.to_base_units(asset.decimals) {
            Ok(base_units) => {
                let holding_account = SolanaTokenProgram::get_associated_token_address(
                    asset.token_program,
                    &entry.address,
                    &asset.mint,
                );
                pending.push((entry_index, holding_account, base_units));
            }
            Err(e) => {
                warn!("Rejecting recipient {} on line {}: {}", entry.address, line, e);
                resolved.rejected.push(RowRejection {
                    line,
                    address: entry.address.to_string(),
                    amount: entry.amount.to_string(),
                    reason: RejectionReason::InvalidAmount(e),
                });
            }
        }
    }

    let mut unique: Vec<Pubkey> = pending.iter().map(|(_, account, _)| *account).collect();
    unique.sort_unstable();
    unique.dedup();

    let total = unique.len();
    progress.emit(DistributionPhase::CheckingAccounts, 0, total);

    let mut queries = stream::iter(unique)
        .map(|holding_account| async move {
            let existence = match provider.account_exists(&holding_account).await {
                Ok(true) => AccountExistence::Exists,
                Ok(false) => AccountExistence::Missing,
                Err(e) => {
                    warn!(
                        "Existence query for {} failed, assuming it is missing: {}",
                        holding_account, e
                    );
                    AccountExistence::Unknown
                }
            };
            (holding_account, existence)
        })
        .buffered(concurrency.max(1));

    let mut existence_by_account = HashMap::with_capacity(total);
    while let Some((holding_account, existence)) = queries.next().await {
        debug!("Holding account {}: {:?}", holding_account, existence);
        existence_by_account.insert(holding_account, existence);
        progress.emit(
            DistributionPhase::CheckingAccounts,
            existence_by_account.len(),
            total,
        );
    }

    resolved.resolutions = pending
        .into_iter()
        .map(|(entry_index, holding_account, base_units)| RecipientResolution {
            entry_index,
            entry: recipients.entries[entry_index].clone(),
            holding_account,
            existence: existence_by_account
                .get(&holding_account)
                .copied()
                .unwrap_or(AccountExistence::Unknown),
            base_units,
        })
        .collect();

    let missing = resolved
        .resolutions
        .iter()
        .filter(|r| r.existence.needs_creation())
        .count();
    info!(
        "Checked {} holding account(s): {} of {} recipient(s) need one created",
        total,
        missing,
        resolved.resolutions.len()
    );

    resolved
}
