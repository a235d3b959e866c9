use log::{debug, info};
use solana_sdk::pubkey::Pubkey;
use std::str::FromStr;

use crate::{
    domain::SolanaTokenProgram,
    models::{AssetDescriptor, DistributionError},
    services::provider::SolanaProviderTrait,
};

/// Resolves the mint behind `identifier` and the funder's holding account
/// for it. Read-only.
pub async fn resolve_asset<P: SolanaProviderTrait + ?Sized>(
    provider: &P,
    identifier: &str,
    funder: &Pubkey,
) -> Result<AssetDescriptor, DistributionError> {
    let identifier = identifier.trim();
    let mint = Pubkey::from_str(identifier)
        .map_err(|_| DistributionError::InvalidIdentifier(identifier.to_string()))?;

    let account = provider
        .get_account(&mint)
        .await?
        .ok_or_else(|| DistributionError::AssetNotFound(format!("Mint {} does not exist", mint)))?;

    let mint_info = SolanaTokenProgram::unpack_mint(&mint, &account)
        .map_err(|e| DistributionError::AssetNotFound(e.to_string()))?;

    let funder_holding_account =
        SolanaTokenProgram::get_associated_token_address(mint_info.token_program, funder, &mint);
    debug!(
        "Funder {} holds {} in {}",
        funder, mint, funder_holding_account
    );
    info!(
        "Resolved asset {} ({}, {} decimals)",
        mint, mint_info.token_program, mint_info.decimals
    );

    Ok(AssetDescriptor {
        mint,
        decimals: mint_info.decimals,
        token_program: mint_info.token_program,
        funder: *funder,
        funder_holding_account,
    })
}
