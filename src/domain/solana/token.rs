use solana_sdk::{account::Account, instruction::Instruction, program_pack::Pack, pubkey::Pubkey};
use spl_associated_token_account::{
    get_associated_token_address_with_program_id,
    instruction::create_associated_token_account_idempotent,
};
use spl_token_2022::extension::StateWithExtensions;

use crate::{constants::MAX_TOKEN_DECIMALS, models::TokenProgram};

/// Error types for token operations
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("Invalid token mint: {0}")]
    InvalidTokenMint(String),
    #[error("Invalid token decimals: {0}")]
    InvalidTokenDecimals(String),
    #[error("Invalid token program: {0}")]
    InvalidTokenProgram(String),
    #[error("Instruction error: {0}")]
    Instruction(String),
}

/// Mint fields the distribution needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MintInfo {
    pub token_program: TokenProgram,
    pub decimals: u8,
}

pub struct SolanaTokenProgram;

impl SolanaTokenProgram {
    pub fn is_token_program(program_id: &Pubkey) -> bool {
        TokenProgram::from_program_id(program_id).is_some()
    }

    /// Reads a mint account. The owning program decides which layout is used;
    /// Token-2022 mints may carry extensions after the base state.
    pub fn unpack_mint(mint: &Pubkey, account: &Account) -> Result<MintInfo, TokenError> {
        let token_program = TokenProgram::from_program_id(&account.owner).ok_or_else(|| {
            TokenError::InvalidTokenProgram(format!(
                "Mint {} is owned by {}, not a token program",
                mint, account.owner
            ))
        })?;

        let (is_initialized, decimals) = match token_program {
            TokenProgram::SplToken => {
                let state = spl_token::state::Mint::unpack(&account.data)
                    .map_err(|e| TokenError::InvalidTokenMint(format!("{}: {}", mint, e)))?;
                (state.is_initialized, state.decimals)
            }
            TokenProgram::Token2022 => {
                let state =
                    StateWithExtensions::<spl_token_2022::state::Mint>::unpack(&account.data)
                        .map_err(|e| TokenError::InvalidTokenMint(format!("{}: {}", mint, e)))?;
                (state.base.is_initialized, state.base.decimals)
            }
        };

        if !is_initialized {
            return Err(TokenError::InvalidTokenMint(format!(
                "Mint {} is not initialized",
                mint
            )));
        }
        if decimals > MAX_TOKEN_DECIMALS {
            return Err(TokenError::InvalidTokenDecimals(format!(
                "Mint {} has {} decimals, at most {} are supported",
                mint, decimals, MAX_TOKEN_DECIMALS
            )));
        }

        Ok(MintInfo {
            token_program,
            decimals,
        })
    }

    pub fn get_associated_token_address(
        token_program: TokenProgram,
        wallet: &Pubkey,
        mint: &Pubkey,
    ) -> Pubkey {
        get_associated_token_address_with_program_id(wallet, mint, &token_program.id())
    }

    /// Creation that succeeds when the account already exists.
    pub fn create_associated_token_account(
        token_program: TokenProgram,
        payer: &Pubkey,
        wallet: &Pubkey,
        mint: &Pubkey,
    ) -> Instruction {
        create_associated_token_account_idempotent(payer, wallet, mint, &token_program.id())
    }

    pub fn create_transfer_checked_instruction(
        token_program: TokenProgram,
        source: &Pubkey,
        mint: &Pubkey,
        destination: &Pubkey,
        authority: &Pubkey,
        amount: u64,
        decimals: u8,
    ) -> Result<Instruction, TokenError> {
        let program_id = token_program.id();
        match token_program {
            TokenProgram::SplToken => spl_token::instruction::transfer_checked(
                &program_id,
                source,
                mint,
                destination,
                authority,
                &[],
                amount,
                decimals,
            ),
            TokenProgram::Token2022 => spl_token_2022::instruction::transfer_checked(
                &program_id,
                source,
                mint,
                destination,
                authority,
                &[],
                amount,
                decimals,
            ),
        }
        .map_err(|e| TokenError::Instruction(e.to_string()))
    }
}
