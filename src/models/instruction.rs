//! Chain-agnostic description of the instructions a distribution emits.
//!
//! The batch builder produces these; `domain::solana::instructions` compiles
//! them into Solana instructions right before signing.

use serde::Serialize;
use solana_sdk::pubkey::Pubkey;

use super::TokenProgram;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InstructionSpec {
    /// Create the recipient's associated token account. Idempotent on chain.
    CreateHoldingAccount {
        #[serde(serialize_with = "crate::utils::serialize_pubkey")]
        payer: Pubkey,
        #[serde(serialize_with = "crate::utils::serialize_pubkey")]
        owner: Pubkey,
        #[serde(serialize_with = "crate::utils::serialize_pubkey")]
        holding_account: Pubkey,
        #[serde(serialize_with = "crate::utils::serialize_pubkey")]
        mint: Pubkey,
        token_program: TokenProgram,
    },
    /// Move `amount` base units between two holding accounts.
    Transfer {
        #[serde(serialize_with = "crate::utils::serialize_pubkey")]
        source: Pubkey,
        #[serde(serialize_with = "crate::utils::serialize_pubkey")]
        destination: Pubkey,
        #[serde(serialize_with = "crate::utils::serialize_pubkey")]
        authority: Pubkey,
        #[serde(serialize_with = "crate::utils::serialize_pubkey")]
        mint: Pubkey,
        amount: u64,
        decimals: u8,
        token_program: TokenProgram,
    },
    /// One-time platform fee in lamports of the native asset.
    FeeTransfer {
        #[serde(serialize_with = "crate::utils::serialize_pubkey")]
        from: Pubkey,
        #[serde(serialize_with = "crate::utils::serialize_pubkey")]
        to: Pubkey,
        lamports: u64,
    },
}

impl InstructionSpec {
    pub fn is_create_holding_account(&self) -> bool {
        matches!(self, InstructionSpec::CreateHoldingAccount { .. })
    }

    pub fn is_transfer(&self) -> bool {
        matches!(self, InstructionSpec::Transfer { .. })
    }

    pub fn is_fee_transfer(&self) -> bool {
        matches!(self, InstructionSpec::FeeTransfer { .. })
    }
}

/// One transaction's worth of instructions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransactionBatch {
    pub index: usize,
    pub instructions: Vec<InstructionSpec>,
    /// Indices into the normalized entry list of the recipients whose
    /// transfer lives in this batch, in instruction order.
    pub recipients: Vec<usize>,
}

impl TransactionBatch {
    pub fn new(index: usize) -> Self {
        Self {
            index,
            instructions: Vec::new(),
            recipients: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    pub fn transfer_count(&self) -> usize {
        self.instructions.iter().filter(|ix| ix.is_transfer()).count()
    }

    pub fn creation_count(&self) -> usize {
        self.instructions
            .iter()
            .filter(|ix| ix.is_create_holding_account())
            .count()
    }

    pub fn has_fee(&self) -> bool {
        self.instructions.iter().any(|ix| ix.is_fee_transfer())
    }

    /// Sum of base units transferred by this batch.
    pub fn total_transfer_amount(&self) -> u128 {
        self.instructions
            .iter()
            .map(|ix| match ix {
                InstructionSpec::Transfer { amount, .. } => u128::from(*amount),
                _ => 0,
            })
            .sum()
    }
}
