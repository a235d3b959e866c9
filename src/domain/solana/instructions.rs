//! Compilation of [`InstructionSpec`]s into Solana instructions and
//! transaction size measurement.

use solana_sdk::{instruction::Instruction, message::Message, pubkey::Pubkey, transaction::Transaction};
use solana_system_interface::instruction as system_instruction;
use thiserror::Error;

use super::{SolanaTokenProgram, TokenError};
use crate::models::InstructionSpec;

#[derive(Error, Debug)]
pub enum InstructionError {
    #[error(transparent)]
    Token(#[from] TokenError),
    #[error("Failed to serialize transaction: {0}")]
    Serialization(String),
}

pub fn compile_instruction(spec: &InstructionSpec) -> Result<Instruction, InstructionError> {
    let instruction = match spec {
        InstructionSpec::CreateHoldingAccount {
            payer,
            owner,
            mint,
            token_program,
            ..
        } => SolanaTokenProgram::create_associated_token_account(*token_program, payer, owner, mint),
        InstructionSpec::Transfer {
            source,
            destination,
            authority,
            mint,
            amount,
            decimals,
            token_program,
        } => SolanaTokenProgram::create_transfer_checked_instruction(
            *token_program,
            source,
            mint,
            destination,
            authority,
            *amount,
            *decimals,
        )?,
        InstructionSpec::FeeTransfer { from, to, lamports } => {
            system_instruction::transfer(from, to, *lamports)
        }
    };
    Ok(instruction)
}

pub fn compile_instructions(specs: &[InstructionSpec]) -> Result<Vec<Instruction>, InstructionError> {
    specs.iter().map(compile_instruction).collect()
}

/// Wire size of the legacy transaction carrying `instructions` with `payer`
/// as fee payer, signature slots included.
pub fn serialized_transaction_size(
    instructions: &[Instruction],
    payer: &Pubkey,
) -> Result<usize, InstructionError> {
    let message = Message::new(instructions, Some(payer));
    let transaction = Transaction::new_unsigned(message);
    let size = bincode::serialized_size(&transaction)
        .map_err(|e| InstructionError::Serialization(e.to_string()))?;
    usize::try_from(size).map_err(|e| InstructionError::Serialization(e.to_string()))
}
