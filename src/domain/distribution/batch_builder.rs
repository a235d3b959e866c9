//! Packs recipient resolutions into transaction batches.
//!
//! Building is pure: the same resolutions, limits and fee always produce the
//! same batches. A recipient's account creation and transfer never straddle
//! two batches.

use log::debug;
use solana_sdk::{instruction::Instruction, pubkey::Pubkey};
use std::str::FromStr;

use crate::{
    config::DistributionConfig,
    constants::MAX_INSTRUCTIONS_PER_RECIPIENT,
    domain::{compile_instructions, serialized_transaction_size},
    models::{
        AssetDescriptor, DistributionError, InstructionSpec, RecipientResolution,
        TransactionBatch,
    },
};

/// Per-transaction ceilings. A batch is closed before any of them would be
/// exceeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchLimits {
    pub max_recipients: usize,
    pub max_instructions: usize,
    /// `None` disables the serialized size check.
    pub max_transaction_bytes: Option<usize>,
}

impl Default for BatchLimits {
    fn default() -> Self {
        Self::from(&DistributionConfig::default())
    }
}

impl From<&DistributionConfig> for BatchLimits {
    fn from(config: &DistributionConfig) -> Self {
        Self {
            max_recipients: config.max_recipients_per_batch,
            max_instructions: config.max_instructions_per_batch,
            max_transaction_bytes: config.max_transaction_bytes,
        }
    }
}

impl BatchLimits {
    pub fn without_size_check(max_recipients: usize, max_instructions: usize) -> Self {
        Self {
            max_recipients,
            max_instructions,
            max_transaction_bytes: None,
        }
    }
}

/// Platform fee policy for one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PlatformFee {
    #[default]
    NotRequired,
    /// Required by the target network but no recipient is configured.
    Unconfigured,
    Charge { recipient: Pubkey, lamports: u64 },
}

impl PlatformFee {
    pub fn from_config(config: &DistributionConfig) -> Result<Self, DistributionError> {
        if !config.fee_required() {
            return Ok(PlatformFee::NotRequired);
        }
        match config.fee.configured_recipient() {
            None => Ok(PlatformFee::Unconfigured),
            Some(recipient) => {
                let recipient = Pubkey::from_str(recipient).map_err(|e| {
                    DistributionError::InvalidConfiguration(format!(
                        "Invalid fee recipient {}: {}",
                        recipient, e
                    ))
                })?;
                Ok(PlatformFee::Charge {
                    recipient,
                    lamports: config.fee.lamports,
                })
            }
        }
    }
}

/// The instructions one recipient contributes: an optional account creation
/// followed by its transfer.
pub fn recipient_instructions(
    asset: &AssetDescriptor,
    resolution: &RecipientResolution,
) -> Vec<InstructionSpec> {
    let mut instructions = Vec::with_capacity(MAX_INSTRUCTIONS_PER_RECIPIENT);
    if resolution.existence.needs_creation() {
        instructions.push(InstructionSpec::CreateHoldingAccount {
            payer: asset.funder,
            owner: resolution.entry.address,
            holding_account: resolution.holding_account,
            mint: asset.mint,
            token_program: asset.token_program,
        });
    }
    instructions.push(InstructionSpec::Transfer {
        source: asset.funder_holding_account,
        destination: resolution.holding_account,
        authority: asset.funder,
        mint: asset.mint,
        amount: resolution.base_units,
        decimals: asset.decimals,
        token_program: asset.token_program,
    });
    instructions
}

/// Batch under construction, with its compiled instructions cached for the
/// size check.
struct OpenBatch {
    batch: TransactionBatch,
    compiled: Vec<Instruction>,
}

impl OpenBatch {
    fn new(index: usize) -> Self {
        Self {
            batch: TransactionBatch::new(index),
            compiled: Vec::new(),
        }
    }

    fn push(&mut self, specs: Vec<InstructionSpec>, compiled: Vec<Instruction>) {
        self.batch.instructions.extend(specs);
        self.compiled.extend(compiled);
    }
}

pub struct BatchBuilder<'a> {
    asset: &'a AssetDescriptor,
    limits: BatchLimits,
    fee: PlatformFee,
}

impl<'a> BatchBuilder<'a> {
    pub fn new(asset: &'a AssetDescriptor, limits: BatchLimits, fee: PlatformFee) -> Self {
        Self { asset, limits, fee }
    }

    pub fn build(
        &self,
        resolutions: &[RecipientResolution],
    ) -> Result<Vec<TransactionBatch>, DistributionError> {
        if resolutions.is_empty() {
            return Err(DistributionError::EmptyRecipientList {
                rejected: Vec::new(),
            });
        }
        if self.limits.max_recipients == 0 || self.limits.max_instructions == 0 {
            return Err(DistributionError::InvalidConfiguration(
                "batch ceilings must be positive".to_string(),
            ));
        }

        let fee_instruction = match self.fee {
            PlatformFee::NotRequired => None,
            PlatformFee::Unconfigured => return Err(DistributionError::FeeRecipientUnconfigured),
            PlatformFee::Charge {
                recipient,
                lamports,
            } => Some(InstructionSpec::FeeTransfer {
                from: self.asset.funder,
                to: recipient,
                lamports,
            }),
        };

        let mut batches = Vec::new();
        let mut current = OpenBatch::new(0);
        if let Some(fee) = fee_instruction {
            let compiled = self.compile(std::slice::from_ref(&fee))?;
            current.push(vec![fee], compiled);
        }

        for resolution in resolutions {
            let specs = recipient_instructions(self.asset, resolution);
            let compiled = self.compile(&specs)?;

            if !self.fits(&current, &specs, &compiled)? {
                if current.batch.recipients.is_empty() {
                    return Err(self.does_not_fit(resolution));
                }
                let next = OpenBatch::new(current.batch.index + 1);
                batches.push(std::mem::replace(&mut current, next).batch);

                if !self.fits(&current, &specs, &compiled)? {
                    return Err(self.does_not_fit(resolution));
                }
            }

            current.batch.recipients.push(resolution.entry_index);
            current.push(specs, compiled);
        }
        batches.push(current.batch);

        for batch in &batches {
            debug!(
                "Batch {}: {} recipient(s), {} instruction(s), {} account creation(s)",
                batch.index,
                batch.recipients.len(),
                batch.instructions.len(),
                batch.creation_count()
            );
        }
        Ok(batches)
    }

    fn compile(&self, specs: &[InstructionSpec]) -> Result<Vec<Instruction>, DistributionError> {
        compile_instructions(specs).map_err(|e| DistributionError::InvalidConfiguration(e.to_string()))
    }

    fn fits(
        &self,
        open: &OpenBatch,
        specs: &[InstructionSpec],
        compiled: &[Instruction],
    ) -> Result<bool, DistributionError> {
        if open.batch.recipients.len() + 1 > self.limits.max_recipients {
            return Ok(false);
        }
        if open.batch.instructions.len() + specs.len() > self.limits.max_instructions {
            return Ok(false);
        }
        let Some(max_bytes) = self.limits.max_transaction_bytes else {
            return Ok(true);
        };

        let candidate: Vec<Instruction> = open.compiled.iter().chain(compiled).cloned().collect();
        let size = serialized_transaction_size(&candidate, &self.asset.funder)
            .map_err(|e| DistributionError::InvalidConfiguration(e.to_string()))?;
        Ok(size <= max_bytes)
    }

    fn does_not_fit(&self, resolution: &RecipientResolution) -> DistributionError {
        let max_bytes = self
            .limits
            .max_transaction_bytes
            .map_or_else(|| "unlimited".to_string(), |bytes| bytes.to_string());
        DistributionError::InvalidConfiguration(format!(
            "recipient {} does not fit into an empty transaction (limits: {} recipient(s), {} instruction(s), {} bytes)",
            resolution.entry.address,
            self.limits.max_recipients,
            self.limits.max_instructions,
            max_bytes
        ))
    }
}
