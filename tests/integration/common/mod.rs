//! In-memory stand-ins for the ledger and the broadcaster.
//!
//! `InMemoryLedger` answers the provider queries the engine makes.
//! `LedgerBroadcaster` applies each batch's instructions to that ledger the
//! way the token programs would, so tests can assert on final balances.
use async_trait::async_trait;
use solana_sdk::{
    account::Account, hash::Hash, program_pack::Pack, pubkey::Pubkey, signature::Signature,
    transaction::Transaction,
};
use soldrop::{
    domain::{CancellationFlag, SolanaTokenProgram},
    models::{InstructionSpec, TokenProgram, TransactionBatch},
    services::{
        broadcaster::{BroadcastError, BroadcasterTrait, ConfirmationOutcome},
        provider::{SolanaProviderError, SolanaProviderTrait, SolanaTransactionStatus},
    },
};
use std::{
    collections::{HashMap, HashSet},
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};

#[derive(Default)]
pub struct InMemoryLedger {
    accounts: Mutex<HashMap<Pubkey, Account>>,
    balances: Mutex<HashMap<Pubkey, u64>>,
    failing_queries: Mutex<HashSet<Pubkey>>,
    existence_queries: AtomicUsize,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an initialized mint and returns its address.
    pub fn add_mint(&self, decimals: u8, program: TokenProgram) -> Pubkey {
        let mint = Pubkey::new_unique();
        let state = spl_token::state::Mint {
            mint_authority: None.into(),
            supply: u64::MAX,
            decimals,
            is_initialized: true,
            freeze_authority: None.into(),
        };
        let mut data = vec![0u8; spl_token::state::Mint::LEN];
        spl_token::state::Mint::pack(state, &mut data).unwrap();
        self.insert_account(mint, data, program.id());
        mint
    }

    /// Opens `owner`'s holding account for `mint` with `balance` base units.
    pub fn open_holding_account(
        &self,
        owner: &Pubkey,
        mint: &Pubkey,
        program: TokenProgram,
        balance: u64,
    ) -> Pubkey {
        let holding = SolanaTokenProgram::get_associated_token_address(program, owner, mint);
        self.insert_account(holding, Vec::new(), program.id());
        self.balances.lock().unwrap().insert(holding, balance);
        holding
    }

    pub fn balance_of(&self, owner: &Pubkey, mint: &Pubkey, program: TokenProgram) -> u64 {
        let holding = SolanaTokenProgram::get_associated_token_address(program, owner, mint);
        self.balances
            .lock()
            .unwrap()
            .get(&holding)
            .copied()
            .unwrap_or_default()
    }

    pub fn has_account(&self, pubkey: &Pubkey) -> bool {
        self.accounts.lock().unwrap().contains_key(pubkey)
    }

    /// Makes existence queries for `pubkey` fail with a network error.
    pub fn fail_queries_for(&self, pubkey: Pubkey) {
        self.failing_queries.lock().unwrap().insert(pubkey);
    }

    pub fn existence_query_count(&self) -> usize {
        self.existence_queries.load(Ordering::SeqCst)
    }

    fn insert_account(&self, pubkey: Pubkey, data: Vec<u8>, owner: Pubkey) {
        self.accounts.lock().unwrap().insert(
            pubkey,
            Account {
                lamports: 2_039_280,
                data,
                owner,
                executable: false,
                rent_epoch: 0,
            },
        );
    }

    /// Executes a batch atomically: either every instruction applies or
    /// nothing changes.
    fn execute(&self, batch: &TransactionBatch) -> Result<(), String> {
        let mut accounts = self.accounts.lock().unwrap().clone();
        let mut balances = self.balances.lock().unwrap().clone();

        for instruction in &batch.instructions {
            match instruction {
                InstructionSpec::CreateHoldingAccount {
                    holding_account,
                    token_program,
                    ..
                } => {
                    accounts.entry(*holding_account).or_insert_with(|| Account {
                        lamports: 2_039_280,
                        data: Vec::new(),
                        owner: token_program.id(),
                        executable: false,
                        rent_epoch: 0,
                    });
                    balances.entry(*holding_account).or_insert(0);
                }
                InstructionSpec::Transfer {
                    source,
                    destination,
                    amount,
                    ..
                } => {
                    if !accounts.contains_key(destination) {
                        return Err(format!("destination {} does not exist", destination));
                    }
                    let available = balances.get(source).copied().unwrap_or_default();
                    if available < *amount {
                        return Err("insufficient funds".to_string());
                    }
                    balances.insert(*source, available - amount);
                    *balances.entry(*destination).or_insert(0) += amount;
                }
                InstructionSpec::FeeTransfer { .. } => {}
            }
        }

        *self.accounts.lock().unwrap() = accounts;
        *self.balances.lock().unwrap() = balances;
        Ok(())
    }
}

#[async_trait]
impl SolanaProviderTrait for InMemoryLedger {
    async fn get_account(&self, pubkey: &Pubkey) -> Result<Option<Account>, SolanaProviderError> {
        Ok(self.accounts.lock().unwrap().get(pubkey).cloned())
    }

    async fn account_exists(&self, pubkey: &Pubkey) -> Result<bool, SolanaProviderError> {
        self.existence_queries.fetch_add(1, Ordering::SeqCst);
        if self.failing_queries.lock().unwrap().contains(pubkey) {
            return Err(SolanaProviderError::NetworkError(
                "connection reset".to_string(),
            ));
        }
        Ok(self.has_account(pubkey))
    }

    async fn get_latest_blockhash(&self) -> Result<Hash, SolanaProviderError> {
        Ok(Hash::default())
    }

    async fn send_transaction(
        &self,
        _transaction: &Transaction,
    ) -> Result<Signature, SolanaProviderError> {
        Err(SolanaProviderError::InvalidTransaction(
            "in-memory ledger only executes batches".to_string(),
        ))
    }

    async fn get_transaction_status(
        &self,
        _signature: &Signature,
    ) -> Result<Option<SolanaTransactionStatus>, SolanaProviderError> {
        Ok(None)
    }
}

/// Broadcaster that executes batches against an [`InMemoryLedger`].
pub struct LedgerBroadcaster {
    ledger: Arc<InMemoryLedger>,
    outcomes: Mutex<HashMap<Signature, ConfirmationOutcome>>,
    submitted: Mutex<Vec<usize>>,
    rejected_batches: HashSet<usize>,
    stalled_batches: HashSet<usize>,
    cancel_after: Option<(usize, CancellationFlag)>,
}

impl LedgerBroadcaster {
    pub fn new(ledger: Arc<InMemoryLedger>) -> Self {
        Self {
            ledger,
            outcomes: Mutex::new(HashMap::new()),
            submitted: Mutex::new(Vec::new()),
            rejected_batches: HashSet::new(),
            stalled_batches: HashSet::new(),
            cancel_after: None,
        }
    }

    /// The signer declines to sign batch `index`.
    pub fn reject_batch(mut self, index: usize) -> Self {
        self.rejected_batches.insert(index);
        self
    }

    /// Batch `index` is sent but its confirmation never arrives.
    pub fn stall_batch(mut self, index: usize) -> Self {
        self.stalled_batches.insert(index);
        self
    }

    /// Sets `flag` right after batch `index` has been sent.
    pub fn cancel_after(mut self, index: usize, flag: CancellationFlag) -> Self {
        self.cancel_after = Some((index, flag));
        self
    }

    pub fn submitted(&self) -> Vec<usize> {
        self.submitted.lock().unwrap().clone()
    }
}

#[async_trait]
impl BroadcasterTrait for LedgerBroadcaster {
    async fn authorize_and_send(
        &self,
        batch: &TransactionBatch,
    ) -> Result<Signature, BroadcastError> {
        if self.rejected_batches.contains(&batch.index) {
            return Err(BroadcastError::SignerRejected("user declined".to_string()));
        }
        self.submitted.lock().unwrap().push(batch.index);

        let signature = Signature::from([batch.index as u8 + 1; 64]);
        let outcome = if self.stalled_batches.contains(&batch.index) {
            ConfirmationOutcome::TimedOut
        } else {
            match self.ledger.execute(batch) {
                Ok(()) => ConfirmationOutcome::Confirmed,
                Err(reason) => ConfirmationOutcome::Failed(reason),
            }
        };
        self.outcomes.lock().unwrap().insert(signature, outcome);

        if let Some((index, flag)) = &self.cancel_after {
            if *index == batch.index {
                flag.cancel();
            }
        }
        Ok(signature)
    }

    async fn await_confirmation(
        &self,
        signature: &Signature,
        timeout: Duration,
    ) -> ConfirmationOutcome {
        let outcome = self.outcomes.lock().unwrap().get(signature).cloned();
        match outcome {
            Some(ConfirmationOutcome::TimedOut) | None => {
                tokio::time::sleep(timeout * 2).await;
                ConfirmationOutcome::TimedOut
            }
            Some(outcome) => outcome,
        }
    }
}

/// Writes `count` fresh recipients as CSV rows, each receiving `amount`.
pub fn recipients_csv(count: usize, amount: &str) -> (Vec<Pubkey>, String) {
    let owners: Vec<Pubkey> = (0..count).map(|_| Pubkey::new_unique()).collect();
    let mut data = String::from("address,amount\n");
    for owner in &owners {
        data.push_str(&format!("{},{}\n", owner, amount));
    }
    (owners, data)
}
