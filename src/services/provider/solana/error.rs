use serde::Serialize;
use solana_client::client_error::{ClientError, ClientErrorKind};
use solana_sdk::transaction::TransactionError;
use thiserror::Error;

/// Errors that can occur when interacting with the Solana RPC node.
///
/// Nothing in the distribution pipeline retries; `is_transient()` tells the
/// caller whether re-running the affected recipients is likely to help.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
pub enum SolanaProviderError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("RPC error: {0}")]
    RpcError(String),

    #[error("Request error (HTTP {status_code}): {error}")]
    RequestError { error: String, status_code: u16 },

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Network configuration error: {0}")]
    NetworkConfiguration(String),

    #[error("Insufficient funds for transaction: {0}")]
    InsufficientFunds(String),

    #[error("Blockhash not found or expired: {0}")]
    BlockhashNotFound(String),

    #[error("Invalid transaction: {0}")]
    InvalidTransaction(String),

    #[error("Transaction already processed: {0}")]
    AlreadyProcessed(String),
}

type ErrorCtor = fn(String) -> SolanaProviderError;

/// JSON-RPC error codes with a fixed classification. `-32002` (simulation
/// failure) is resolved from its message first.
const RPC_ERROR_CODES: &[(&str, ErrorCtor)] = &[
    ("-32003", SolanaProviderError::InvalidTransaction),
    ("-32004", SolanaProviderError::RpcError),
    ("-32005", SolanaProviderError::RpcError),
    ("-32007", SolanaProviderError::NetworkConfiguration),
    ("-32008", SolanaProviderError::BlockhashNotFound),
    ("-32009", SolanaProviderError::AlreadyProcessed),
    ("-32010", SolanaProviderError::NetworkConfiguration),
    ("-32013", SolanaProviderError::InvalidTransaction),
    ("-32014", SolanaProviderError::RpcError),
    ("-32015", SolanaProviderError::InvalidTransaction),
    ("-32016", SolanaProviderError::RpcError),
    ("-32602", SolanaProviderError::InvalidTransaction),
];

/// Message fragments recognised regardless of error code.
const RPC_ERROR_MESSAGES: &[(&str, ErrorCtor)] = &[
    ("insufficient funds", SolanaProviderError::InsufficientFunds),
    ("blockhash not found", SolanaProviderError::BlockhashNotFound),
    ("already processed", SolanaProviderError::AlreadyProcessed),
];

/// Case and whitespace insensitive substring match, so "BlockhashNotFound"
/// matches "blockhash not found".
fn matches_error_pattern(error_msg: &str, pattern: &str) -> bool {
    let normalize = |s: &str| s.to_lowercase().replace(' ', "");
    normalize(error_msg).contains(&normalize(pattern))
}

fn classify_by_message(message: &str) -> Option<ErrorCtor> {
    RPC_ERROR_MESSAGES
        .iter()
        .find(|(pattern, _)| matches_error_pattern(message, pattern))
        .map(|(_, ctor)| *ctor)
}

impl SolanaProviderError {
    /// Whether the same request may succeed later without changes.
    pub fn is_transient(&self) -> bool {
        match self {
            SolanaProviderError::NetworkError(_)
            | SolanaProviderError::RpcError(_)
            | SolanaProviderError::BlockhashNotFound(_) => true,
            SolanaProviderError::RequestError { status_code, .. } => {
                matches!(*status_code, 408 | 425 | 429 | 500 | 502..=504 | 506..=599)
            }
            SolanaProviderError::InvalidAddress(_)
            | SolanaProviderError::NetworkConfiguration(_)
            | SolanaProviderError::InsufficientFunds(_)
            | SolanaProviderError::InvalidTransaction(_)
            | SolanaProviderError::AlreadyProcessed(_) => false,
        }
    }

    /// Classifies a `solana_client` error.
    pub fn from_rpc_error(error: ClientError) -> Self {
        match error.kind() {
            ClientErrorKind::Io(_) => SolanaProviderError::NetworkError(error.to_string()),
            ClientErrorKind::Reqwest(reqwest_err) => match reqwest_err.status() {
                Some(status) => SolanaProviderError::RequestError {
                    error: error.to_string(),
                    status_code: status.as_u16(),
                },
                None => SolanaProviderError::NetworkError(error.to_string()),
            },
            ClientErrorKind::RpcError(rpc_err) => {
                Self::from_rpc_response_error(&rpc_err.to_string(), &error)
            }
            ClientErrorKind::TransactionError(tx_error) => {
                Self::from_transaction_error(tx_error, &error)
            }
            ClientErrorKind::Custom(msg) => Self::from_rpc_response_error(msg, &error),
            _ => SolanaProviderError::RpcError(error.to_string()),
        }
    }

    fn from_rpc_response_error(rpc_err: &str, full_error: &ClientError) -> Self {
        let message = full_error.to_string();

        if rpc_err.contains("-32002") {
            let ctor =
                classify_by_message(rpc_err).unwrap_or(SolanaProviderError::InvalidTransaction);
            return ctor(message);
        }

        let ctor = RPC_ERROR_CODES
            .iter()
            .find(|(code, _)| rpc_err.contains(code))
            .map(|(_, ctor)| *ctor)
            .or_else(|| classify_by_message(rpc_err))
            .unwrap_or(SolanaProviderError::RpcError);
        ctor(message)
    }

    fn from_transaction_error(tx_error: &TransactionError, full_error: &ClientError) -> Self {
        let message = full_error.to_string();
        match tx_error {
            TransactionError::InsufficientFundsForFee
            | TransactionError::InsufficientFundsForRent { .. } => {
                SolanaProviderError::InsufficientFunds(message)
            }
            TransactionError::BlockhashNotFound => SolanaProviderError::BlockhashNotFound(message),
            TransactionError::AlreadyProcessed => SolanaProviderError::AlreadyProcessed(message),
            TransactionError::SignatureFailure
            | TransactionError::MissingSignatureForFee
            | TransactionError::InvalidAccountForFee
            | TransactionError::AccountNotFound
            | TransactionError::InvalidAccountIndex
            | TransactionError::ProgramAccountNotFound
            | TransactionError::InvalidProgramForExecution
            | TransactionError::InstructionError(_, _)
            | TransactionError::TooManyAccountLocks => {
                SolanaProviderError::InvalidTransaction(message)
            }
            _ => SolanaProviderError::RpcError(message),
        }
    }
}

impl From<ClientError> for SolanaProviderError {
    fn from(error: ClientError) -> Self {
        Self::from_rpc_error(error)
    }
}
