//! Signer backed by an in-memory keypair, usually loaded from a Solana CLI
//! keypair file (a JSON array of 64 bytes).
use async_trait::async_trait;
use log::debug;
use solana_sdk::{
    pubkey::Pubkey,
    signature::{Keypair, Signature},
    signer::Signer,
};
use std::{fs, path::Path};

use super::SolanaSignTrait;
use crate::models::SignerError;

pub struct LocalSigner {
    keypair: Keypair,
}

impl LocalSigner {
    pub fn new(keypair: Keypair) -> Self {
        Self { keypair }
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SignerError> {
        let keypair = Keypair::try_from(bytes)
            .map_err(|e| SignerError::KeyError(format!("Invalid keypair bytes: {}", e)))?;
        Ok(Self::new(keypair))
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SignerError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| {
            SignerError::KeyError(format!("Failed to read keypair {}: {}", path.display(), e))
        })?;
        let bytes: Vec<u8> = serde_json::from_str(&contents).map_err(|e| {
            SignerError::KeyError(format!("Failed to parse keypair {}: {}", path.display(), e))
        })?;
        let signer = Self::from_bytes(&bytes)?;
        debug!("Loaded signing keypair {} from {}", signer.keypair.pubkey(), path.display());
        Ok(signer)
    }
}

impl std::fmt::Debug for LocalSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalSigner")
            .field("pubkey", &self.keypair.pubkey())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl SolanaSignTrait for LocalSigner {
    async fn pubkey(&self) -> Result<Pubkey, SignerError> {
        Ok(self.keypair.pubkey())
    }

    async fn sign(&self, message: &[u8]) -> Result<Signature, SignerError> {
        self.keypair
            .try_sign_message(message)
            .map_err(|e| SignerError::SigningError(e.to_string()))
    }
}
