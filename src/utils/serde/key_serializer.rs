//! Serializers that render Solana keys and signatures as base58 strings
//! instead of raw byte arrays.

use serde::Serializer;
use solana_sdk::{pubkey::Pubkey, signature::Signature};

pub fn serialize_pubkey<S>(pubkey: &Pubkey, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&pubkey.to_string())
}

pub fn serialize_optional_signature<S>(
    signature: &Option<Signature>,
    serializer: S,
) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match signature {
        Some(signature) => serializer.serialize_some(&signature.to_string()),
        None => serializer.serialize_none(),
    }
}
