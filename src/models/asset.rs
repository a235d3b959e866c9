use serde::Serialize;
use solana_sdk::pubkey::Pubkey;
use strum::Display;

/// Token programs a mint can belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display)]
pub enum TokenProgram {
    #[strum(serialize = "spl-token")]
    SplToken,
    #[strum(serialize = "spl-token-2022")]
    Token2022,
}

impl TokenProgram {
    pub fn id(&self) -> Pubkey {
        match self {
            TokenProgram::SplToken => spl_token::id(),
            TokenProgram::Token2022 => spl_token_2022::id(),
        }
    }

    /// Identifies the token program from the owner of a mint account.
    pub fn from_program_id(program_id: &Pubkey) -> Option<Self> {
        if program_id == &spl_token::id() {
            Some(TokenProgram::SplToken)
        } else if program_id == &spl_token_2022::id() {
            Some(TokenProgram::Token2022)
        } else {
            None
        }
    }
}

/// Everything the pipeline needs to know about the distributed asset,
/// resolved once per run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssetDescriptor {
    #[serde(serialize_with = "crate::utils::serialize_pubkey")]
    pub mint: Pubkey,
    pub decimals: u8,
    pub token_program: TokenProgram,
    #[serde(serialize_with = "crate::utils::serialize_pubkey")]
    pub funder: Pubkey,
    #[serde(serialize_with = "crate::utils::serialize_pubkey")]
    pub funder_holding_account: Pubkey,
}
