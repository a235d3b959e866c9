pub mod mockutils {
    use solana_sdk::{account::Account, program_pack::Pack, pubkey::Pubkey};

    use crate::{
        domain::SolanaTokenProgram,
        models::{
            AccountExistence, AssetDescriptor, RecipientEntry, RecipientResolution, TokenProgram,
        },
    };

    /// An initialized mint account in the classic layout, owned by `owner`.
    /// Token-2022 reads the same layout when no extensions are present.
    pub fn create_mock_mint_account(decimals: u8, owner: Pubkey) -> Account {
        let mint = spl_token::state::Mint {
            mint_authority: None.into(),
            supply: 1_000_000_000,
            decimals,
            is_initialized: true,
            freeze_authority: None.into(),
        };
        let mut data = vec![0u8; spl_token::state::Mint::LEN];
        spl_token::state::Mint::pack(mint, &mut data).unwrap();
        Account {
            lamports: 1_461_600,
            data,
            owner,
            executable: false,
            rent_epoch: 0,
        }
    }

    pub fn create_mock_asset(decimals: u8) -> AssetDescriptor {
        let mint = Pubkey::new_unique();
        let funder = Pubkey::new_unique();
        AssetDescriptor {
            mint,
            decimals,
            token_program: TokenProgram::SplToken,
            funder,
            funder_holding_account: SolanaTokenProgram::get_associated_token_address(
                TokenProgram::SplToken,
                &funder,
                &mint,
            ),
        }
    }

    pub fn create_mock_resolution(
        asset: &AssetDescriptor,
        entry_index: usize,
        base_units: u64,
        existence: AccountExistence,
    ) -> RecipientResolution {
        let address = Pubkey::new_unique();
        let amount = crate::utils::format_base_units(base_units, asset.decimals)
            .parse()
            .unwrap();
        RecipientResolution {
            entry_index,
            entry: RecipientEntry { address, amount },
            holding_account: SolanaTokenProgram::get_associated_token_address(
                asset.token_program,
                &address,
                &asset.mint,
            ),
            existence,
            base_units,
        }
    }

    pub fn create_mock_resolutions(
        asset: &AssetDescriptor,
        count: usize,
        existence: AccountExistence,
    ) -> Vec<RecipientResolution> {
        (0..count)
            .map(|i| create_mock_resolution(asset, i, 100 * (i as u64 + 1), existence))
            .collect()
    }
}
