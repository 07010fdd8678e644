use crate::{
    error::{Error, Result},
    pda, MAX_NAME_LENGTH, MAX_SYMBOL_LENGTH, MAX_URI_LENGTH, TOKEN_METADATA_ID,
};
use borsh::{BorshDeserialize, BorshSerialize};
use solana_sdk::{
    instruction::{AccountMeta, Instruction},
    pubkey::Pubkey,
    system_program, sysvar,
};
use std::io::Write;

const UPDATE_METADATA_ACCOUNT_V2: u8 = 15;
const UPDATE: u8 = 50;
// variant index of `UpdateArgs::V1`
const UPDATE_ARGS_V1: u8 = 0;

const MAX_CREATOR_LIMIT: usize = 5;

#[derive(BorshSerialize, BorshDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct Creator {
    pub address: Pubkey,
    pub verified: bool,
    /// In percentage, not basis points.
    pub share: u8,
}

#[derive(BorshSerialize, BorshDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct Collection {
    pub verified: bool,
    pub key: Pubkey,
}

#[derive(BorshSerialize, BorshDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum UseMethod {
    Burn,
    Multiple,
    Single,
}

#[derive(BorshSerialize, BorshDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct Uses {
    pub use_method: UseMethod,
    pub remaining: u64,
    pub total: u64,
}

#[derive(BorshSerialize, BorshDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct DataV2 {
    pub name: String,
    pub symbol: String,
    pub uri: String,
    pub seller_fee_basis_points: u16,
    pub creators: Option<Vec<Creator>>,
    pub collection: Option<Collection>,
    pub uses: Option<Uses>,
}

impl DataV2 {
    /// Builds the data section with no collection and no uses. An empty
    /// creator list is encoded as `None`, the program rejects `Some([])`.
    pub fn new(
        name: String,
        symbol: String,
        uri: String,
        seller_fee_basis_points: u16,
        creators: Vec<Creator>,
    ) -> Self {
        Self {
            name,
            symbol,
            uri,
            seller_fee_basis_points,
            creators: (!creators.is_empty()).then_some(creators),
            collection: None,
            uses: None,
        }
    }

    pub fn validate(&self) -> Result<()> {
        check_len("name", &self.name, MAX_NAME_LENGTH)?;
        check_len("symbol", &self.symbol, MAX_SYMBOL_LENGTH)?;
        check_len("uri", &self.uri, MAX_URI_LENGTH)?;
        if let Some(creators) = &self.creators {
            if creators.len() > MAX_CREATOR_LIMIT {
                return Err(Error::TooLong {
                    field: "creators",
                    len: creators.len(),
                    max: MAX_CREATOR_LIMIT,
                });
            }
            let total = creators.iter().map(|c| c.share as u32).sum::<u32>();
            if total != 100 {
                return Err(Error::CreatorShares(total));
            }
        }
        Ok(())
    }
}

fn check_len(field: &'static str, value: &str, max: usize) -> Result<()> {
    if value.len() > max {
        return Err(Error::TooLong {
            field,
            len: value.len(),
            max,
        });
    }
    Ok(())
}

#[derive(BorshSerialize, BorshDeserialize, Clone, Debug, PartialEq, Eq)]
pub enum CollectionDetails {
    V1 { size: u64 },
    V2 { padding: [u8; 8] },
}

#[derive(BorshSerialize, BorshDeserialize, Clone, Debug, Default, PartialEq, Eq)]
pub enum CollectionToggle {
    #[default]
    None,
    Clear,
    Set(Collection),
}

#[derive(BorshSerialize, BorshDeserialize, Clone, Debug, Default, PartialEq, Eq)]
pub enum CollectionDetailsToggle {
    #[default]
    None,
    Clear,
    Set(CollectionDetails),
}

#[derive(BorshSerialize, BorshDeserialize, Clone, Debug, Default, PartialEq, Eq)]
pub enum UsesToggle {
    #[default]
    None,
    Clear,
    Set(Uses),
}

#[derive(BorshSerialize, BorshDeserialize, Clone, Debug, Default, PartialEq, Eq)]
pub enum RuleSetToggle {
    #[default]
    None,
    Clear,
    Set(Pubkey),
}

/// Already-encoded `AuthorizationData` for programmable NFTs, written as is.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthorizationData(pub Vec<u8>);

impl BorshSerialize for AuthorizationData {
    fn serialize<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        writer.write_all(&self.0)
    }
}

/// Body of `UpdateArgs::V1`. Field order is the wire order.
#[derive(BorshSerialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct UpdateV1Args {
    pub new_update_authority: Option<Pubkey>,
    pub data: Option<DataV2>,
    pub primary_sale_happened: Option<bool>,
    pub is_mutable: Option<bool>,
    pub collection: CollectionToggle,
    pub collection_details: CollectionDetailsToggle,
    pub uses: UsesToggle,
    pub rule_set: RuleSetToggle,
    pub authorization_data: Option<AuthorizationData>,
}

impl UpdateV1Args {
    /// Replace the data section and leave everything else untouched.
    pub fn with_data(data: DataV2) -> Self {
        Self {
            data: Some(data),
            ..Default::default()
        }
    }

    pub fn instruction_data(&self) -> Result<Vec<u8>> {
        if let Some(data) = &self.data {
            data.validate()?;
        }
        let mut buf = vec![UPDATE, UPDATE_ARGS_V1];
        self.serialize(&mut buf)?;
        Ok(buf)
    }
}

#[derive(Clone, Debug)]
pub struct UpdateV1Accounts {
    pub authority: Pubkey,
    pub delegate_record: Option<Pubkey>,
    pub token: Option<Pubkey>,
    pub mint: Pubkey,
    pub metadata: Pubkey,
    pub edition: Option<Pubkey>,
    pub payer: Pubkey,
    pub authorization_rules_program: Option<Pubkey>,
    pub authorization_rules: Option<Pubkey>,
}

impl UpdateV1Accounts {
    /// Accounts for an update signed by the metadata's update authority,
    /// which also pays for the transaction.
    pub fn update_authority(authority: Pubkey, mint: Pubkey) -> Self {
        Self {
            authority,
            delegate_record: None,
            token: None,
            mint,
            metadata: pda::find_metadata_address(&mint).0,
            edition: Some(pda::find_master_edition_address(&mint).0),
            payer: authority,
            authorization_rules_program: None,
            authorization_rules: None,
        }
    }

    fn to_account_metas(&self) -> Vec<AccountMeta> {
        // absent optional accounts are passed as the program id
        let optional = |key: Option<Pubkey>| {
            AccountMeta::new_readonly(key.unwrap_or(TOKEN_METADATA_ID), false)
        };
        vec![
            AccountMeta::new_readonly(self.authority, true),
            optional(self.delegate_record),
            optional(self.token),
            AccountMeta::new_readonly(self.mint, false),
            AccountMeta::new(self.metadata, false),
            optional(self.edition),
            AccountMeta::new(self.payer, true),
            AccountMeta::new_readonly(system_program::ID, false),
            AccountMeta::new_readonly(sysvar::instructions::ID, false),
            optional(self.authorization_rules_program),
            optional(self.authorization_rules),
        ]
    }
}

pub fn update_v1(accounts: &UpdateV1Accounts, args: &UpdateV1Args) -> Result<Instruction> {
    Ok(Instruction {
        program_id: TOKEN_METADATA_ID,
        accounts: accounts.to_account_metas(),
        data: args.instruction_data()?,
    })
}

#[derive(BorshSerialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct UpdateMetadataAccountV2Args {
    pub data: Option<DataV2>,
    pub new_update_authority: Option<Pubkey>,
    pub primary_sale_happened: Option<bool>,
    pub is_mutable: Option<bool>,
}

impl UpdateMetadataAccountV2Args {
    pub fn instruction_data(&self) -> Result<Vec<u8>> {
        if let Some(data) = &self.data {
            data.validate()?;
        }
        let mut buf = vec![UPDATE_METADATA_ACCOUNT_V2];
        self.serialize(&mut buf)?;
        Ok(buf)
    }
}

/// Legacy update instruction, still accepted for non-programmable NFTs.
pub fn update_metadata_account_v2(
    metadata: Pubkey,
    update_authority: Pubkey,
    args: &UpdateMetadataAccountV2Args,
) -> Result<Instruction> {
    Ok(Instruction {
        program_id: TOKEN_METADATA_ID,
        accounts: vec![
            AccountMeta::new(metadata, false),
            AccountMeta::new_readonly(update_authority, true),
        ],
        data: args.instruction_data()?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn string(buf: &mut Vec<u8>, s: &str) {
        buf.extend_from_slice(&(s.len() as u32).to_le_bytes());
        buf.extend_from_slice(s.as_bytes());
    }

    fn data(creators: Vec<Creator>) -> DataV2 {
        DataV2::new(
            "BHB #42".to_owned(),
            "BHB".to_owned(),
            "https://gateway.pinata.cloud/ipfs/QmHash".to_owned(),
            300,
            creators,
        )
    }

    #[test]
    fn test_update_v1_layout_with_creators() {
        let creator = Pubkey::new_unique();
        let args = UpdateV1Args::with_data(data(vec![Creator {
            address: creator,
            verified: true,
            share: 100,
        }]));

        let mut expected = vec![50, 0, 0, 1];
        string(&mut expected, "BHB #42");
        string(&mut expected, "BHB");
        string(&mut expected, "https://gateway.pinata.cloud/ipfs/QmHash");
        expected.extend_from_slice(&300u16.to_le_bytes());
        expected.push(1);
        expected.extend_from_slice(&1u32.to_le_bytes());
        expected.extend_from_slice(creator.as_ref());
        expected.extend_from_slice(&[1, 100]);
        // collection, uses
        expected.extend_from_slice(&[0, 0]);
        // primary sale, is mutable
        expected.extend_from_slice(&[0, 0]);
        // toggles
        expected.extend_from_slice(&[0, 0, 0, 0]);
        // authorization data
        expected.push(0);

        assert_eq!(args.instruction_data().unwrap(), expected);
    }

    #[test]
    fn test_update_v1_layout_without_creators() {
        let bytes = UpdateV1Args::with_data(data(Vec::new()))
            .instruction_data()
            .unwrap();
        let mut expected = vec![50, 0, 0, 1];
        string(&mut expected, "BHB #42");
        string(&mut expected, "BHB");
        string(&mut expected, "https://gateway.pinata.cloud/ipfs/QmHash");
        expected.extend_from_slice(&[0x2c, 0x01]);
        expected.extend_from_slice(&[0; 10]);
        assert_eq!(bytes, expected);
    }

    #[test]
    fn test_update_v1_accounts() {
        let authority = Pubkey::new_unique();
        let mint = Pubkey::new_unique();
        let accounts = UpdateV1Accounts::update_authority(authority, mint);
        let ix = update_v1(&accounts, &UpdateV1Args::with_data(data(Vec::new()))).unwrap();

        assert_eq!(ix.program_id, TOKEN_METADATA_ID);
        assert_eq!(ix.accounts.len(), 11);
        assert_eq!(ix.accounts[0], AccountMeta::new_readonly(authority, true));
        assert_eq!(ix.accounts[1].pubkey, TOKEN_METADATA_ID);
        assert_eq!(ix.accounts[2].pubkey, TOKEN_METADATA_ID);
        assert_eq!(
            ix.accounts[4],
            AccountMeta::new(pda::find_metadata_address(&mint).0, false)
        );
        assert_eq!(
            ix.accounts[5].pubkey,
            pda::find_master_edition_address(&mint).0
        );
        assert_eq!(ix.accounts[6], AccountMeta::new(authority, true));
        assert_eq!(ix.accounts[7].pubkey, system_program::ID);
        assert_eq!(ix.accounts[8].pubkey, sysvar::instructions::ID);
    }

    #[test]
    fn test_update_metadata_account_v2_layout() {
        let new_authority = Pubkey::new_unique();
        let args = UpdateMetadataAccountV2Args {
            data: None,
            new_update_authority: Some(new_authority),
            primary_sale_happened: Some(true),
            is_mutable: None,
        };
        let mut expected = vec![15, 0, 1];
        expected.extend_from_slice(new_authority.as_ref());
        expected.extend_from_slice(&[1, 1, 0]);
        assert_eq!(args.instruction_data().unwrap(), expected);

        let metadata = Pubkey::new_unique();
        let ix = update_metadata_account_v2(metadata, new_authority, &args).unwrap();
        assert_eq!(ix.accounts[0], AccountMeta::new(metadata, false));
        assert_eq!(ix.accounts[1], AccountMeta::new_readonly(new_authority, true));
    }

    #[test]
    fn test_validation() {
        let mut long_name = data(Vec::new());
        long_name.name = "x".repeat(33);
        assert!(matches!(
            UpdateV1Args::with_data(long_name).instruction_data(),
            Err(Error::TooLong { field: "name", .. })
        ));

        let shares = data(vec![
            Creator {
                address: Pubkey::new_unique(),
                verified: false,
                share: 60,
            },
            Creator {
                address: Pubkey::new_unique(),
                verified: false,
                share: 30,
            },
        ]);
        assert!(matches!(
            UpdateV1Args::with_data(shares).instruction_data(),
            Err(Error::CreatorShares(90))
        ));
    }
}
