use crate::{
    error::{Error, Result},
    update::Creator,
};
use borsh::BorshDeserialize;
use solana_sdk::pubkey::Pubkey;

/// `Key::MetadataV1`
const METADATA_V1: u8 = 4;

#[derive(BorshDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct Data {
    pub name: String,
    pub symbol: String,
    pub uri: String,
    pub seller_fee_basis_points: u16,
    pub creators: Option<Vec<Creator>>,
}

/// Leading fields of a metadata account. The remaining fields (edition
/// nonce, token standard, collection, uses, ...) are not read.
#[derive(BorshDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct MetadataAccount {
    pub key: u8,
    pub update_authority: Pubkey,
    pub mint: Pubkey,
    pub data: Data,
    pub primary_sale_happened: bool,
    pub is_mutable: bool,
}

fn trim_padding(s: &mut String) {
    let trimmed = s.trim_end_matches('\0').trim();
    if trimmed.len() != s.len() {
        *s = trimmed.to_owned();
    }
}

impl MetadataAccount {
    pub fn decode(mut bytes: &[u8]) -> Result<Self> {
        let mut account = Self::deserialize(&mut bytes)?;
        if account.key != METADATA_V1 {
            return Err(Error::NotMetadata(account.key));
        }
        trim_padding(&mut account.data.name);
        trim_padding(&mut account.data.symbol);
        trim_padding(&mut account.data.uri);
        Ok(account)
    }

    pub fn creators(&self) -> &[Creator] {
        self.data.creators.as_deref().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn padded(buf: &mut Vec<u8>, s: &str, width: usize) {
        buf.extend_from_slice(&(width as u32).to_le_bytes());
        buf.extend_from_slice(s.as_bytes());
        buf.resize(buf.len() + width - s.len(), 0);
    }

    fn account_bytes(key: u8, creator: &Pubkey) -> Vec<u8> {
        let mut buf = vec![key];
        buf.extend_from_slice(Pubkey::new_unique().as_ref());
        buf.extend_from_slice(Pubkey::new_unique().as_ref());
        padded(&mut buf, "Big Head Billionaire #7", 32);
        padded(&mut buf, "BHB", 10);
        padded(&mut buf, "https://arweave.net/abc", 200);
        buf.extend_from_slice(&300u16.to_le_bytes());
        buf.push(1);
        buf.extend_from_slice(&1u32.to_le_bytes());
        buf.extend_from_slice(creator.as_ref());
        buf.extend_from_slice(&[1, 100]);
        buf.extend_from_slice(&[1, 1]);
        // trailing fields are ignored
        buf.extend_from_slice(&[1, 255, 0, 0]);
        buf
    }

    #[test]
    fn test_decode_strips_padding() {
        let creator = Pubkey::new_unique();
        let account = MetadataAccount::decode(&account_bytes(4, &creator)).unwrap();
        assert_eq!(account.data.name, "Big Head Billionaire #7");
        assert_eq!(account.data.symbol, "BHB");
        assert_eq!(account.data.uri, "https://arweave.net/abc");
        assert_eq!(account.data.seller_fee_basis_points, 300);
        assert_eq!(
            account.creators(),
            &[Creator {
                address: creator,
                verified: true,
                share: 100
            }]
        );
        assert!(account.primary_sale_happened);
    }

    #[test]
    fn test_decode_wrong_key() {
        let err = MetadataAccount::decode(&account_bytes(6, &Pubkey::new_unique())).unwrap_err();
        assert!(matches!(err, Error::NotMetadata(6)));
    }

    #[test]
    fn test_decode_truncated() {
        let bytes = account_bytes(4, &Pubkey::new_unique());
        assert!(MetadataAccount::decode(&bytes[..80]).is_err());
    }
}
