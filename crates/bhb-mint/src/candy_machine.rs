use crate::{
    error::{Error, Result},
    CANDY_MACHINE_CORE_ID,
};
use borsh::BorshDeserialize;
use serde::Serialize;
use sha2::{Digest, Sha256};
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_sdk::pubkey::Pubkey;

/// Offset of the config line section, where the `items_loaded` counter is
/// stored. It comes right after the largest possible fixed-size header.
pub const HIDDEN_SECTION: usize = 8 // discriminator
    + 1 // version
    + 1 // token standard
    + 6 // features
    + 32 // authority
    + 32 // mint authority
    + 32 // collection mint
    + 8 // items redeemed
    + 8 // items available
    + 4 + 10 // symbol
    + 2 // seller fee basis points
    + 8 // max supply
    + 1 // is mutable
    + 4 + 5 * 34 // creators
    + 1 // option (config line settings)
    + 4 + 32 // prefix name
    + 4 // name length
    + 4 + 200 // prefix uri
    + 4 // uri length
    + 1 // is sequential
    + 1 // option (hidden settings)
    + 4 + 32 // name
    + 4 + 200 // uri
    + 32; // hash

/// First 8 bytes of `sha256("<namespace>:<name>")`, as Anchor computes its
/// account and instruction discriminators.
pub fn anchor_discriminator(namespace: &str, name: &str) -> [u8; 8] {
    let hash = Sha256::new()
        .chain_update(namespace)
        .chain_update(":")
        .chain_update(name)
        .finalize();
    let mut out = [0u8; 8];
    out.copy_from_slice(&hash[..8]);
    out
}

#[derive(BorshDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct CmCreator {
    pub address: Pubkey,
    pub verified: bool,
    pub percentage_share: u8,
}

#[derive(BorshDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct ConfigLineSettings {
    pub prefix_name: String,
    pub name_length: u32,
    pub prefix_uri: String,
    pub uri_length: u32,
    pub is_sequential: bool,
}

#[derive(BorshDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct HiddenSettings {
    pub name: String,
    pub uri: String,
    pub hash: [u8; 32],
}

#[derive(BorshDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct CandyMachineData {
    pub items_available: u64,
    pub symbol: String,
    pub seller_fee_basis_points: u16,
    pub max_supply: u64,
    pub is_mutable: bool,
    pub creators: Vec<CmCreator>,
    pub config_line_settings: Option<ConfigLineSettings>,
    pub hidden_settings: Option<HiddenSettings>,
}

#[derive(BorshDeserialize, Clone, Debug, PartialEq, Eq)]
struct CandyMachineHeader {
    version: u8,
    token_standard: u8,
    features: [u8; 6],
    authority: Pubkey,
    mint_authority: Pubkey,
    collection_mint: Pubkey,
    items_redeemed: u64,
    data: CandyMachineData,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CandyMachine {
    pub address: Pubkey,
    pub version: u8,
    pub token_standard: u8,
    pub authority: Pubkey,
    pub mint_authority: Pubkey,
    pub collection_mint: Pubkey,
    pub items_redeemed: u64,
    pub items_loaded: u64,
    pub data: CandyMachineData,
}

#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct MintStats {
    pub minted: u64,
    pub remaining: u64,
}

impl CandyMachine {
    pub fn decode(address: Pubkey, bytes: &[u8]) -> Result<Self> {
        let discriminator = anchor_discriminator("account", "CandyMachine");
        if bytes.len() < 8 || bytes[..8] != discriminator {
            return Err(Error::NotCandyMachine(address));
        }
        let CandyMachineHeader {
            version,
            token_standard,
            features: _,
            authority,
            mint_authority,
            collection_mint,
            items_redeemed,
            data,
        } = CandyMachineHeader::deserialize(&mut &bytes[8..])
            .map_err(|e| Error::Decode(address, e))?;

        // with hidden settings every item shares one config, nothing is loaded
        let items_loaded = if data.hidden_settings.is_some() {
            data.items_available
        } else {
            let counter = bytes
                .get(HIDDEN_SECTION..HIDDEN_SECTION + 4)
                .ok_or(Error::MissingItemsLoaded(address))?;
            u32::from_le_bytes([counter[0], counter[1], counter[2], counter[3]]) as u64
        };

        Ok(Self {
            address,
            version,
            token_standard,
            authority,
            mint_authority,
            collection_mint,
            items_redeemed,
            items_loaded,
            data,
        })
    }

    pub fn stats(&self) -> MintStats {
        MintStats {
            minted: self.items_redeemed,
            remaining: self.items_loaded.saturating_sub(self.items_redeemed),
        }
    }

    /// PDA that signs for the candy machine when minting.
    pub fn authority_pda(&self) -> Pubkey {
        find_authority_pda(&self.address).0
    }
}

pub fn find_authority_pda(candy_machine: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(
        &[b"candy_machine", candy_machine.as_ref()],
        &CANDY_MACHINE_CORE_ID,
    )
}

pub async fn fetch_candy_machine(rpc: &RpcClient, address: &Pubkey) -> Result<CandyMachine> {
    tracing::debug!("fetching candy machine {}", address);
    let bytes = rpc.get_account_data(address).await?;
    CandyMachine::decode(*address, &bytes)
}

pub async fn fetch_stats(rpc: &RpcClient, address: &Pubkey) -> Result<MintStats> {
    Ok(fetch_candy_machine(rpc, address).await?.stats())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    fn string(buf: &mut Vec<u8>, s: &str) {
        buf.extend_from_slice(&(s.len() as u32).to_le_bytes());
        buf.extend_from_slice(s.as_bytes());
    }

    fn header_bytes(
        authority: &Pubkey,
        collection_mint: &Pubkey,
        items_redeemed: u64,
        items_available: u64,
    ) -> Vec<u8> {
        let mut buf = anchor_discriminator("account", "CandyMachine").to_vec();
        buf.extend_from_slice(&[1, 0]);
        buf.extend_from_slice(&[0; 6]);
        buf.extend_from_slice(authority.as_ref());
        buf.extend_from_slice(Pubkey::new_unique().as_ref());
        buf.extend_from_slice(collection_mint.as_ref());
        buf.extend_from_slice(&items_redeemed.to_le_bytes());
        buf.extend_from_slice(&items_available.to_le_bytes());
        string(&mut buf, "BHB");
        buf.extend_from_slice(&300u16.to_le_bytes());
        buf.extend_from_slice(&0u64.to_le_bytes());
        buf.push(1);
        buf.extend_from_slice(&1u32.to_le_bytes());
        buf.extend_from_slice(authority.as_ref());
        buf.extend_from_slice(&[1, 100]);
        buf
    }

    pub(crate) fn candy_machine_bytes(
        authority: &Pubkey,
        collection_mint: &Pubkey,
        items_redeemed: u64,
        items_available: u64,
        items_loaded: u32,
    ) -> Vec<u8> {
        let mut buf = header_bytes(authority, collection_mint, items_redeemed, items_available);
        // config line settings
        buf.push(1);
        string(&mut buf, "Big Head Billionaire #");
        buf.extend_from_slice(&4u32.to_le_bytes());
        string(&mut buf, "https://gateway.pinata.cloud/ipfs/");
        buf.extend_from_slice(&46u32.to_le_bytes());
        buf.push(0);
        // hidden settings
        buf.push(0);
        buf.resize(HIDDEN_SECTION, 0);
        buf.extend_from_slice(&items_loaded.to_le_bytes());
        buf.resize(buf.len() + 64, 0);
        buf
    }

    #[test]
    fn test_hidden_section_offset() {
        assert_eq!(HIDDEN_SECTION, 850);
    }

    #[test]
    fn test_decode() {
        let address = Pubkey::new_unique();
        let authority = Pubkey::new_unique();
        let collection = Pubkey::new_unique();
        let bytes = candy_machine_bytes(&authority, &collection, 12, 1000, 900);
        let cm = CandyMachine::decode(address, &bytes).unwrap();
        assert_eq!(cm.authority, authority);
        assert_eq!(cm.collection_mint, collection);
        assert_eq!(cm.data.symbol, "BHB");
        assert_eq!(cm.data.items_available, 1000);
        assert_eq!(cm.items_loaded, 900);
        assert_eq!(
            cm.stats(),
            MintStats {
                minted: 12,
                remaining: 888
            }
        );
    }

    #[test]
    fn test_decode_wrong_discriminator() {
        let address = Pubkey::new_unique();
        let mut bytes = candy_machine_bytes(&address, &address, 0, 10, 10);
        bytes[0] ^= 0xff;
        assert!(matches!(
            CandyMachine::decode(address, &bytes),
            Err(Error::NotCandyMachine(a)) if a == address
        ));
        assert!(matches!(
            CandyMachine::decode(address, &[]),
            Err(Error::NotCandyMachine(_))
        ));
    }

    #[test]
    fn test_decode_truncated_section() {
        let address = Pubkey::new_unique();
        let bytes = candy_machine_bytes(&address, &address, 0, 10, 10);
        assert!(matches!(
            CandyMachine::decode(address, &bytes[..HIDDEN_SECTION]),
            Err(Error::MissingItemsLoaded(_))
        ));
    }

    #[test]
    fn test_decode_hidden_settings() {
        let address = Pubkey::new_unique();
        let authority = Pubkey::new_unique();
        let mut bytes = header_bytes(&authority, &authority, 5, 333);
        // no config line settings
        bytes.push(0);
        bytes.push(1);
        string(&mut bytes, "Big Head Billionaire");
        string(&mut bytes, "https://gateway.pinata.cloud/ipfs/QmHidden");
        bytes.extend_from_slice(&[7; 32]);
        // the loaded counter would be garbage here, it must not be read
        bytes.resize(HIDDEN_SECTION + 4, 0xff);

        let cm = CandyMachine::decode(address, &bytes).unwrap();
        assert!(cm.data.config_line_settings.is_none());
        assert_eq!(
            cm.data.hidden_settings.as_ref().map(|h| h.hash),
            Some([7; 32])
        );
        assert_eq!(cm.items_loaded, 333);
        assert_eq!(
            cm.stats(),
            MintStats {
                minted: 5,
                remaining: 328
            }
        );

        let cm = CandyMachine::decode(address, &bytes[..HIDDEN_SECTION - 100]).unwrap();
        assert_eq!(cm.items_loaded, 333);
    }

    #[test]
    fn test_stats_saturate() {
        let address = Pubkey::new_unique();
        let bytes = candy_machine_bytes(&address, &address, 20, 10, 10);
        let stats = CandyMachine::decode(address, &bytes).unwrap().stats();
        assert_eq!(stats.remaining, 0);
    }
}
