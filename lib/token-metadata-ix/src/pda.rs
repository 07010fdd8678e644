use crate::TOKEN_METADATA_ID;
use solana_sdk::pubkey::Pubkey;

const PREFIX: &[u8] = b"metadata";
const EDITION: &[u8] = b"edition";
const COLLECTION_DELEGATE: &[u8] = b"collection_delegate";

pub fn find_metadata_address(mint: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(
        &[PREFIX, TOKEN_METADATA_ID.as_ref(), mint.as_ref()],
        &TOKEN_METADATA_ID,
    )
}

pub fn find_master_edition_address(mint: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(
        &[PREFIX, TOKEN_METADATA_ID.as_ref(), mint.as_ref(), EDITION],
        &TOKEN_METADATA_ID,
    )
}

/// Record that lets `delegate` act for the collection's update authority,
/// used by the Candy Machine to verify minted items into the collection.
pub fn find_collection_delegate_record_address(
    collection_mint: &Pubkey,
    update_authority: &Pubkey,
    delegate: &Pubkey,
) -> (Pubkey, u8) {
    Pubkey::find_program_address(
        &[
            PREFIX,
            TOKEN_METADATA_ID.as_ref(),
            collection_mint.as_ref(),
            COLLECTION_DELEGATE,
            update_authority.as_ref(),
            delegate.as_ref(),
        ],
        &TOKEN_METADATA_ID,
    )
}
