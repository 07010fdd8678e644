//! Hand-encoded instructions and account layouts of the Metaplex Token
//! Metadata program.
//!
//! Only the pieces needed to rewrite an existing NFT's metadata are covered:
//! PDA derivation, the `UpdateV1` and `UpdateMetadataAccountV2` payloads, and
//! decoding of the metadata account prefix.

use solana_sdk::{pubkey, pubkey::Pubkey};

pub mod error;
pub mod pda;
pub mod state;
pub mod update;

pub use error::Error;
pub use state::MetadataAccount;
pub use update::{
    update_metadata_account_v2, update_v1, Creator, DataV2, UpdateMetadataAccountV2Args,
    UpdateV1Accounts, UpdateV1Args,
};

pub const TOKEN_METADATA_ID: Pubkey = pubkey!("metaqbxxUerdq28cj1RbAWkYQm3ybzjb6a8bt518x1s");

pub const MAX_NAME_LENGTH: usize = 32;
pub const MAX_SYMBOL_LENGTH: usize = 10;
pub const MAX_URI_LENGTH: usize = 200;
