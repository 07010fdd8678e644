//! Client side of the collection's Candy Machine: account decoding, mint
//! transaction assembly and the customizer fee payment.

use serde::Deserialize;
use serde_with::{serde_as, DisplayFromStr};
use solana_sdk::{pubkey, pubkey::Pubkey};

pub mod candy_machine;
pub mod error;
pub mod fee;
pub mod mint;

pub use candy_machine::{fetch_candy_machine, fetch_stats, CandyMachine, MintStats};
pub use error::{Error, Result};
pub use fee::pay_customizer_fee;
pub use mint::{mint, MintOutcome};

pub const CANDY_MACHINE_CORE_ID: Pubkey = pubkey!("CndyV3LdqHUfDLmE5naZjVN8rBZz4tqhdefbAnjHG3JR");
pub const CANDY_GUARD_PROGRAM_ID: Pubkey = pubkey!("Guard1JwRhJkVH6XZhzoYxeBVQe872VH6QggF4BWmS9g");
pub const SPL_TOKEN_PROGRAM_ID: Pubkey = pubkey!("TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA");

/// Deployment addresses of the collection and the payment token.
#[serde_as]
#[derive(Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(default)]
pub struct MintConfig {
    #[serde_as(as = "DisplayFromStr")]
    pub candy_machine: Pubkey,
    #[serde_as(as = "DisplayFromStr")]
    pub candy_guard: Pubkey,
    /// Token-2022 mint paid to the candy guard on every mint.
    #[serde_as(as = "DisplayFromStr")]
    pub payment_mint: Pubkey,
    #[serde_as(as = "DisplayFromStr")]
    pub payment_destination_ata: Pubkey,
    #[serde_as(as = "DisplayFromStr")]
    pub payment_token_program: Pubkey,
    /// Wallet receiving the customizer fee.
    #[serde_as(as = "DisplayFromStr")]
    pub fee_destination: Pubkey,
    /// In base units of `payment_mint`.
    pub fee_amount: u64,
    pub fee_decimals: u8,
    pub compute_unit_limit: u32,
}

impl Default for MintConfig {
    fn default() -> Self {
        Self {
            candy_machine: pubkey!("BiqLN985cYm9nmXpZwP7kDJnoW41Fq7Vy129pUb8ndVA"),
            candy_guard: pubkey!("EwuGsMoNnFQ9XDumF1VxvLHVLew2ayxNQamwTvyXQBYL"),
            payment_mint: pubkey!("6disLregVtZ8qKpTTGyW81mbfAS9uwvHwjKfy6LApump"),
            payment_destination_ata: pubkey!("DwJMwznfQEiFLUNQq3bMKhcBEqM9t5zS8nR5QvmUS9s4"),
            payment_token_program: spl_token_2022::ID,
            fee_destination: pubkey!("9eMPEUrH46tbj67Y1uESNg9mzna7wi3J6ZoefsFkivcx"),
            fee_amount: 100_000_000_000,
            fee_decimals: 6,
            compute_unit_limit: 800_000,
        }
    }
}
