//! Chain access for the metadata update: holder check, current asset data
//! and submission of the authority-signed `UpdateV1`.

use crate::error::{Error, Result};
use das_client::DasClient;
use solana_account_decoder::UiAccountData;
use solana_client::{
    nonblocking::rpc_client::RpcClient, rpc_request::TokenAccountsFilter,
    rpc_response::RpcKeyedAccount,
};
use solana_sdk::{
    pubkey::Pubkey,
    signature::{Keypair, Signature},
    signer::Signer,
    transaction::Transaction,
};
use token_metadata_ix::{
    pda, Creator, DataV2, MetadataAccount, UpdateV1Accounts, UpdateV1Args,
};

/// Parse a base58 encoded 64-byte secret key.
pub fn load_authority(secret: &str) -> Result<Keypair> {
    let bytes = bs58::decode(secret.trim())
        .into_vec()
        .map_err(|e| Error::AuthorityKey(e.to_string()))?;
    Keypair::from_bytes(&bytes).map_err(|e| Error::AuthorityKey(e.to_string()))
}

fn token_amount(account: &RpcKeyedAccount) -> Option<&str> {
    match &account.account.data {
        UiAccountData::Json(parsed) => parsed
            .parsed
            .get("info")?
            .get("tokenAmount")?
            .get("amount")?
            .as_str(),
        _ => None,
    }
}

fn has_positive_balance(accounts: &[RpcKeyedAccount]) -> bool {
    accounts
        .iter()
        .filter_map(token_amount)
        .any(|amount| amount.parse::<u64>().is_ok_and(|a| a > 0))
}

/// True if `owner` has a token account for `mint` with a non-zero balance.
pub async fn holder_owns_mint(rpc: &RpcClient, owner: &Pubkey, mint: &Pubkey) -> Result<bool> {
    let accounts = rpc
        .get_token_accounts_by_owner(owner, TokenAccountsFilter::Mint(*mint))
        .await?;
    Ok(has_positive_balance(&accounts))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetData {
    pub name: String,
    pub creators: Vec<Creator>,
}

fn asset_data_from_das(asset: &das_client::Asset, default_name: &str) -> Result<AssetData> {
    let creators = asset
        .creators
        .iter()
        .map(|c| {
            Ok(Creator {
                address: c
                    .address
                    .parse()
                    .map_err(|e| Error::invalid("creator address", e))?,
                verified: c.verified,
                share: c.share,
            })
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(AssetData {
        name: asset.name().unwrap_or_else(|| default_name.to_owned()),
        creators,
    })
}

fn asset_data_from_account(account: &MetadataAccount, default_name: &str) -> AssetData {
    let name = if account.data.name.is_empty() {
        default_name.to_owned()
    } else {
        account.data.name.clone()
    };
    AssetData {
        name,
        creators: account.creators().to_vec(),
    }
}

/// Current name and creators of `mint`. Asks the DAS API first and reads the
/// metadata account directly if that fails.
pub async fn fetch_asset_data(
    das: &DasClient,
    rpc: &RpcClient,
    mint: &Pubkey,
    default_name: &str,
) -> Result<AssetData> {
    match das.get_asset(&mint.to_string()).await {
        Ok(asset) => return asset_data_from_das(&asset, default_name),
        Err(error) => {
            tracing::warn!("getAsset {} failed, reading metadata account: {}", mint, error);
        }
    }
    let address = pda::find_metadata_address(mint).0;
    let bytes = rpc.get_account_data(&address).await?;
    let account = MetadataAccount::decode(&bytes)?;
    Ok(asset_data_from_account(&account, default_name))
}

/// Sign and send an `UpdateV1` replacing the metadata's data section, with
/// `authority` as signer and fee payer.
pub async fn submit_update(
    rpc: &RpcClient,
    authority: &Keypair,
    mint: &Pubkey,
    data: DataV2,
) -> Result<Signature> {
    let accounts = UpdateV1Accounts::update_authority(authority.pubkey(), *mint);
    let ix = token_metadata_ix::update_v1(&accounts, &UpdateV1Args::with_data(data))?;

    let recent_blockhash = rpc.get_latest_blockhash().await?;
    let tx = Transaction::new_signed_with_payer(
        &[ix],
        Some(&authority.pubkey()),
        &[authority],
        recent_blockhash,
    );
    let signature = rpc.send_and_confirm_transaction(&tx).await?;
    tracing::info!("updated metadata of {}: {}", mint, signature);
    Ok(signature)
}
