use crate::{
    candy_machine::{anchor_discriminator, fetch_candy_machine, CandyMachine, MintStats},
    error::Result,
    MintConfig, CANDY_GUARD_PROGRAM_ID, CANDY_MACHINE_CORE_ID, SPL_TOKEN_PROGRAM_ID,
};
use borsh::BorshSerialize;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_sdk::{
    compute_budget::ComputeBudgetInstruction,
    instruction::{AccountMeta, Instruction},
    pubkey::Pubkey,
    signature::{Keypair, Signature},
    signer::Signer,
    system_program, sysvar,
    transaction::Transaction,
};
use spl_associated_token_account_client::address::get_associated_token_address_with_program_id;
use token_metadata_ix::{pda, TOKEN_METADATA_ID};

#[derive(BorshSerialize)]
struct MintV2Args {
    /// Serialized guard arguments. Token-2022 payment takes none.
    mint_args: Vec<u8>,
    label: Option<String>,
}

/// Remaining accounts read by the Token-2022 payment guard, in order.
fn token2022_payment_accounts(cfg: &MintConfig, payer: &Pubkey) -> [AccountMeta; 4] {
    let source = get_associated_token_address_with_program_id(
        payer,
        &cfg.payment_mint,
        &cfg.payment_token_program,
    );
    [
        AccountMeta::new(source, false),
        AccountMeta::new(cfg.payment_destination_ata, false),
        AccountMeta::new_readonly(cfg.payment_mint, false),
        AccountMeta::new_readonly(cfg.payment_token_program, false),
    ]
}

/// Candy Guard `mint_v2`, minting a regular NFT into `nft_mint` owned by
/// `payer`.
pub fn mint_v2_instruction(
    cfg: &MintConfig,
    cm: &CandyMachine,
    payer: &Pubkey,
    nft_mint: &Pubkey,
) -> Result<Instruction> {
    let authority_pda = cm.authority_pda();
    // anchor passes a missing optional account as the invoked program
    let none = AccountMeta::new_readonly(CANDY_GUARD_PROGRAM_ID, false);

    let mut accounts = vec![
        AccountMeta::new_readonly(cfg.candy_guard, false),
        AccountMeta::new_readonly(CANDY_MACHINE_CORE_ID, false),
        AccountMeta::new(cm.address, false),
        AccountMeta::new(authority_pda, false),
        AccountMeta::new(*payer, true),
        AccountMeta::new(*payer, true),
        AccountMeta::new(*nft_mint, true),
        AccountMeta::new_readonly(*payer, true),
        AccountMeta::new(pda::find_metadata_address(nft_mint).0, false),
        AccountMeta::new(pda::find_master_edition_address(nft_mint).0, false),
        AccountMeta::new(
            get_associated_token_address_with_program_id(payer, nft_mint, &SPL_TOKEN_PROGRAM_ID),
            false,
        ),
        // token record
        none.clone(),
        AccountMeta::new_readonly(
            pda::find_collection_delegate_record_address(
                &cm.collection_mint,
                &cm.authority,
                &authority_pda,
            )
            .0,
            false,
        ),
        AccountMeta::new_readonly(cm.collection_mint, false),
        AccountMeta::new(pda::find_metadata_address(&cm.collection_mint).0, false),
        AccountMeta::new_readonly(pda::find_master_edition_address(&cm.collection_mint).0, false),
        AccountMeta::new_readonly(cm.authority, false),
        AccountMeta::new_readonly(TOKEN_METADATA_ID, false),
        AccountMeta::new_readonly(SPL_TOKEN_PROGRAM_ID, false),
        AccountMeta::new_readonly(spl_associated_token_account_client::program::ID, false),
        AccountMeta::new_readonly(system_program::ID, false),
        AccountMeta::new_readonly(sysvar::instructions::ID, false),
        AccountMeta::new_readonly(sysvar::slot_hashes::ID, false),
        // authorization rules program, authorization rules
        none.clone(),
        none,
    ];
    accounts.extend(token2022_payment_accounts(cfg, payer));

    let mut data = anchor_discriminator("global", "mint_v2").to_vec();
    MintV2Args {
        mint_args: Vec::new(),
        label: None,
    }
    .serialize(&mut data)
    .map_err(crate::Error::Encode)?;

    Ok(Instruction {
        program_id: CANDY_GUARD_PROGRAM_ID,
        accounts,
        data,
    })
}

pub fn build_mint_instructions(
    cfg: &MintConfig,
    cm: &CandyMachine,
    payer: &Pubkey,
    nft_mint: &Pubkey,
) -> Result<Vec<Instruction>> {
    Ok(vec![
        ComputeBudgetInstruction::set_compute_unit_limit(cfg.compute_unit_limit),
        mint_v2_instruction(cfg, cm, payer, nft_mint)?,
    ])
}

#[derive(Debug)]
pub struct MintOutcome {
    pub signature: Signature,
    pub nft_mint: Pubkey,
    pub stats: MintStats,
}

/// Mint one NFT paid and owned by `payer`, then report the updated counts.
pub async fn mint(rpc: &RpcClient, cfg: &MintConfig, payer: &Keypair) -> Result<MintOutcome> {
    let cm = fetch_candy_machine(rpc, &cfg.candy_machine).await?;
    let nft_mint = Keypair::new();
    let instructions = build_mint_instructions(cfg, &cm, &payer.pubkey(), &nft_mint.pubkey())?;

    let recent_blockhash = rpc.get_latest_blockhash().await?;
    let tx = Transaction::new_signed_with_payer(
        &instructions,
        Some(&payer.pubkey()),
        &[payer, &nft_mint],
        recent_blockhash,
    );

    tracing::info!("minting {} from {}", nft_mint.pubkey(), cm.address);
    let signature = rpc.send_and_confirm_transaction(&tx).await?;
    tracing::info!("minted {}: {}", nft_mint.pubkey(), signature);

    let stats = fetch_candy_machine(rpc, &cfg.candy_machine).await?.stats();
    Ok(MintOutcome {
        signature,
        nft_mint: nft_mint.pubkey(),
        stats,
    })
}
