use crate::{error::Result, MintConfig};
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_sdk::{
    instruction::Instruction,
    pubkey::Pubkey,
    signature::{Keypair, Signature},
    signer::Signer,
    transaction::Transaction,
};
use spl_associated_token_account_client::{
    address::get_associated_token_address_with_program_id,
    instruction::create_associated_token_account_idempotent,
};

/// Transfer `cfg.fee_amount` of the payment token from the payer's ATA to
/// the fee wallet's ATA, creating the latter first when asked to.
pub fn build_fee_transfer(
    cfg: &MintConfig,
    payer: &Pubkey,
    create_destination: bool,
) -> Result<Vec<Instruction>> {
    let program = &cfg.payment_token_program;
    let source = get_associated_token_address_with_program_id(payer, &cfg.payment_mint, program);
    let destination =
        get_associated_token_address_with_program_id(&cfg.fee_destination, &cfg.payment_mint, program);

    let mut instructions = Vec::with_capacity(2);
    if create_destination {
        instructions.push(create_associated_token_account_idempotent(
            payer,
            &cfg.fee_destination,
            &cfg.payment_mint,
            program,
        ));
    }
    instructions.push(spl_token_2022::instruction::transfer_checked(
        program,
        &source,
        &cfg.payment_mint,
        &destination,
        payer,
        &[],
        cfg.fee_amount,
        cfg.fee_decimals,
    )?);
    Ok(instructions)
}

pub async fn pay_customizer_fee(
    rpc: &RpcClient,
    cfg: &MintConfig,
    payer: &Keypair,
) -> Result<Signature> {
    let destination = get_associated_token_address_with_program_id(
        &cfg.fee_destination,
        &cfg.payment_mint,
        &cfg.payment_token_program,
    );
    let exists = rpc
        .get_account_with_commitment(&destination, rpc.commitment())
        .await?
        .value
        .is_some();
    if !exists {
        tracing::info!("creating fee destination account {}", destination);
    }

    let instructions = build_fee_transfer(cfg, &payer.pubkey(), !exists)?;
    let recent_blockhash = rpc.get_latest_blockhash().await?;
    let tx = Transaction::new_signed_with_payer(
        &instructions,
        Some(&payer.pubkey()),
        &[payer],
        recent_blockhash,
    );
    let signature = rpc.send_and_confirm_transaction(&tx).await?;
    tracing::info!("paid customizer fee: {}", signature);
    Ok(signature)
}
