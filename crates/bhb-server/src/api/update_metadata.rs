use super::prelude::*;
use crate::{
    chain,
    message::{Nonce, UpdateMessage},
};
use das_client::DasClient;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_sdk::{commitment_config::CommitmentConfig, pubkey::Pubkey, signature::Keypair};
use token_metadata_ix::DataV2;

pub fn service(config: &Config) -> impl HttpServiceFactory {
    web::resource("/update-metadata")
        .app_data(json_config())
        .wrap(config.cors())
        .route(web::post().to(update_metadata))
        .default_service(web::to(post_only))
}

#[derive(Deserialize, Serialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct Params {
    pub owner: Option<String>,
    pub mint: Option<String>,
    pub metadata_uri: Option<String>,
    pub nonce: Option<Nonce>,
    /// Base58 Ed25519 signature of the [`UpdateMessage`].
    pub signature: Option<String>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct Output {
    #[serde(with = "utils::serde_bs58")]
    pub signature: [u8; 64],
}

struct Request<'a> {
    owner: &'a str,
    mint: &'a str,
    metadata_uri: &'a str,
    nonce: &'a Nonce,
    signature: &'a str,
}

impl Params {
    fn required(&self) -> Result<Request<'_>> {
        match (
            non_empty(&self.owner),
            non_empty(&self.mint),
            non_empty(&self.metadata_uri),
            self.nonce.as_ref().filter(|n| !n.is_empty()),
            non_empty(&self.signature),
        ) {
            (Some(owner), Some(mint), Some(metadata_uri), Some(nonce), Some(signature)) => {
                Ok(Request {
                    owner,
                    mint,
                    metadata_uri,
                    nonce,
                    signature,
                })
            }
            _ => Err(Error::MissingFields),
        }
    }
}

fn verify_signature(req: &Request<'_>) -> Result<()> {
    let owner = utils::bs58_decode::<32>(req.owner).map_err(|e| Error::invalid("owner", e))?;
    let signature =
        utils::bs58_decode::<64>(req.signature).map_err(|_| Error::InvalidSignature)?;
    let msg = UpdateMessage::new(req.owner, req.mint, req.metadata_uri, req.nonce);
    if msg.verify(&owner, &signature) {
        Ok(())
    } else {
        Err(Error::InvalidSignature)
    }
}

fn update_authority(secrets: &Secrets) -> Result<Keypair> {
    chain::load_authority(
        secrets
            .update_authority_secret_key
            .as_deref()
            .ok_or(Error::MissingEnv(Secrets::UPDATE_AUTHORITY_SECRET_KEY))?,
    )
}

async fn update_metadata(
    params: web::Json<Params>,
    config: web::Data<Config>,
    secrets: web::Data<Secrets>,
    http: web::Data<reqwest::Client>,
) -> Result<web::Json<Output>> {
    let req = params.required()?;
    verify_signature(&req)?;

    let rpc_url = secrets
        .rpc_url
        .clone()
        .ok_or(Error::MissingEnv(Secrets::SOLANA_RPC_URL))?;
    let owner = req
        .owner
        .parse::<Pubkey>()
        .map_err(|e| Error::invalid("owner", e))?;
    let mint = req
        .mint
        .parse::<Pubkey>()
        .map_err(|e| Error::invalid("mint", e))?;

    let rpc = RpcClient::new_with_commitment(rpc_url.clone(), CommitmentConfig::confirmed());
    if !chain::holder_owns_mint(&rpc, &owner, &mint).await? {
        return Err(Error::NotHolder);
    }

    let das = DasClient::new(http.get_ref().clone(), rpc_url);
    let asset = chain::fetch_asset_data(&das, &rpc, &mint, &config.collection.default_name).await?;
    let authority = update_authority(&secrets)?;

    let data = DataV2::new(
        asset.name,
        config.collection.symbol.clone(),
        req.metadata_uri.to_owned(),
        config.collection.seller_fee_basis_points,
        asset.creators,
    );
    let signature = chain::submit_update(&rpc, &authority, &mint, data).await?;

    let mut output = Output { signature: [0; 64] };
    output.signature.copy_from_slice(signature.as_ref());
    Ok(web::Json(output))
}
