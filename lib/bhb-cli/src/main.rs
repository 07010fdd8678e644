#![allow(clippy::print_stdout, clippy::print_stderr)]

use bhb_mint::MintConfig;
use bhb_server::{
    api::update_metadata,
    message::{Nonce, UpdateMessage},
};
use clap::{Parser, Subcommand};
use error_stack::{Report, ResultExt};
use reqwest::StatusCode;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_sdk::{
    commitment_config::CommitmentConfig,
    pubkey::Pubkey,
    signature::{Keypair, Signature},
    signer::Signer,
};
use std::{
    fmt::Display,
    path::{Path, PathBuf},
    time::{SystemTime, UNIX_EPOCH},
};
use thiserror::Error as ThisError;
use url::Url;

#[derive(ThisError, Debug)]
pub enum Error {
    #[error("response from server: {}", .0)]
    ErrorResponse(String),
    #[error("{}: {}", .0, .1)]
    UnknownResponse(StatusCode, String),
    #[error("HTTP error")]
    Http,
    #[error("URL error")]
    Url,
    #[error("RPC error")]
    Rpc,
    #[error("failed to read file {}", .0.display())]
    ReadFile(PathBuf),
    #[error("failed to parse config {}", .0.display())]
    ParseConfig(PathBuf),
    #[error("invalid keypair file {}", .0.display())]
    Keypair(PathBuf),
    #[error("failed to serialize output")]
    Serialize,
}

#[derive(Deserialize, ThisError, Debug)]
#[error("{error}")]
pub struct ServerErrorBody {
    pub error: String,
}

#[derive(Parser, Debug)]
#[command(name = "bhb")]
struct Args {
    /// Solana RPC endpoint
    #[arg(
        long,
        env = "SOLANA_RPC_URL",
        default_value = "https://api.mainnet-beta.solana.com"
    )]
    rpc_url: String,
    /// URL of bhb-server
    #[arg(long, default_value = "http://127.0.0.1:8080")]
    server: Url,
    /// Keypair file paying for and signing transactions
    #[arg(long, default_value = "~/.config/solana/id.json")]
    keypair: PathBuf,
    /// Server config file to read mint addresses from
    #[arg(long)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print minted and remaining counts
    Stats,
    /// Mint one NFT with the keypair as payer and owner
    Mint,
    /// Pay the customizer fee
    PayFee,
    /// Pin a file to IPFS through the server
    Upload {
        path: PathBuf,
        /// Guessed from the file extension if not set
        #[arg(long)]
        content_type: Option<String>,
        #[arg(long)]
        filename: Option<String>,
    },
    /// Ask the server to point an NFT's metadata at a new URI
    UpdateMetadata {
        #[arg(long)]
        mint: Pubkey,
        #[arg(long)]
        uri: String,
    },
}

async fn read_json_response<T: DeserializeOwned, E: Display + DeserializeOwned>(
    resp: reqwest::Response,
) -> Result<T, Report<Error>> {
    let code = resp.status();
    let bytes = resp.bytes().await.change_context(Error::Http)?;
    if code.is_success() {
        match serde_json::from_slice::<T>(&bytes) {
            Ok(body) => Ok(body),
            Err(error) => {
                let text = String::from_utf8_lossy(&bytes).into_owned();
                Err(Report::new(error).change_context(Error::UnknownResponse(code, text)))
            }
        }
    } else {
        match serde_json::from_slice::<E>(&bytes) {
            Ok(body) => Err(Error::ErrorResponse(body.to_string()).into()),
            Err(_) => {
                let text = String::from_utf8_lossy(&bytes).into_owned();
                Err(Error::UnknownResponse(code, text).into())
            }
        }
    }
}

async fn read_file(path: impl AsRef<Path>) -> Result<Vec<u8>, Report<Error>> {
    tokio::fs::read(path.as_ref())
        .await
        .change_context_lazy(|| Error::ReadFile(path.as_ref().to_owned()))
}

fn expand_home(path: &Path) -> PathBuf {
    match (path.strip_prefix("~"), std::env::var_os("HOME")) {
        (Ok(rest), Some(home)) => PathBuf::from(home).join(rest),
        _ => path.to_owned(),
    }
}

/// Solana CLI keypair file, a JSON array of 64 bytes.
async fn read_keypair(path: &Path) -> Result<Keypair, Report<Error>> {
    let path = expand_home(path);
    let bytes = read_file(&path).await?;
    let bytes: Vec<u8> =
        serde_json::from_slice(&bytes).change_context_lazy(|| Error::Keypair(path.clone()))?;
    Keypair::from_bytes(&bytes)
        .map_err(|e| Report::new(Error::Keypair(path.clone())).attach_printable(e.to_string()))
}

async fn read_mint_config(path: Option<&Path>) -> Result<MintConfig, Report<Error>> {
    let Some(path) = path else {
        return Ok(MintConfig::default());
    };
    let text = read_file(path).await?;
    let text = String::from_utf8_lossy(&text);
    let config: bhb_server::Config =
        toml::from_str(&text).change_context_lazy(|| Error::ParseConfig(path.to_owned()))?;
    tracing::debug!("candy machine {} from {}", config.mint.candy_machine, path.display());
    Ok(config.mint)
}

fn guess_content_type(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("svg") => "image/svg+xml",
        Some("json") => "application/json",
        _ => "application/octet-stream",
    }
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct UploadBody<'a> {
    #[serde(with = "utils::serde_base64")]
    data: Vec<u8>,
    content_type: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    filename: Option<&'a str>,
}

#[derive(Deserialize, Serialize, Debug)]
struct Uploaded {
    url: String,
    hash: String,
}

async fn upload(
    http: &reqwest::Client,
    server: &Url,
    body: &UploadBody<'_>,
) -> Result<Uploaded, Report<Error>> {
    tracing::info!("uploading {} bytes ({})", body.data.len(), body.content_type);
    let resp = http
        .post(server.join("/api/pinata-upload").change_context(Error::Url)?)
        .json(body)
        .send()
        .await
        .change_context(Error::Http)?;
    read_json_response::<_, ServerErrorBody>(resp).await
}

fn signed_update(keypair: &Keypair, mint: &Pubkey, uri: &str, nonce: Nonce) -> update_metadata::Params {
    let owner = keypair.pubkey().to_string();
    let mint = mint.to_string();
    let signature = keypair.sign_message(&UpdateMessage::new(&owner, &mint, uri, &nonce).to_bytes());
    update_metadata::Params {
        owner: Some(owner),
        mint: Some(mint),
        metadata_uri: Some(uri.to_owned()),
        nonce: Some(nonce),
        signature: Some(signature.to_string()),
    }
}

async fn request_update(
    http: &reqwest::Client,
    server: &Url,
    params: &update_metadata::Params,
) -> Result<Signature, Report<Error>> {
    tracing::info!(
        "requesting metadata update of {}",
        params.mint.as_deref().unwrap_or_default()
    );
    let resp = http
        .post(server.join("/api/update-metadata").change_context(Error::Url)?)
        .json(params)
        .send()
        .await
        .change_context(Error::Http)?;
    let output = read_json_response::<update_metadata::Output, ServerErrorBody>(resp).await?;
    Ok(Signature::from(output.signature))
}

fn print_json<T: Serialize>(value: &T) -> Result<(), Report<Error>> {
    let text = serde_json::to_string_pretty(value).change_context(Error::Serialize)?;
    println!("{}", text);
    Ok(())
}

async fn run() -> Result<(), Report<Error>> {
    let args = Args::parse();
    let rpc = RpcClient::new_with_commitment(args.rpc_url.clone(), CommitmentConfig::confirmed());
    let http = reqwest::Client::new();
    tracing::debug!("rpc: {}, server: {}", args.rpc_url, args.server);

    match args.command {
        Commands::Stats => {
            let cfg = read_mint_config(args.config.as_deref()).await?;
            let stats = bhb_mint::fetch_stats(&rpc, &cfg.candy_machine)
                .await
                .change_context(Error::Rpc)?;
            print_json(&stats)?;
        }
        Commands::Mint => {
            let cfg = read_mint_config(args.config.as_deref()).await?;
            let payer = read_keypair(&args.keypair).await?;
            tracing::info!("minting from {} as {}", cfg.candy_machine, payer.pubkey());
            let outcome = bhb_mint::mint(&rpc, &cfg, &payer)
                .await
                .change_context(Error::Rpc)?;
            println!("signature: {}", outcome.signature);
            println!("mint: {}", outcome.nft_mint);
            print_json(&outcome.stats)?;
        }
        Commands::PayFee => {
            let cfg = read_mint_config(args.config.as_deref()).await?;
            let payer = read_keypair(&args.keypair).await?;
            tracing::info!("paying {} to {}", cfg.fee_amount, cfg.fee_destination);
            let signature = bhb_mint::pay_customizer_fee(&rpc, &cfg, &payer)
                .await
                .change_context(Error::Rpc)?;
            println!("signature: {}", signature);
        }
        Commands::Upload {
            path,
            content_type,
            filename,
        } => {
            let data = read_file(&path).await?;
            let content_type = content_type
                .as_deref()
                .unwrap_or_else(|| guess_content_type(&path));
            let body = UploadBody {
                data,
                content_type,
                filename: filename.as_deref(),
            };
            let uploaded = upload(&http, &args.server, &body).await?;
            print_json(&uploaded)?;
        }
        Commands::UpdateMetadata { mint, uri } => {
            let keypair = read_keypair(&args.keypair).await?;
            let nonce = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_millis() as u64)
                .unwrap_or_default();
            let params = signed_update(&keypair, &mint, &uri, Nonce::from(nonce));
            let signature = request_update(&http, &args.server, &params).await?;
            println!("signature: {}", signature);
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();
    Report::install_debug_hook::<std::panic::Location>(|_, _| {});
    if let Err(error) = run().await {
        eprintln!("error: {:#?}", error);
        std::process::exit(1);
    }
}
