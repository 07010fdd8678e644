use anyhow::{bail, ensure};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_with::skip_serializing_none;
use std::sync::atomic::{AtomicU64, Ordering};

/// Client for the Digital Asset Standard read API, as served by Helius and
/// other RPC providers on their regular JSON-RPC endpoint.
#[derive(Debug)]
pub struct DasClient {
    client: reqwest::Client,
    url: String,
    id: AtomicU64,
}

pub fn is_pubkey(s: &str) -> Result<&str, anyhow::Error> {
    let mut buf = [0u8; 32];
    let written = bs58::decode(s).into(&mut buf)?;
    ensure!(written == buf.len(), "invalid pubkey");
    Ok(s)
}

#[skip_serializing_none]
#[derive(Serialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct GetAssetParams<'a> {
    pub id: &'a str,
    pub display_options: Option<DisplayOptions>,
}

#[skip_serializing_none]
#[derive(Serialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct DisplayOptions {
    pub show_unverified_collections: Option<bool>,
    pub show_collection_metadata: Option<bool>,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct Asset {
    pub id: String,
    #[serde(default)]
    pub content: Option<AssetContent>,
    #[serde(default)]
    pub creators: Vec<AssetCreator>,
    #[serde(default)]
    pub ownership: Option<AssetOwnership>,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct AssetContent {
    #[serde(default)]
    pub json_uri: Option<String>,
    #[serde(default)]
    pub metadata: Option<AssetMetadata>,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct AssetMetadata {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub symbol: Option<String>,
}

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct AssetCreator {
    pub address: String,
    pub share: u8,
    pub verified: bool,
}

#[derive(Deserialize, Debug, Clone)]
pub struct AssetOwnership {
    pub owner: String,
    #[serde(default)]
    pub frozen: bool,
}

impl Asset {
    /// On-chain names are NUL padded; the padding and surrounding
    /// whitespace are removed. Empty names count as missing.
    pub fn name(&self) -> Option<String> {
        let name = self.content.as_ref()?.metadata.as_ref()?.name.as_deref()?;
        let name = name.replace('\0', "");
        let name = name.trim();
        (!name.is_empty()).then(|| name.to_owned())
    }
}

#[derive(Deserialize, Debug)]
struct RpcError {
    code: i64,
    message: String,
}

#[derive(Deserialize, Debug)]
struct RpcResponse<T> {
    result: Option<T>,
    error: Option<RpcError>,
}

impl DasClient {
    pub fn new(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
            id: AtomicU64::new(0),
        }
    }

    fn next_id(&self) -> String {
        self.id.fetch_add(1, Ordering::Relaxed).to_string()
    }

    async fn call<P: Serialize, T: DeserializeOwned>(
        &self,
        method: &str,
        params: P,
    ) -> Result<T, anyhow::Error> {
        let req = serde_json::json!({
            "jsonrpc": "2.0",
            "id": self.next_id(),
            "method": method,
            "params": params,
        });

        tracing::debug!("calling {}", method);
        let resp = self
            .client
            .post(&self.url)
            .json(&req)
            .send()
            .await?
            .error_for_status()?
            .json::<RpcResponse<T>>()
            .await?;
        parse_response(method, resp)
    }

    pub async fn get_asset(&self, mint_account: &str) -> Result<Asset, anyhow::Error> {
        is_pubkey(mint_account)?;
        self.call(
            "getAsset",
            GetAssetParams {
                id: mint_account,
                display_options: None,
            },
        )
        .await
    }
}

fn parse_response<T>(method: &str, resp: RpcResponse<T>) -> Result<T, anyhow::Error> {
    match resp {
        RpcResponse {
            error: Some(RpcError { code, message }),
            ..
        } => bail!("{} failed: {} ({})", method, message, code),
        RpcResponse {
            result: Some(result),
            ..
        } => Ok(result),
        _ => bail!("{} returned no result", method),
    }
}
