//! Minimal client for Pinata's pinning API.

use reqwest::{
    header::AUTHORIZATION,
    multipart::{Form, Part},
    StatusCode,
};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use thiserror::Error as ThisError;
use url::Url;

pub const DEFAULT_API_URL: &str = "https://api.pinata.cloud/";
pub const DEFAULT_GATEWAY_URL: &str = "https://gateway.pinata.cloud/";

#[derive(Debug, ThisError)]
pub enum Error {
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error(transparent)]
    Url(#[from] url::ParseError),
    /// Pinata answered with a non-success status; the body is kept so it can
    /// be handed back to the caller unchanged.
    #[error("pinata returned {status}: {body}")]
    Upstream { status: StatusCode, body: JsonValue },
    #[error("unexpected response from pinata: {0}")]
    UnexpectedResponse(String),
    #[error("invalid contentType: {0}")]
    ContentType(String),
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "PascalCase")]
struct PinFileResponse {
    ipfs_hash: String,
}

/// Hash of the pinned file, or the error Pinata answered with.
fn parse_pin_response(status: StatusCode, bytes: &[u8]) -> Result<String, Error> {
    if !status.is_success() {
        let body = serde_json::from_slice::<JsonValue>(bytes).unwrap_or_else(|_| {
            serde_json::json!({ "error": String::from_utf8_lossy(bytes) })
        });
        tracing::warn!("pinata error {}: {}", status, body);
        return Err(Error::Upstream { status, body });
    }
    serde_json::from_slice::<PinFileResponse>(bytes)
        .map(|resp| resp.ipfs_hash)
        .map_err(|_| Error::UnexpectedResponse(String::from_utf8_lossy(bytes).into_owned()))
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct PinnedFile {
    pub url: String,
    pub hash: String,
}

#[derive(Clone)]
pub struct Pinata {
    client: reqwest::Client,
    jwt: String,
    pin_file_url: Url,
    gateway_url: Url,
}

impl Pinata {
    pub fn new(
        client: reqwest::Client,
        jwt: String,
        api_url: &str,
        gateway_url: &str,
    ) -> Result<Self, Error> {
        Ok(Self {
            client,
            jwt,
            pin_file_url: Url::parse(api_url)?.join("pinning/pinFileToIPFS")?,
            gateway_url: Url::parse(gateway_url)?,
        })
    }

    pub fn gateway_url(&self, hash: &str) -> Result<String, Error> {
        Ok(self.gateway_url.join(&format!("ipfs/{}", hash))?.to_string())
    }

    /// Upload `bytes` as a single file and pin it.
    pub async fn pin_file(
        &self,
        bytes: Vec<u8>,
        content_type: &str,
        filename: &str,
    ) -> Result<PinnedFile, Error> {
        let part = Part::bytes(bytes)
            .file_name(filename.to_owned())
            .mime_str(content_type)
            .map_err(|_| Error::ContentType(content_type.to_owned()))?;
        let form = Form::new().part("file", part);

        tracing::info!("pinning {} ({})", filename, content_type);
        let resp = self
            .client
            .post(self.pin_file_url.clone())
            .header(AUTHORIZATION, format!("Bearer {}", self.jwt))
            .multipart(form)
            .send()
            .await?;

        let status = resp.status();
        let bytes = resp.bytes().await?;
        let ipfs_hash = parse_pin_response(status, &bytes)?;

        Ok(PinnedFile {
            url: self.gateway_url(&ipfs_hash)?,
            hash: ipfs_hash,
        })
    }
}
