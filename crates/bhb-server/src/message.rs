//! The message a holder signs to authorize a metadata update.
//!
//! Wallets sign the UTF-8 bytes of the compact JSON encoding with keys in
//! the order `action`, `owner`, `mint`, `metadataUri`, `nonce`. Both sides
//! must produce identical bytes, so the encoding goes through one struct.

use ed25519_dalek::{Signature, VerifyingKey};
use serde::{Deserialize, Serialize};

pub const UPDATE_METADATA_ACTION: &str = "BHB_UPDATE_METADATA";

/// Clients send either a string or a number; it is echoed back in the same
/// JSON type when rebuilding the message.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(untagged)]
pub enum Nonce {
    String(String),
    Number(serde_json::Number),
}

impl Nonce {
    /// Empty strings and zero do not count as a nonce.
    pub fn is_empty(&self) -> bool {
        match self {
            Nonce::String(s) => s.is_empty(),
            Nonce::Number(n) => n.as_f64() == Some(0.0),
        }
    }
}

impl From<u64> for Nonce {
    fn from(n: u64) -> Self {
        Nonce::Number(n.into())
    }
}

#[derive(Serialize, Debug)]
pub struct UpdateMessage<'a> {
    pub action: &'a str,
    pub owner: &'a str,
    pub mint: &'a str,
    #[serde(rename = "metadataUri")]
    pub metadata_uri: &'a str,
    pub nonce: &'a Nonce,
}

impl<'a> UpdateMessage<'a> {
    pub fn new(owner: &'a str, mint: &'a str, metadata_uri: &'a str, nonce: &'a Nonce) -> Self {
        Self {
            action: UPDATE_METADATA_ACTION,
            owner,
            mint,
            metadata_uri,
            nonce,
        }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        // only strings and numbers, cannot fail
        serde_json::to_vec(self).unwrap_or_default()
    }

    pub fn verify(&self, owner: &[u8; 32], signature: &[u8; 64]) -> bool {
        let Ok(key) = VerifyingKey::from_bytes(owner) else {
            return false;
        };
        key.verify_strict(&self.to_bytes(), &Signature::from_bytes(signature))
            .is_ok()
    }
}
