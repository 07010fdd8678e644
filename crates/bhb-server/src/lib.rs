use actix_web::http::header::HeaderValue;
use bhb_mint::MintConfig;
use serde::Deserialize;

pub mod api;
pub mod chain;
pub mod error;
pub mod message;

fn match_wildcard(pat: &str, origin: &HeaderValue) -> bool {
    let Ok(mut origin_str) = origin.to_str() else {
        return false;
    };

    let mut segments = pat.split('*');

    let Some(first) = segments.next() else {
        return false;
    };
    origin_str = match origin_str.strip_prefix(first) {
        Some(s) => s,
        None => return false,
    };

    for s in segments {
        if s.is_empty() {
            continue;
        }
        match origin_str.find(s) {
            Some(pos) => {
                let wildcard = &origin_str[..pos];
                if !wildcard.chars().all(|c| c.is_ascii_alphanumeric()) {
                    return false;
                }
                origin_str = &origin_str[pos..];
            }
            None => {
                return false;
            }
        }
    }

    true
}

#[derive(Deserialize, Clone, Debug, Default)]
pub struct SolanaConfig {
    /// Overridden by `SOLANA_RPC_URL`.
    #[serde(default)]
    pub rpc_url: Option<String>,
}

/// Values written into every metadata update.
#[derive(Deserialize, Clone, Debug)]
#[serde(default)]
pub struct CollectionConfig {
    pub symbol: String,
    pub seller_fee_basis_points: u16,
    /// Used when the asset has no readable name.
    pub default_name: String,
}

impl Default for CollectionConfig {
    fn default() -> Self {
        Self {
            symbol: "BHB".to_owned(),
            seller_fee_basis_points: 300,
            default_name: "Big Head Billionaire".to_owned(),
        }
    }
}

#[derive(Deserialize, Clone, Debug)]
#[serde(default)]
pub struct PinataConfig {
    pub api_url: String,
    pub gateway_url: String,
    pub default_filename: String,
}

impl Default for PinataConfig {
    fn default() -> Self {
        Self {
            api_url: pinata_client::DEFAULT_API_URL.to_owned(),
            gateway_url: pinata_client::DEFAULT_GATEWAY_URL.to_owned(),
            default_filename: "bhb-upload".to_owned(),
        }
    }
}

#[derive(Deserialize, Clone, Debug)]
pub struct Config {
    #[serde(default = "Config::default_host")]
    pub host: String,
    #[serde(default = "Config::default_port")]
    pub port: u16,
    #[serde(default)]
    pub cors_origins: Vec<String>,
    #[serde(default)]
    pub solana: SolanaConfig,
    #[serde(default)]
    pub collection: CollectionConfig,
    #[serde(default)]
    pub pinata: PinataConfig,
    #[serde(default)]
    pub mint: MintConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: Self::default_host(),
            port: Self::default_port(),
            cors_origins: Vec::new(),
            solana: SolanaConfig::default(),
            collection: CollectionConfig::default(),
            pinata: PinataConfig::default(),
            mint: MintConfig::default(),
        }
    }
}

impl Config {
    pub fn default_host() -> String {
        "127.0.0.1".to_owned()
    }

    pub fn default_port() -> u16 {
        8080
    }

    pub fn get_config() -> Self {
        match std::env::args().nth(1) {
            Some(s) => if s == "-" {
                use std::io::Read;
                let mut buf = String::new();
                std::io::stdin()
                    .read_to_string(&mut buf)
                    .map_err(|error| {
                        tracing::error!("Error reading STDIN: {}", error);
                    })
                    .map(move |_| buf)
            } else {
                std::fs::read_to_string(s).map_err(|error| {
                    tracing::error!("Error reading config: {}", error);
                })
            }
            .and_then(|s| {
                toml::from_str(&s).map_err(|error| {
                    tracing::error!("Error parsing config: {}", error);
                })
            })
            .map_err(|_| {
                tracing::warn!("Invalid config file, using default");
            })
            .unwrap_or_default(),
            None => {
                tracing::info!("No config specified, using default");
                Config::default()
            }
        }
    }

    /// Build a CORS middleware.
    pub fn cors(&self) -> actix_cors::Cors {
        let mut cors = actix_cors::Cors::default()
            .allow_any_header()
            .allowed_methods(["GET", "POST"]);
        for origin in &self.cors_origins {
            if origin == "*" {
                cors = cors.allow_any_origin();
            } else if origin.contains('*') {
                let pattern = origin.clone();
                cors = cors.allowed_origin_fn(move |origin, _| match_wildcard(&pattern, origin));
            } else {
                cors = cors.allowed_origin(origin);
            }
        }
        cors
    }
}

/// Credentials read from the environment. They never come from the config
/// file, except the RPC URL which may be set in either place.
#[derive(Clone, Default)]
pub struct Secrets {
    pub pinata_jwt: Option<String>,
    pub update_authority_secret_key: Option<String>,
    pub rpc_url: Option<String>,
}

impl std::fmt::Debug for Secrets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Secrets")
            .field("pinata_jwt", &self.pinata_jwt.is_some())
            .field(
                "update_authority_secret_key",
                &self.update_authority_secret_key.is_some(),
            )
            .field("rpc_url", &self.rpc_url.is_some())
            .finish()
    }
}

impl Secrets {
    pub const PINATA_JWT: &'static str = "PINATA_JWT";
    pub const UPDATE_AUTHORITY_SECRET_KEY: &'static str = "UPDATE_AUTHORITY_SECRET_KEY";
    pub const SOLANA_RPC_URL: &'static str = "SOLANA_RPC_URL";

    pub fn from_env(config: &Config) -> Self {
        let var = |name: &str| std::env::var(name).ok().filter(|s| !s.is_empty());
        Self {
            pinata_jwt: var(Self::PINATA_JWT),
            update_authority_secret_key: var(Self::UPDATE_AUTHORITY_SECRET_KEY),
            rpc_url: var(Self::SOLANA_RPC_URL).or_else(|| config.solana.rpc_url.clone()),
        }
    }
}
