//! IPFS gateway URL resolution and gateway reads

use pinvault_core::config::StorageConfig;
use tracing::debug;

use crate::error::{StorageError, StorageResult};
use crate::operator::check_endpoint;

/// Which gateway a URL should point at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GatewayChoice {
    /// Dedicated gateway when configured, otherwise the public one
    #[default]
    Auto,
    Pinata,
    Public,
}

/// Configured gateway bases
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Gateways {
    pub public: String,
    pub pinata: String,
    pub custom: Option<String>,
}

impl Gateways {
    pub fn from_config(cfg: &StorageConfig) -> Self {
        Self {
            public: cfg.public_gateway.clone(),
            pinata: cfg.pinata_gateway.clone(),
            custom: cfg
                .custom_gateway
                .as_ref()
                .map(|g| g.trim().to_string())
                .filter(|g| !g.is_empty()),
        }
    }

    /// Gateway base (ending in `/ipfs/`) for a choice. This is what goes into
    /// the `gateway` parameter of decrypt links.
    pub fn base_for(&self, choice: GatewayChoice) -> String {
        match (choice, &self.custom) {
            (GatewayChoice::Auto, Some(custom)) => {
                format!("{}/ipfs/", custom.trim_end_matches('/'))
            }
            (GatewayChoice::Pinata, _) => self.pinata.clone(),
            _ => self.public.clone(),
        }
    }

    /// Full URL for `cid` on the chosen gateway.
    pub fn url_for(&self, cid: &str, choice: GatewayChoice) -> String {
        join_gateway(&self.base_for(choice), cid)
    }
}

/// `gateway + cid`, inserting a `/` when the gateway lacks a trailing one.
pub fn join_gateway(gateway: &str, cid: &str) -> String {
    if gateway.ends_with('/') {
        format!("{gateway}{cid}")
    } else {
        format!("{gateway}/{cid}")
    }
}

/// Reads content from arbitrary gateways over HTTP(S).
#[derive(Debug, Clone)]
pub struct GatewayClient {
    client: reqwest::Client,
    enforce_tls: bool,
}

impl GatewayClient {
    pub fn new(client: reqwest::Client, enforce_tls: bool) -> Self {
        Self {
            client,
            enforce_tls,
        }
    }

    /// GET `gateway + cid`. Non-2xx responses are errors.
    pub async fn fetch(&self, gateway: &str, cid: &str) -> StorageResult<Vec<u8>> {
        let url = join_gateway(gateway, cid);
        check_endpoint(&url, self.enforce_tls)?;

        debug!(%url, "fetching from gateway");
        let response = self.client.get(&url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(StorageError::Gateway {
                status: status.as_u16(),
                url,
            });
        }

        let bytes = response.bytes().await?;
        debug!(%url, bytes = bytes.len(), "gateway fetch complete");
        Ok(bytes.to_vec())
    }
}
