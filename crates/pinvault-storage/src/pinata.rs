//! Pinata pinning API backend.
//!
//! Uploads use `POST /pinning/pinFileToIPFS` (multipart, CIDv1), deletes use
//! `DELETE /pinning/unpin/{cid}`, reads go through the configured gateway.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::{debug, info};

use crate::error::{StorageError, StorageResult};
use crate::gateway::{GatewayChoice, GatewayClient, Gateways};
use crate::store::ContentStore;

#[derive(Debug, Deserialize)]
struct PinResponse {
    #[serde(rename = "IpfsHash")]
    ipfs_hash: String,
}

pub struct PinataStore {
    client: Client,
    api_url: String,
    jwt: SecretString,
    gateways: Gateways,
    gateway_client: GatewayClient,
}

impl std::fmt::Debug for PinataStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PinataStore")
            .field("api_url", &self.api_url)
            .field("jwt", &"[REDACTED]")
            .field("gateways", &self.gateways)
            .finish()
    }
}

impl PinataStore {
    pub fn new(
        client: Client,
        api_url: &str,
        jwt: SecretString,
        gateways: Gateways,
        enforce_tls: bool,
    ) -> Self {
        Self {
            gateway_client: GatewayClient::new(client.clone(), enforce_tls),
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
            jwt,
            gateways,
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.api_url, path)
    }
}

/// Pull a human-readable message out of a failed API response.
///
/// Pinata reports `{"error": "..."}` or `{"error": {"reason": .., "details": ..}}`;
/// anything else falls back to the status text.
async fn api_error(response: Response) -> StorageError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();

    let message = serde_json::from_str::<serde_json::Value>(&body)
        .ok()
        .and_then(|v| v.get("error").cloned())
        .map(|err| match err {
            serde_json::Value::String(s) => s,
            serde_json::Value::Object(obj) => {
                let reason = obj.get("reason").and_then(|r| r.as_str());
                let details = obj.get("details").and_then(|d| d.as_str());
                match (reason, details) {
                    (Some(r), Some(d)) => format!("{r}: {d}"),
                    (Some(r), None) => r.to_string(),
                    (None, Some(d)) => d.to_string(),
                    (None, None) => serde_json::Value::Object(obj).to_string(),
                }
            }
            other => other.to_string(),
        })
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("unknown error")
                .to_string()
        });

    StorageError::Api {
        status: status.as_u16(),
        message,
    }
}

#[async_trait]
impl ContentStore for PinataStore {
    fn backend_name(&self) -> &'static str {
        "pinata"
    }

    fn is_real_ipfs(&self) -> bool {
        true
    }

    async fn put(&self, name: &str, bytes: &[u8]) -> StorageResult<String> {
        let metadata = serde_json::json!({ "name": name }).to_string();
        let options = serde_json::json!({ "cidVersion": 1 }).to_string();

        let part = Part::bytes(bytes.to_vec()).file_name(name.to_string());
        let form = Form::new()
            .part("file", part)
            .text("pinataMetadata", metadata)
            .text("pinataOptions", options);

        debug!(name, bytes = bytes.len(), "pinning file");
        let response = self
            .client
            .post(self.endpoint("/pinning/pinFileToIPFS"))
            .bearer_auth(self.jwt.expose_secret())
            .multipart(form)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(api_error(response).await);
        }

        let pinned: PinResponse = response.json().await?;
        info!(name, cid = %pinned.ipfs_hash, "pinned to IPFS");
        Ok(pinned.ipfs_hash)
    }

    async fn get(&self, cid: &str) -> StorageResult<Vec<u8>> {
        let base = self.gateways.base_for(GatewayChoice::Auto);
        match self.gateway_client.fetch(&base, cid).await {
            Err(StorageError::Gateway { status: 404, .. }) => {
                Err(StorageError::NotFound(cid.to_string()))
            }
            other => other,
        }
    }

    async fn remove(&self, cid: &str) -> StorageResult<()> {
        debug!(cid, "unpinning");
        let response = self
            .client
            .delete(self.endpoint(&format!("/pinning/unpin/{cid}")))
            .bearer_auth(self.jwt.expose_secret())
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(api_error(response).await);
        }

        info!(cid, "unpinned from IPFS");
        Ok(())
    }

    async fn ping(&self) -> StorageResult<()> {
        let response = self
            .client
            .get(self.endpoint("/data/testAuthentication"))
            .bearer_auth(self.jwt.expose_secret())
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(api_error(response).await);
        }
        Ok(())
    }
}
