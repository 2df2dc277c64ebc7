use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{PinvaultError, PinvaultResult};

/// Default public IPFS gateway (path-style, trailing slash included)
pub const DEFAULT_PUBLIC_GATEWAY: &str = "https://ipfs.io/ipfs/";

/// Default Pinata gateway
pub const DEFAULT_PINATA_GATEWAY: &str = "https://gateway.pinata.cloud/ipfs/";

/// Top-level client configuration (loaded from config.toml)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PinvaultConfig {
    pub storage: StorageConfig,
    pub crypto: CryptoConfig,
    pub library: LibraryConfig,
    pub share: ShareConfig,
    pub log: LogConfig,
}

impl PinvaultConfig {
    /// Load configuration from a TOML file. A missing file yields defaults.
    pub fn load(path: &Path) -> PinvaultResult<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "config file not found, using defaults");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would make every later operation fail.
    pub fn validate(&self) -> PinvaultResult<()> {
        if self.crypto.kdf_iterations == 0 {
            return Err(PinvaultError::Config(
                "crypto.kdf_iterations must be greater than zero".into(),
            ));
        }
        if self.storage.public_gateway.trim().is_empty() {
            return Err(PinvaultError::Config(
                "storage.public_gateway must not be empty".into(),
            ));
        }
        if self.library.storage_quota_bytes == 0 {
            return Err(PinvaultError::Config(
                "library.storage_quota_bytes must be greater than zero".into(),
            ));
        }
        Ok(())
    }

    /// Serialize for display with the pinning JWT masked.
    pub fn to_redacted_toml(&self) -> PinvaultResult<String> {
        let mut shown = self.clone();
        if shown.storage.pinata_jwt.is_some() {
            shown.storage.pinata_jwt = Some("[REDACTED]".into());
        }
        toml::to_string_pretty(&shown)
            .map_err(|e| PinvaultError::Config(format!("serializing config: {e}")))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Pinata API base URL
    pub pinata_api_url: String,
    /// Pinata JWT; when absent, uploads go to the local simulated store
    pub pinata_jwt: Option<String>,
    /// Public gateway used for reads and share links
    pub public_gateway: String,
    /// Pinata gateway
    pub pinata_gateway: String,
    /// Dedicated Pinata gateway host (e.g. https://example.mypinata.cloud)
    pub custom_gateway: Option<String>,
    /// Directory backing the simulated store
    pub local_store_dir: PathBuf,
    /// HTTP request timeout in seconds
    pub request_timeout_secs: u64,
    /// Refuse plaintext-HTTP gateways and API endpoints
    pub enforce_tls: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            pinata_api_url: "https://api.pinata.cloud".into(),
            pinata_jwt: None,
            public_gateway: DEFAULT_PUBLIC_GATEWAY.into(),
            pinata_gateway: DEFAULT_PINATA_GATEWAY.into(),
            custom_gateway: None,
            local_store_dir: PathBuf::from("~/.local/share/pinvault/blobs"),
            request_timeout_secs: 60,
            enforce_tls: false,
        }
    }
}

/// Client-side encryption configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CryptoConfig {
    /// PBKDF2-HMAC-SHA256 iterations. Not recorded in the envelope, so any
    /// value other than the default yields envelopes other clients cannot open.
    pub kdf_iterations: u32,
    /// Minimum password length accepted when encrypting
    pub min_password_len: usize,
}

impl Default for CryptoConfig {
    fn default() -> Self {
        Self {
            kdf_iterations: 100_000,
            min_password_len: 8,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LibraryConfig {
    /// Upload library JSON file
    pub path: PathBuf,
    /// Account label the library is scoped to
    pub owner: String,
    /// Quota used for the storage usage percentage in stats
    pub storage_quota_bytes: u64,
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("~/.local/share/pinvault/library.json"),
            owner: "default".into(),
            storage_quota_bytes: 1024 * 1024 * 1024,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ShareConfig {
    /// Origin that serves the decrypt page, e.g. https://vault.example.com
    pub base_url: String,
}

impl Default for ShareConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5173".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Log level (default: warn)
    pub level: String,
    /// Log format: "json" or "text"
    pub format: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "warn".into(),
            format: "text".into(),
        }
    }
}

/// Expand `~` in path to the user's home directory
pub fn expand_tilde(path: &Path) -> PathBuf {
    let s = path.to_string_lossy();
    match s.strip_prefix("~/") {
        Some(rest) => {
            let home = std::env::var("HOME").unwrap_or_default();
            PathBuf::from(home).join(rest)
        }
        None => path.to_path_buf(),
    }
}
