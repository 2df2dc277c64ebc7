//! Store and HTTP client factory for pinvault storage backends

use std::sync::Arc;
use std::time::Duration;

use pinvault_core::config::{expand_tilde, StorageConfig};
use secrecy::SecretString;

use crate::error::{StorageError, StorageResult};
use crate::gateway::Gateways;
use crate::local::LocalStore;
use crate::pinata::PinataStore;
use crate::store::ContentStore;

/// Build the shared HTTP client used for the pinning API and gateways.
pub fn build_http_client(timeout_secs: u64) -> StorageResult<reqwest::Client> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs.max(1)))
        .user_agent(concat!("pinvault/", env!("CARGO_PKG_VERSION")))
        .build()?;
    Ok(client)
}

/// Reject or warn about plaintext-HTTP endpoints.
///
/// If `enforce_tls` is true and the URL uses HTTP, this returns an error.
/// Otherwise a warning is logged.
pub fn check_endpoint(url: &str, enforce_tls: bool) -> StorageResult<()> {
    if url.starts_with("http://") {
        if enforce_tls {
            return Err(StorageError::InsecureEndpoint(format!(
                "{url} uses plaintext HTTP, but enforce_tls is enabled. \
                 Use an HTTPS endpoint or set storage.enforce_tls = false for local development."
            )));
        }
        tracing::warn!(
            endpoint = %url,
            "endpoint uses plaintext HTTP; set storage.enforce_tls = true and use HTTPS in production"
        );
    }
    Ok(())
}

/// Build the content store for this configuration.
///
/// With a pinning JWT (from config or passed in by the caller) uploads go to
/// Pinata. Without one they go to the simulated local store.
pub fn build_from_core_config(
    storage: &StorageConfig,
    pinata_jwt: Option<SecretString>,
) -> StorageResult<Arc<dyn ContentStore>> {
    let jwt = pinata_jwt.or_else(|| {
        storage
            .pinata_jwt
            .as_ref()
            .filter(|j| !j.trim().is_empty())
            .map(|j| SecretString::from(j.clone()))
    });

    match jwt {
        Some(jwt) => {
            check_endpoint(&storage.pinata_api_url, storage.enforce_tls)?;
            let client = build_http_client(storage.request_timeout_secs)?;
            let store = PinataStore::new(
                client,
                &storage.pinata_api_url,
                jwt,
                Gateways::from_config(storage),
                storage.enforce_tls,
            );
            Ok(Arc::new(store))
        }
        None => {
            let dir = expand_tilde(&storage.local_store_dir);
            Ok(Arc::new(LocalStore::new(dir)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_endpoint_http_warning() {
        assert!(check_endpoint("http://localhost:8080/ipfs/", false).is_ok());
    }

    #[test]
    fn test_check_endpoint_http_enforce_tls() {
        let err = check_endpoint("http://insecure:8080/ipfs/", true).unwrap_err();
        assert!(matches!(err, StorageError::InsecureEndpoint(_)));
        assert!(err.to_string().contains("enforce_tls"));
    }

    #[test]
    fn test_check_endpoint_https() {
        assert!(check_endpoint("https://ipfs.io/ipfs/", true).is_ok());
    }

    #[test]
    fn test_build_without_jwt_uses_local_store() {
        let tmp = tempfile::tempdir().unwrap();
        let storage = StorageConfig {
            local_store_dir: tmp.path().to_path_buf(),
            ..Default::default()
        };
        let store = build_from_core_config(&storage, None).unwrap();
        assert_eq!(store.backend_name(), "local");
        assert!(!store.is_real_ipfs());
    }

    #[test]
    fn test_build_with_config_jwt_uses_pinata() {
        let storage = StorageConfig {
            pinata_jwt: Some("jwt-from-config".into()),
            ..Default::default()
        };
        let store = build_from_core_config(&storage, None).unwrap();
        assert_eq!(store.backend_name(), "pinata");
        assert!(store.is_real_ipfs());
    }

    #[test]
    fn test_blank_config_jwt_is_ignored() {
        let tmp = tempfile::tempdir().unwrap();
        let storage = StorageConfig {
            pinata_jwt: Some("  ".into()),
            local_store_dir: tmp.path().to_path_buf(),
            ..Default::default()
        };
        let store = build_from_core_config(&storage, None).unwrap();
        assert_eq!(store.backend_name(), "local");
    }

    #[test]
    fn test_pinata_over_http_with_enforce_tls_fails() {
        let storage = StorageConfig {
            pinata_api_url: "http://api.internal".into(),
            enforce_tls: true,
            ..Default::default()
        };
        let result = build_from_core_config(&storage, Some(SecretString::from("jwt".to_string())));
        assert!(result.is_err(), "HTTP + enforce_tls must fail");
    }
}
