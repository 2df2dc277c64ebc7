//! Storage health check

use crate::error::StorageResult;
use crate::store::ContentStore;

/// Verify the store is reachable and its credentials are accepted
pub async fn check_health(store: &dyn ContentStore) -> StorageResult<()> {
    store.ping().await.map_err(|e| {
        tracing::warn!(backend = store.backend_name(), "storage health check failed: {e}");
        e
    })
}

/// Returns true if storage is reachable, false otherwise (non-panicking)
pub async fn is_healthy(store: &dyn ContentStore) -> bool {
    check_health(store).await.is_ok()
}
