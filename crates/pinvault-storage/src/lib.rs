//! pinvault-storage: content-addressed storage behind one trait
//!
//! - `PinataStore`: pins through the Pinata API, reads through an IPFS gateway
//! - `LocalStore`: simulated IPFS in a local directory (no credentials needed)
//! - `GatewayClient`: plain gateway reads, used by the decrypt-link flow

pub mod error;
pub mod gateway;
pub mod health;
pub mod local;
pub mod operator;
pub mod pinata;
pub mod store;

pub use error::{StorageError, StorageResult};
pub use gateway::{GatewayChoice, GatewayClient, Gateways};
pub use health::{check_health, is_healthy};
pub use local::LocalStore;
pub use operator::{build_from_core_config, build_http_client};
pub use pinata::PinataStore;
pub use store::ContentStore;
