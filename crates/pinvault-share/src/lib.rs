//! pinvault-share: decrypt links for encrypted uploads
//!
//! A link names the CID, the gateway to fetch it from and the original file
//! name. Whoever holds the link and the password can run
//! [`DecryptLinkWorkflow`] to get the file back.

pub mod error;
pub mod link;
pub mod workflow;

pub use error::{ShareError, ShareResult};
pub use link::{LinkParams, ShareLink, DECRYPT_PATH, DEFAULT_FILENAME};
pub use workflow::{DecryptLinkWorkflow, DecryptedFile, FailureReason, Phase, WorkflowState};
