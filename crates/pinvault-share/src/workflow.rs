//! Password-protected decrypt-link workflow.
//!
//! ```text
//! AwaitingPassword ──submit──▶ Fetching ──▶ Decrypting ──▶ Success
//!        ▲                        │              │
//!        │                        ▼              ▼
//!        └────────retry──────── Failed ◀─────────┘
//! ```
//!
//! `Success` only returns to `AwaitingPassword` through `restart`. Each phase
//! change is published on a `watch` channel so a UI can follow along while
//! `submit` is in flight.

use std::fmt;

use pinvault_core::{mime_from_filename, PreviewKind};
use pinvault_crypto::FileCipher;
use pinvault_storage::GatewayClient;
use secrecy::{ExposeSecret, SecretString};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::error::{ShareError, ShareResult};
use crate::link::LinkParams;

/// Where the workflow currently is, without its payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    AwaitingPassword,
    Fetching,
    Decrypting,
    Success,
    Failed,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::AwaitingPassword => "awaiting password",
            Self::Fetching => "fetching",
            Self::Decrypting => "decrypting",
            Self::Success => "decrypted",
            Self::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Why a run ended in `Failed`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureReason {
    /// Gateway unreachable or non-2xx
    FetchFailed,
    /// Wrong password, tampered or malformed envelope
    DecryptionFailed,
}

/// The decrypted file, ready to preview or save
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecryptedFile {
    pub bytes: Vec<u8>,
    pub name: String,
    pub mime_type: &'static str,
    pub size: u64,
    pub preview: PreviewKind,
}

#[derive(Debug)]
pub enum WorkflowState {
    AwaitingPassword,
    Fetching,
    Decrypting,
    Success(DecryptedFile),
    Failed {
        reason: FailureReason,
        message: String,
    },
}

impl WorkflowState {
    pub fn phase(&self) -> Phase {
        match self {
            Self::AwaitingPassword => Phase::AwaitingPassword,
            Self::Fetching => Phase::Fetching,
            Self::Decrypting => Phase::Decrypting,
            Self::Success(_) => Phase::Success,
            Self::Failed { .. } => Phase::Failed,
        }
    }
}

pub struct DecryptLinkWorkflow {
    params: LinkParams,
    password: Option<SecretString>,
    state: WorkflowState,
    gateway: GatewayClient,
    cipher: FileCipher,
    phase_tx: watch::Sender<Phase>,
}

impl DecryptLinkWorkflow {
    pub fn new(params: LinkParams, gateway: GatewayClient, cipher: FileCipher) -> Self {
        let (phase_tx, _) = watch::channel(Phase::AwaitingPassword);
        debug!(
            cid = params.cid.as_deref().unwrap_or("<none>"),
            gateway = %params.gateway,
            name = %params.name,
            "decrypt link opened"
        );
        Self {
            params,
            password: None,
            state: WorkflowState::AwaitingPassword,
            gateway,
            cipher,
            phase_tx,
        }
    }

    pub fn params(&self) -> &LinkParams {
        &self.params
    }

    pub fn state(&self) -> &WorkflowState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        self.state.phase()
    }

    /// Follow phase changes (including those made during `submit`).
    pub fn subscribe(&self) -> watch::Receiver<Phase> {
        self.phase_tx.subscribe()
    }

    /// The decrypted file, once in `Success`.
    pub fn file(&self) -> Option<&DecryptedFile> {
        match &self.state {
            WorkflowState::Success(file) => Some(file),
            _ => None,
        }
    }

    pub fn set_password(&mut self, password: SecretString) -> ShareResult<()> {
        self.require(Phase::AwaitingPassword, "enter a password")?;
        self.password = Some(password);
        Ok(())
    }

    /// Fetch and decrypt.
    ///
    /// Refused without changing state when not awaiting a password, when the
    /// password is empty or when the link has no CID. Fetch and decryption
    /// failures are not errors here: they land in `Failed`.
    pub async fn submit(&mut self) -> ShareResult<&WorkflowState> {
        self.require(Phase::AwaitingPassword, "submit")?;
        let has_password = self
            .password
            .as_ref()
            .is_some_and(|p| !p.expose_secret().is_empty());
        if !has_password {
            return Err(ShareError::PasswordRequired);
        }
        let cid = self.params.cid.clone().ok_or(ShareError::MissingCid)?;
        let password = self.password.take().ok_or(ShareError::PasswordRequired)?;

        self.transition(WorkflowState::Fetching);
        let envelope = match self.gateway.fetch(&self.params.gateway, &cid).await {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(%cid, "failed to download file from IPFS: {e}");
                self.transition(WorkflowState::Failed {
                    reason: FailureReason::FetchFailed,
                    message: format!("failed to download file from IPFS: {e}"),
                });
                return Ok(&self.state);
            }
        };
        debug!(%cid, bytes = envelope.len(), "envelope downloaded");

        self.transition(WorkflowState::Decrypting);
        let cipher = self.cipher.clone();
        let decrypted =
            tokio::task::spawn_blocking(move || cipher.decrypt(&envelope, &password)).await;

        let next = match decrypted {
            Ok(Ok(bytes)) => {
                let mime_type = mime_from_filename(&self.params.name);
                info!(%cid, name = %self.params.name, bytes = bytes.len(), "decrypted");
                WorkflowState::Success(DecryptedFile {
                    size: bytes.len() as u64,
                    name: self.params.name.clone(),
                    preview: PreviewKind::from_mime(mime_type),
                    mime_type,
                    bytes,
                })
            }
            Ok(Err(e)) => WorkflowState::Failed {
                reason: FailureReason::DecryptionFailed,
                message: e.to_string(),
            },
            Err(e) => {
                warn!("decrypt task failed: {e}");
                WorkflowState::Failed {
                    reason: FailureReason::DecryptionFailed,
                    message: pinvault_crypto::CryptoError::DecryptionFailed.to_string(),
                }
            }
        };
        self.transition(next);
        Ok(&self.state)
    }

    /// `Failed -> AwaitingPassword`, keeping the link and clearing the password.
    pub fn retry(&mut self) -> ShareResult<()> {
        self.require(Phase::Failed, "retry")?;
        self.password = None;
        self.transition(WorkflowState::AwaitingPassword);
        Ok(())
    }

    /// Back to `AwaitingPassword` from a finished run, dropping any result.
    pub fn restart(&mut self) -> ShareResult<()> {
        match self.phase() {
            Phase::Fetching | Phase::Decrypting => Err(ShareError::InvalidTransition {
                phase: self.phase(),
                action: "restart",
            }),
            _ => {
                self.password = None;
                self.transition(WorkflowState::AwaitingPassword);
                Ok(())
            }
        }
    }

    fn require(&self, phase: Phase, action: &'static str) -> ShareResult<()> {
        if self.phase() != phase {
            return Err(ShareError::InvalidTransition {
                phase: self.phase(),
                action,
            });
        }
        Ok(())
    }

    fn transition(&mut self, next: WorkflowState) {
        debug!(from = %self.phase(), to = %next.phase(), "decrypt workflow");
        self.state = next;
        self.phase_tx.send_replace(self.state.phase());
    }
}
