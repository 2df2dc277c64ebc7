use thiserror::Error;

use crate::workflow::Phase;

pub type ShareResult<T> = Result<T, ShareError>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ShareError {
    #[error("no file CID provided")]
    MissingCid,

    #[error("please enter a password")]
    PasswordRequired,

    #[error("cannot {action} while {phase}")]
    InvalidTransition { phase: Phase, action: &'static str },

    #[error("invalid share link: {0}")]
    InvalidLink(String),
}
