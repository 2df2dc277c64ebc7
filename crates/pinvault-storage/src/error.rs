use thiserror::Error;

pub type StorageResult<T> = Result<T, StorageError>;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("pinning API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("gateway returned {status} for {url}")]
    Gateway { status: u16, url: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("content not found: {0}")]
    NotFound(String),

    #[error("insecure endpoint: {0}")]
    InsecureEndpoint(String),

    #[error("storage config error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
