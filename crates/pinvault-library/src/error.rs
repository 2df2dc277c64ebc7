use thiserror::Error;

pub type LibraryResult<T> = Result<T, LibraryError>;

#[derive(Debug, Error)]
pub enum LibraryError {
    #[error("no upload with CID {0}")]
    NotFound(String),

    #[error("folder already exists: {0}")]
    FolderExists(String),

    #[error("folder not found: {0}")]
    FolderNotFound(String),

    #[error("invalid folder name: {0:?}")]
    InvalidFolderName(String),

    #[error("the root folder cannot be deleted")]
    RootFolder,

    #[error("{0} is encrypted; a password is required")]
    PasswordRequired(String),

    #[error("integrity check failed for {cid}: content does not match recorded SHA-256")]
    IntegrityMismatch { cid: String },

    #[error("reading library {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("parsing library {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("writing library {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("serializing library: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error(transparent)]
    Storage(#[from] pinvault_storage::StorageError),

    #[error(transparent)]
    Crypto(#[from] pinvault_crypto::CryptoError),

    #[error("background task failed: {0}")]
    Task(String),
}
