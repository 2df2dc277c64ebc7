use thiserror::Error;

pub type PinvaultResult<T> = Result<T, PinvaultError>;

/// Errors from loading and validating the client configuration.
///
/// The other crates keep their own typed errors at their public seams.
#[derive(Debug, Error)]
pub enum PinvaultError {
    #[error("config error: {0}")]
    Config(String),

    #[error("config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
