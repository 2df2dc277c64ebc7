pub mod config;
pub mod error;
pub mod types;

pub use error::{PinvaultError, PinvaultResult};
pub use types::{format_size, mime_from_filename, FileMetadata, PreviewKind};
