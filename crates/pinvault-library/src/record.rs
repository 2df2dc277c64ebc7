use chrono::{DateTime, Utc};
use pinvault_core::{FileMetadata, PreviewKind};
use serde::{Deserialize, Serialize};

use crate::folder::ROOT;

/// One uploaded file, as recorded in the library.
///
/// For encrypted uploads `name` is the original file name, while
/// `mime_type` and `size` describe the stored envelope; the `original_*`
/// fields carry what decryption restores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadRecord {
    pub cid: String,
    pub name: String,
    pub size: u64,
    #[serde(rename = "type")]
    pub mime_type: String,
    /// SHA-256 of the stored bytes (hex)
    #[serde(rename = "hash")]
    pub sha256: String,
    pub uploaded_at: DateTime<Utc>,
    pub owner: String,
    #[serde(default = "root_folder")]
    pub folder: String,
    #[serde(default)]
    pub encrypted: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_size: Option<u64>,
    #[serde(rename = "isRealIPFS", default)]
    pub is_real_ipfs: bool,
}

fn root_folder() -> String {
    ROOT.to_string()
}

impl UploadRecord {
    pub fn display_name(&self) -> &str {
        self.original_name.as_deref().unwrap_or(&self.name)
    }

    pub fn display_mime(&self) -> &str {
        self.original_type.as_deref().unwrap_or(&self.mime_type)
    }

    pub fn display_size(&self) -> u64 {
        self.original_size.unwrap_or(self.size)
    }

    /// Metadata of the file a reader ends up with (after decryption, if any)
    pub fn restored_metadata(&self) -> FileMetadata {
        FileMetadata {
            name: self.display_name().to_string(),
            mime_type: self.display_mime().to_string(),
            size: self.display_size(),
        }
    }

    pub fn preview_kind(&self) -> PreviewKind {
        PreviewKind::from_mime(self.display_mime())
    }

    /// Case-insensitive substring match on the displayed name
    pub fn matches(&self, term: &str) -> bool {
        self.display_name()
            .to_lowercase()
            .contains(&term.to_lowercase())
    }
}

#[cfg(test)]
pub(crate) fn sample(cid: &str, name: &str, folder: &str) -> UploadRecord {
    UploadRecord {
        cid: cid.into(),
        name: name.into(),
        size: 100,
        mime_type: pinvault_core::mime_from_filename(name).into(),
        sha256: "00".repeat(32),
        uploaded_at: Utc::now(),
        owner: "tester".into(),
        folder: folder.into(),
        encrypted: false,
        original_name: None,
        original_type: None,
        original_size: None,
        is_real_ipfs: false,
    }
}
