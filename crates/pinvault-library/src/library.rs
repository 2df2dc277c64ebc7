//! Persistent upload library: one JSON file, one section per owner.
//!
//! The whole file is loaded into memory on open and flushed atomically via
//! temp+rename. Sections belonging to other owners are carried through
//! untouched.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{LibraryError, LibraryResult};
use crate::folder::{self, ROOT};
use crate::record::UploadRecord;

const FORMAT_VERSION: u32 = 1;

/// Files and folders belonging to one owner
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OwnerSection {
    #[serde(default)]
    pub files: Vec<UploadRecord>,
    #[serde(default)]
    pub folders: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
struct LibraryFile {
    #[serde(default)]
    owners: BTreeMap<String, OwnerSection>,
}

#[derive(Serialize)]
struct LibraryFileRef<'a> {
    version: u32,
    owners: BTreeMap<&'a str, &'a OwnerSection>,
}

/// What a folder delete took with it
#[derive(Debug, Clone, PartialEq)]
pub struct FolderRemoval {
    /// Folders removed (the target and its descendants)
    pub folders: Vec<String>,
    /// Records that lived in any removed folder
    pub records: Vec<UploadRecord>,
    /// Where the caller should navigate next
    pub parent: String,
}

/// The upload library for a single owner
pub struct Library {
    path: PathBuf,
    owner: String,
    section: OwnerSection,
    others: BTreeMap<String, OwnerSection>,
    dirty: bool,
}

impl Library {
    /// Load or create the library at `path`, scoped to `owner`.
    /// If the file doesn't exist, starts empty.
    pub fn open(path: &Path, owner: &str) -> LibraryResult<Self> {
        let mut file = if path.exists() {
            let content = std::fs::read_to_string(path).map_err(|source| LibraryError::Read {
                path: path.display().to_string(),
                source,
            })?;
            serde_json::from_str::<LibraryFile>(&content).map_err(|source| {
                LibraryError::Parse {
                    path: path.display().to_string(),
                    source,
                }
            })?
        } else {
            LibraryFile::default()
        };

        let section = file.owners.remove(owner).unwrap_or_default();
        debug!(
            path = %path.display(),
            owner,
            files = section.files.len(),
            folders = section.folders.len(),
            "opened library"
        );

        Ok(Self {
            path: path.to_path_buf(),
            owner: owner.to_string(),
            section,
            others: file.owners,
            dirty: false,
        })
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Flush dirty changes to disk using an atomic write (write then rename).
    pub fn flush(&mut self) -> LibraryResult<()> {
        if !self.dirty {
            return Ok(());
        }

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| LibraryError::Write {
                path: parent.display().to_string(),
                source,
            })?;
        }

        let mut owners: BTreeMap<&str, &OwnerSection> =
            self.others.iter().map(|(k, v)| (k.as_str(), v)).collect();
        owners.insert(self.owner.as_str(), &self.section);
        let json = serde_json::to_string_pretty(&LibraryFileRef {
            version: FORMAT_VERSION,
            owners,
        })?;

        let tmp_path = self.path.with_extension("tmp");
        std::fs::write(&tmp_path, &json).map_err(|source| LibraryError::Write {
            path: tmp_path.display().to_string(),
            source,
        })?;
        std::fs::rename(&tmp_path, &self.path).map_err(|source| LibraryError::Write {
            path: self.path.display().to_string(),
            source,
        })?;

        self.dirty = false;
        Ok(())
    }

    // ── Records ──────────────────────────────────────────────────────────

    /// Record an upload. A record with the same CID is replaced.
    pub fn add(&mut self, record: UploadRecord) -> LibraryResult<()> {
        if !self.folder_exists(&record.folder) {
            return Err(LibraryError::FolderNotFound(record.folder));
        }
        if let Some(existing) = self.section.files.iter_mut().find(|r| r.cid == record.cid) {
            debug!(cid = %record.cid, "replacing existing record");
            *existing = record;
        } else {
            self.section.files.push(record);
        }
        self.dirty = true;
        Ok(())
    }

    pub fn get(&self, cid: &str) -> Option<&UploadRecord> {
        self.section.files.iter().find(|r| r.cid == cid)
    }

    /// Remove a record by CID, returning it.
    pub fn remove(&mut self, cid: &str) -> Option<UploadRecord> {
        let idx = self.section.files.iter().position(|r| r.cid == cid)?;
        self.dirty = true;
        Some(self.section.files.remove(idx))
    }

    pub fn records(&self) -> &[UploadRecord] {
        &self.section.files
    }

    /// Records directly inside `folder` (not its subfolders).
    pub fn list_folder(&self, folder: &str) -> Vec<&UploadRecord> {
        let folder = folder::normalize(folder);
        self.section
            .files
            .iter()
            .filter(|r| r.folder == folder)
            .collect()
    }

    /// Records in `folder` whose name contains `term`, ignoring case.
    /// An empty term lists the folder.
    pub fn search(&self, folder: &str, term: &str) -> Vec<&UploadRecord> {
        let term = term.trim();
        self.list_folder(folder)
            .into_iter()
            .filter(|r| term.is_empty() || r.matches(term))
            .collect()
    }

    // ── Folders ──────────────────────────────────────────────────────────

    pub fn folders(&self) -> &[String] {
        &self.section.folders
    }

    pub fn folder_exists(&self, path: &str) -> bool {
        path == ROOT || self.section.folders.iter().any(|f| f == path)
    }

    /// Create folder `name` under `parent`, returning its path.
    pub fn create_folder(&mut self, parent: &str, name: &str) -> LibraryResult<String> {
        let parent = folder::normalize(parent);
        if !self.folder_exists(&parent) {
            return Err(LibraryError::FolderNotFound(parent));
        }
        let path = folder::child_path(&parent, name)?;
        if self.folder_exists(&path) {
            return Err(LibraryError::FolderExists(path));
        }
        self.section.folders.push(path.clone());
        self.dirty = true;
        debug!(folder = %path, "created folder");
        Ok(path)
    }

    /// Direct children of `parent`, sorted.
    pub fn subfolders(&self, parent: &str) -> Vec<&str> {
        let parent = folder::normalize(parent);
        let mut children: Vec<&str> = self
            .section
            .folders
            .iter()
            .filter(|f| folder::parent_of(f) == parent)
            .map(String::as_str)
            .collect();
        children.sort_unstable();
        children
    }

    /// Delete a folder, its descendants and every record inside them.
    ///
    /// Matching is on whole path components: deleting `/a` leaves `/ab`
    /// alone. The removed records are returned so the caller can unpin them.
    pub fn delete_folder(&mut self, path: &str) -> LibraryResult<FolderRemoval> {
        let path = folder::normalize(path);
        if path == ROOT {
            return Err(LibraryError::RootFolder);
        }
        if !self.folder_exists(&path) {
            return Err(LibraryError::FolderNotFound(path));
        }

        let (removed_folders, kept_folders): (Vec<String>, Vec<String>) = self
            .section
            .folders
            .drain(..)
            .partition(|f| folder::is_within(f, &path));
        self.section.folders = kept_folders;

        let (removed_records, kept_records): (Vec<UploadRecord>, Vec<UploadRecord>) = self
            .section
            .files
            .drain(..)
            .partition(|r| folder::is_within(&r.folder, &path));
        self.section.files = kept_records;

        self.dirty = true;
        debug!(
            folder = %path,
            folders = removed_folders.len(),
            records = removed_records.len(),
            "deleted folder"
        );

        Ok(FolderRemoval {
            parent: folder::parent_of(&path),
            folders: removed_folders,
            records: removed_records,
        })
    }
}

impl Drop for Library {
    fn drop(&mut self) {
        if self.dirty {
            if let Err(e) = self.flush() {
                warn!("failed to flush library on drop: {e}");
            }
        }
    }
}
