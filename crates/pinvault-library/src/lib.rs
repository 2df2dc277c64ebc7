//! pinvault-library: the per-owner upload library
//!
//! - `Library`: records and virtual folders in a JSON file
//! - `UploadService`: upload / fetch / delete against a `ContentStore`
//! - `LibraryStats`: analytics over the recorded uploads

pub mod error;
pub mod folder;
pub mod library;
pub mod record;
pub mod stats;
pub mod uploads;

pub use error::{LibraryError, LibraryResult};
pub use folder::{breadcrumbs, Breadcrumb, ROOT};
pub use library::{FolderRemoval, Library};
pub use record::UploadRecord;
pub use stats::{LibraryStats, TypeBreakdown};
pub use uploads::{FetchedFile, UploadService, ENCRYPTED_SUFFIX};
