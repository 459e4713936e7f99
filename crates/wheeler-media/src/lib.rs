//! # wheeler-media — Blob Store Adapters
//!
//! Persists uploaded image bytes and hands back the reference that gets
//! stored on the brand or car document.
//!
//! ## Backends
//!
//! | Backend | Reference shape | Use |
//! |---|---|---|
//! | [`LocalBlobStore`] | `/storage/<scope>/<file>` | default; served by the API as static files |
//! | [`DriveBlobStore`] | `https://drive.google.com/file/d/<id>/view` | remote file API; rewritten to CDN URLs on read |
//! | [`MemoryBlobStore`] | `/storage/<scope>/<file>` | tests and throwaway dev instances |
//!
//! All backends implement [`BlobStore`] and are shared as
//! `Arc<dyn BlobStore>`. Storage locations are passed in explicitly at
//! construction; nothing is created on disk until
//! [`LocalBlobStore::init`] is called during bootstrap.

pub mod drive;
pub mod error;
pub mod local;
pub mod memory;
pub mod naming;

use async_trait::async_trait;
use bytes::Bytes;

pub use drive::{DriveBlobStore, DriveConfig};
pub use error::BlobError;
pub use local::LocalBlobStore;
pub use memory::MemoryBlobStore;
pub use naming::{sanitize_file_name, timestamped_name};

/// Resource family an upload belongs to. Each scope gets its own directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlobScope {
    Brands,
    Cars,
}

impl BlobScope {
    /// Directory (and URL segment) name for this scope.
    pub fn dir_name(self) -> &'static str {
        match self {
            Self::Brands => "brands",
            Self::Cars => "cars",
        }
    }

    pub const ALL: [BlobScope; 2] = [BlobScope::Brands, BlobScope::Cars];
}

/// A single file to persist.
#[derive(Debug, Clone)]
pub struct Upload {
    pub scope: BlobScope,
    /// Target file name. Backends sanitise it before use.
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

/// Result of a successful upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredBlob {
    /// Reference to store on the owning document.
    pub reference: String,
    pub scope: BlobScope,
    pub size: usize,
}

/// Persistence seam for uploaded images.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Short backend name for logs and diagnostics.
    fn backend(&self) -> &'static str;

    /// Persist one upload and return its public reference.
    async fn put(&self, upload: Upload) -> Result<StoredBlob, BlobError>;
}
