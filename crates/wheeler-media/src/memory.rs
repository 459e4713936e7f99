//! In-memory blob store for tests and throwaway instances.

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::naming::sanitize_file_name;
use crate::{BlobError, BlobStore, StoredBlob, Upload};

/// Keeps every upload in memory. References mimic the local backend.
#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    uploads: Mutex<Vec<Upload>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything uploaded so far, in upload order.
    pub fn uploads(&self) -> Vec<Upload> {
        self.uploads.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.uploads.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.uploads.lock().is_empty()
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn put(&self, upload: Upload) -> Result<StoredBlob, BlobError> {
        let file_name = sanitize_file_name(&upload.file_name);
        let stored = StoredBlob {
            reference: format!("/storage/{}/{}", upload.scope.dir_name(), file_name),
            scope: upload.scope,
            size: upload.bytes.len(),
        };
        self.uploads.lock().push(upload);
        Ok(stored)
    }
}
