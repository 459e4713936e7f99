//! Local-disk blob store.
//!
//! Files land in `<root>/<scope>/<file>` and are referenced as
//! `<public_prefix>/<scope>/<file>`, which the API serves as static files.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::naming::sanitize_file_name;
use crate::{BlobError, BlobScope, BlobStore, StoredBlob, Upload};

/// URL prefix under which the API exposes the storage root.
pub const DEFAULT_PUBLIC_PREFIX: &str = "/storage";

#[derive(Debug, Clone)]
pub struct LocalBlobStore {
    root: PathBuf,
    public_prefix: String,
}

impl LocalBlobStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            public_prefix: DEFAULT_PUBLIC_PREFIX.to_string(),
        }
    }

    /// Override the URL prefix used in returned references.
    pub fn with_public_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.public_prefix = prefix.into().trim_end_matches('/').to_string();
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the per-scope directories. Called once during bootstrap.
    pub async fn init(&self) -> Result<(), BlobError> {
        for scope in BlobScope::ALL {
            let dir = self.scope_dir(scope);
            tokio::fs::create_dir_all(&dir)
                .await
                .map_err(|source| BlobError::Io { path: dir.clone(), source })?;
        }
        tracing::info!(root = %self.root.display(), "local blob storage ready");
        Ok(())
    }

    fn scope_dir(&self, scope: BlobScope) -> PathBuf {
        self.root.join(scope.dir_name())
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    fn backend(&self) -> &'static str {
        "local"
    }

    async fn put(&self, upload: Upload) -> Result<StoredBlob, BlobError> {
        let file_name = sanitize_file_name(&upload.file_name);
        let path = self.scope_dir(upload.scope).join(&file_name);
        let size = upload.bytes.len();

        tokio::fs::write(&path, &upload.bytes)
            .await
            .map_err(|source| BlobError::Io { path: path.clone(), source })?;

        tracing::debug!(path = %path.display(), size, "stored blob on local disk");

        Ok(StoredBlob {
            reference: format!(
                "{}/{}/{}",
                self.public_prefix,
                upload.scope.dir_name(),
                file_name
            ),
            scope: upload.scope,
            size,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    fn upload(scope: BlobScope, name: &str, body: &'static [u8]) -> Upload {
        Upload {
            scope,
            file_name: name.to_string(),
            content_type: Some("image/png".to_string()),
            bytes: Bytes::from_static(body),
        }
    }

    #[tokio::test]
    async fn init_creates_scope_directories() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalBlobStore::new(dir.path());
        store.init().await.unwrap();
        assert!(dir.path().join("brands").is_dir());
        assert!(dir.path().join("cars").is_dir());
    }

    #[tokio::test]
    async fn put_writes_file_and_returns_public_path() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalBlobStore::new(dir.path());
        store.init().await.unwrap();

        let stored = store
            .put(upload(BlobScope::Brands, "tata.png", b"png-bytes"))
            .await
            .unwrap();

        assert_eq!(stored.reference, "/storage/brands/tata.png");
        assert_eq!(stored.size, 9);
        let on_disk = std::fs::read(dir.path().join("brands/tata.png")).unwrap();
        assert_eq!(on_disk, b"png-bytes");
    }

    #[tokio::test]
    async fn put_cannot_escape_scope_directory() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalBlobStore::new(dir.path());
        store.init().await.unwrap();

        let stored = store
            .put(upload(BlobScope::Cars, "../../evil.sh", b"x"))
            .await
            .unwrap();

        assert_eq!(stored.reference, "/storage/cars/evil.sh");
        assert!(dir.path().join("cars/evil.sh").is_file());
    }

    #[tokio::test]
    async fn put_without_init_fails_with_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalBlobStore::new(dir.path().join("missing"));
        let err = store
            .put(upload(BlobScope::Cars, "a.jpg", b"x"))
            .await
            .unwrap_err();
        assert!(matches!(err, BlobError::Io { .. }));
    }

    #[tokio::test]
    async fn custom_public_prefix() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalBlobStore::new(dir.path()).with_public_prefix("/media/");
        store.init().await.unwrap();
        let stored = store
            .put(upload(BlobScope::Cars, "a.jpg", b"x"))
            .await
            .unwrap();
        assert_eq!(stored.reference, "/media/cars/a.jpg");
    }
}
