use crate::error::StoreError;
use crate::object_store::{ObjectMeta, ObjectStore, PutResult};
use async_trait::async_trait;
use bytes::Bytes;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use sha2::{Digest, Sha256};
use tokio::fs;
use tracing::debug;

const CONTENT_TYPE_SIDECAR_SUFFIX: &str = ".content-type";

/// Filesystem-backed object store rooted at `storage.local_root` (spec §4.3 default
/// backend, used in every test and local-dev deployment). Grounded on the teacher's
/// `media_dir`-rooted local filesystem convention.
///
/// Content type isn't a first-class attribute of a file on disk, so it's persisted in a
/// sidecar file next to the object (`<path>.content-type`).
pub struct LocalObjectStore {
    root: PathBuf,
}

impl LocalObjectStore {
    #[must_use]
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    fn resolve(&self, path: &str) -> PathBuf {
        self.root.join(path)
    }

    fn sidecar(path: &Path) -> PathBuf {
        let mut s = path.as_os_str().to_owned();
        s.push(CONTENT_TYPE_SIDECAR_SUFFIX);
        PathBuf::from(s)
    }
}

#[async_trait]
impl ObjectStore for LocalObjectStore {
    async fn put(
        &self,
        path: &str,
        bytes: Bytes,
        content_type: &str,
        _metadata: HashMap<String, String>,
    ) -> Result<PutResult, StoreError> {
        let full = self.resolve(path);
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| StoreError::new("put.create_dir_all", e))?;
        }
        fs::write(&full, &bytes)
            .await
            .map_err(|e| StoreError::new("put.write", e))?;
        fs::write(Self::sidecar(&full), content_type.as_bytes())
            .await
            .map_err(|e| StoreError::new("put.write_sidecar", e))?;
        debug!(path, bytes = bytes.len(), "wrote object to local store");
        let mut hasher = Sha256::new();
        hasher.update(&bytes);
        Ok(PutResult {
            etag: format!("{:x}", hasher.finalize()),
        })
    }

    async fn get(&self, path: &str) -> Result<(Bytes, String), StoreError> {
        let full = self.resolve(path);
        let bytes = fs::read(&full)
            .await
            .map_err(|e| StoreError::new("get.read", e))?;
        let content_type = fs::read_to_string(Self::sidecar(&full))
            .await
            .unwrap_or_else(|_| "application/octet-stream".to_string());
        Ok((Bytes::from(bytes), content_type))
    }

    async fn delete(&self, path: &str) -> Result<(), StoreError> {
        let full = self.resolve(path);
        match fs::remove_file(&full).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(StoreError::new("delete", e)),
        }
        let _ = fs::remove_file(Self::sidecar(&full)).await;
        Ok(())
    }

    async fn head(&self, path: &str) -> Result<Option<ObjectMeta>, StoreError> {
        let full = self.resolve(path);
        match fs::metadata(&full).await {
            Ok(meta) => {
                let content_type = fs::read_to_string(Self::sidecar(&full)).await.ok();
                Ok(Some(ObjectMeta {
                    size: meta.len(),
                    content_type,
                }))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::new("head", e)),
        }
    }

    async fn presign_get(&self, path: &str, _ttl: Duration) -> Result<String, StoreError> {
        Ok(format!("file://{}", self.resolve(path).display()))
    }

    async fn presign_put(
        &self,
        path: &str,
        _ttl: Duration,
        _content_type: &str,
    ) -> Result<String, StoreError> {
        Ok(format!("file://{}", self.resolve(path).display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn round_trips_bytes_and_content_type() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalObjectStore::new(dir.path().to_path_buf());

        let result = store
            .put(
                "org1/image/2026/07/28/abc.jpg",
                Bytes::from_static(b"hello"),
                "image/jpeg",
                HashMap::new(),
            )
            .await
            .unwrap();
        assert!(!result.etag.is_empty());

        let (bytes, content_type) = store.get("org1/image/2026/07/28/abc.jpg").await.unwrap();
        assert_eq!(bytes.as_ref(), b"hello");
        assert_eq!(content_type, "image/jpeg");

        let meta = store
            .head("org1/image/2026/07/28/abc.jpg")
            .await
            .unwrap()
            .expect("object should exist");
        assert_eq!(meta.size, 5);

        store.delete("org1/image/2026/07/28/abc.jpg").await.unwrap();
        assert!(store
            .head("org1/image/2026/07/28/abc.jpg")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn head_on_missing_object_returns_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalObjectStore::new(dir.path().to_path_buf());
        assert!(store.head("missing/path.jpg").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalObjectStore::new(dir.path().to_path_buf());
        store.delete("never/written.jpg").await.unwrap();
        store.delete("never/written.jpg").await.unwrap();
    }
}
