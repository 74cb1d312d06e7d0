use crate::error::StoreError;
use async_trait::async_trait;
use bytes::Bytes;
use std::collections::HashMap;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct PutResult {
    pub etag: String,
}

#[derive(Debug, Clone)]
pub struct ObjectMeta {
    pub size: u64,
    pub content_type: Option<String>,
}

/// S3-compatible object store contract (spec §4.3). Implementations are content-addressed
/// and write-once per path — a second `put` at the same derived path is harmless
/// (spec §5 shared-resource policy).
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn put(
        &self,
        path: &str,
        bytes: Bytes,
        content_type: &str,
        metadata: HashMap<String, String>,
    ) -> Result<PutResult, StoreError>;

    async fn get(&self, path: &str) -> Result<(Bytes, String), StoreError>;

    async fn delete(&self, path: &str) -> Result<(), StoreError>;

    async fn head(&self, path: &str) -> Result<Option<ObjectMeta>, StoreError>;

    async fn presign_get(&self, path: &str, ttl: Duration) -> Result<String, StoreError>;

    async fn presign_put(
        &self,
        path: &str,
        ttl: Duration,
        content_type: &str,
    ) -> Result<String, StoreError>;
}

/// Pure derivation: injects `thumbnails/` before the filename and replaces the extension
/// with `.webp` (spec §4.3 `thumbnailPathOf`).
#[must_use]
pub fn thumbnail_path_of(storage_path: &str) -> String {
    let (dir, filename) = storage_path
        .rsplit_once('/')
        .map_or(("", storage_path), |(d, f)| (d, f));
    let stem = filename.rsplit_once('.').map_or(filename, |(stem, _)| stem);
    let thumb_name = format!("{stem}_thumb.webp");
    if dir.is_empty() {
        format!("thumbnails/{thumb_name}")
    } else {
        format!("{dir}/thumbnails/{thumb_name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thumbnail_path_injects_dir_and_swaps_extension() {
        let path = "org1/image/2026/07/28/abc.jpg";
        assert_eq!(
            thumbnail_path_of(path),
            "org1/image/2026/07/28/thumbnails/abc_thumb.webp"
        );
    }
}
