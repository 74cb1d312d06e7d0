mod error;
mod local;
mod object_store;
mod s3;

pub use error::{NotFoundError, StoreError};
pub use local::LocalObjectStore;
pub use object_store::{thumbnail_path_of, ObjectMeta, ObjectStore, PutResult};
pub use s3::S3ObjectStore;

use settings::StorageBackend;
use std::sync::Arc;

/// Builds the configured backend (spec §4.3, §4.10 bootstrap). `Local` is the default
/// and the only backend exercised by this workspace's own tests; `S3` is wired the same
/// way in production.
pub fn build_object_store(backend: &StorageBackend) -> Result<Arc<dyn ObjectStore>, StoreError> {
    match backend {
        StorageBackend::Local { root } => {
            Ok(Arc::new(LocalObjectStore::new(root.clone())) as Arc<dyn ObjectStore>)
        }
        StorageBackend::S3 {
            bucket,
            endpoint,
            region,
        } => {
            let store = S3ObjectStore::new(bucket.clone(), endpoint.clone(), region.clone())?;
            Ok(Arc::new(store) as Arc<dyn ObjectStore>)
        }
    }
}
