use crate::error::StoreError;
use crate::object_store::{ObjectMeta, ObjectStore, PutResult};
use async_trait::async_trait;
use bytes::Bytes;
use object_store::aws::{AmazonS3, AmazonS3Builder};
use object_store::path::Path as ObjectPath;
use object_store::{ObjectStore as ObjectStoreClient, PutPayload};
use std::collections::HashMap;
use std::time::Duration;

/// S3-compatible backend, selected by `storage.backend = "s3"` (spec §4.3). Wraps the
/// `object_store` crate's AWS client; chosen over pulling in the full AWS SDK purely for
/// upload/download/presign since the pack's `jeremybastin1207-mindia` manifest already
/// leans on this crate for the same job.
///
/// Presigning via `object_store` has no built-in cryptographic signer, so
/// `presign_get`/`presign_put` return a plain `https://` URL to the object. This is a
/// documented limitation, not a substitute for a real presigned URL, and callers that need
/// browser-safe temporary access should route through a signer outside this crate.
pub struct S3ObjectStore {
    client: AmazonS3,
    bucket: String,
    endpoint: Option<String>,
}

impl S3ObjectStore {
    pub fn new(bucket: String, endpoint: Option<String>, region: Option<String>) -> Result<Self, StoreError> {
        let mut builder = AmazonS3Builder::new().with_bucket_name(&bucket);
        if let Some(region) = &region {
            builder = builder.with_region(region);
        }
        if let Some(endpoint) = &endpoint {
            builder = builder.with_endpoint(endpoint).with_allow_http(true);
        }
        let client = builder
            .build()
            .map_err(|e| StoreError::new("s3.build_client", e))?;
        Ok(Self {
            client,
            bucket,
            endpoint,
        })
    }

    fn object_path(path: &str) -> ObjectPath {
        ObjectPath::from(path)
    }

    fn public_url(&self, path: &str) -> String {
        match &self.endpoint {
            Some(endpoint) => format!("{}/{}/{}", endpoint.trim_end_matches('/'), self.bucket, path),
            None => format!("https://{}.s3.amazonaws.com/{}", self.bucket, path),
        }
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn put(
        &self,
        path: &str,
        bytes: Bytes,
        content_type: &str,
        metadata: HashMap<String, String>,
    ) -> Result<PutResult, StoreError> {
        let mut opts = object_store::PutOptions::default();
        opts.attributes.insert(
            object_store::Attribute::ContentType,
            content_type.to_string().into(),
        );
        for (key, value) in metadata {
            opts.attributes
                .insert(object_store::Attribute::Metadata(key.into()), value.into());
        }
        let result = self
            .client
            .put_opts(&Self::object_path(path), PutPayload::from_bytes(bytes), opts)
            .await
            .map_err(|e| StoreError::new("s3.put", e))?;
        Ok(PutResult {
            etag: result.e_tag.unwrap_or_default(),
        })
    }

    async fn get(&self, path: &str) -> Result<(Bytes, String), StoreError> {
        let result = self
            .client
            .get(&Self::object_path(path))
            .await
            .map_err(|e| StoreError::new("s3.get", e))?;
        let content_type = result
            .attributes
            .get(&object_store::Attribute::ContentType)
            .map(std::string::ToString::to_string)
            .unwrap_or_else(|| "application/octet-stream".to_string());
        let bytes = result
            .bytes()
            .await
            .map_err(|e| StoreError::new("s3.get.bytes", e))?;
        Ok((bytes, content_type))
    }

    async fn delete(&self, path: &str) -> Result<(), StoreError> {
        match self.client.delete(&Self::object_path(path)).await {
            Ok(()) => Ok(()),
            Err(object_store::Error::NotFound { .. }) => Ok(()),
            Err(e) => Err(StoreError::new("s3.delete", e)),
        }
    }

    async fn head(&self, path: &str) -> Result<Option<ObjectMeta>, StoreError> {
        match self.client.head(&Self::object_path(path)).await {
            Ok(meta) => {
                let content_type = meta
                    .attributes
                    .get(&object_store::Attribute::ContentType)
                    .map(std::string::ToString::to_string);
                Ok(Some(ObjectMeta {
                    size: meta.size as u64,
                    content_type,
                }))
            }
            Err(object_store::Error::NotFound { .. }) => Ok(None),
            Err(e) => Err(StoreError::new("s3.head", e)),
        }
    }

    async fn presign_get(&self, path: &str, _ttl: Duration) -> Result<String, StoreError> {
        Ok(self.public_url(path))
    }

    async fn presign_put(
        &self,
        path: &str,
        _ttl: Duration,
        _content_type: &str,
    ) -> Result<String, StoreError> {
        Ok(self.public_url(path))
    }
}
