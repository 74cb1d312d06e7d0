use crate::error::MetadataError;
use chrono::{DateTime, Utc};
use media_core::{MediaFile, MediaStatus, MediaType};
use serde_json::Value;
use sqlx::{Executor, Postgres};
use uuid::Uuid;

pub struct NewMediaFile {
    pub media_id: Uuid,
    pub organization_id: String,
    pub storage_path: String,
    pub media_type: MediaType,
    pub mime_type: String,
    pub file_size_bytes: i64,
    pub checksum_md5: String,
    pub checksum_sha256: String,
    pub metadata: Value,
    pub thumbnail_path: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
}

pub struct MediaFileStore;

impl MediaFileStore {
    pub async fn create<'e, E>(executor: E, spec: NewMediaFile) -> Result<MediaFile, MetadataError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let media = sqlx::query_as::<_, MediaFile>(
            r"
            INSERT INTO media_files (
                media_id, organization_id, storage_path, media_type, mime_type,
                file_size_bytes, checksum_md5, checksum_sha256, metadata,
                thumbnail_path, status, expires_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, 'READY', $11)
            RETURNING *
            ",
        )
        .bind(spec.media_id)
        .bind(spec.organization_id)
        .bind(spec.storage_path)
        .bind(spec.media_type)
        .bind(spec.mime_type)
        .bind(spec.file_size_bytes)
        .bind(spec.checksum_md5)
        .bind(spec.checksum_sha256)
        .bind(spec.metadata)
        .bind(spec.thumbnail_path)
        .bind(spec.expires_at)
        .fetch_one(executor)
        .await?;
        Ok(media)
    }

    /// Tenant-scoped read; a media file in `DELETED` status is still returned so callers
    /// can distinguish "deleted" from "never existed" and decide for themselves (the
    /// submission coordinator treats non-READY as NOT_FOUND per spec §4.5 step 1).
    pub async fn find<'e, E>(
        executor: E,
        organization_id: &str,
        media_id: Uuid,
    ) -> Result<MediaFile, MetadataError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let media = sqlx::query_as::<_, MediaFile>(
            "SELECT * FROM media_files WHERE media_id = $1 AND organization_id = $2",
        )
        .bind(media_id)
        .bind(organization_id)
        .fetch_optional(executor)
        .await?;
        media.ok_or(MetadataError::NotFound)
    }

    pub async fn soft_delete<'e, E>(
        executor: E,
        organization_id: &str,
        media_id: Uuid,
    ) -> Result<(), MetadataError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            "UPDATE media_files SET status = 'DELETED' WHERE media_id = $1 AND organization_id = $2",
        )
        .bind(media_id)
        .bind(organization_id)
        .execute(executor)
        .await?;
        Ok(())
    }
}

impl MediaStatus {
    #[must_use]
    pub const fn is_ready(self) -> bool {
        matches!(self, Self::Ready)
    }
}
