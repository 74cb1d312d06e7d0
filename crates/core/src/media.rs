use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::Type;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, serde::Serialize, serde::Deserialize)]
#[sqlx(type_name = "media_type", rename_all = "UPPERCASE")]
pub enum MediaType {
    Image,
    Audio,
}

impl MediaType {
    #[must_use]
    pub const fn path_segment(self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Audio => "audio",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, serde::Serialize, serde::Deserialize)]
#[sqlx(type_name = "media_status", rename_all = "UPPERCASE")]
pub enum MediaStatus {
    Ready,
    Deleted,
}

/// A content-addressed blob plus metadata (spec §3).
#[derive(Debug, Clone, sqlx::FromRow, serde::Serialize, serde::Deserialize)]
pub struct MediaFile {
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
    pub status: MediaStatus,
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// `{orgId}/{image|audio}/{YYYY}/{MM}/{DD}/{uuid}.{ext}` per spec §3 / §6.
#[must_use]
pub fn derive_storage_path(
    organization_id: &str,
    media_type: MediaType,
    when: DateTime<Utc>,
    id: Uuid,
    extension: &str,
) -> String {
    format!(
        "{org}/{kind}/{y:04}/{m:02}/{d:02}/{id}.{ext}",
        org = organization_id,
        kind = media_type.path_segment(),
        y = when.format("%Y"),
        m = when.format("%m"),
        d = when.format("%d"),
        id = id,
        ext = extension,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn storage_path_matches_scheme() {
        let when = Utc.with_ymd_and_hms(2026, 7, 28, 0, 0, 0).unwrap();
        let id = Uuid::nil();
        let path = derive_storage_path("org1", MediaType::Image, when, id, "png");
        assert_eq!(
            path,
            "org1/image/2026/07/28/00000000-0000-0000-0000-000000000000.png"
        );
    }
}
