use chrono::Utc;
use md5::{Digest as Md5Digest, Md5};
use media_core::{derive_storage_path, MediaType};
use sha2::{Digest as Sha2Digest, Sha256};
use uuid::Uuid;

/// Picks a filesystem extension for a derived result, preferring the handler's own
/// filename (spec §4.6 step 6) and falling back to a guess from the mime type.
#[must_use]
pub fn extension_for(filename: Option<&str>, mime_type: &str) -> String {
    if let Some(name) = filename {
        if let Some((_, ext)) = name.rsplit_once('.') {
            return ext.to_string();
        }
    }
    mime_guess::get_mime_extensions_str(mime_type)
        .and_then(|exts| exts.first().copied())
        .unwrap_or("bin")
        .to_string()
}

/// `{actionId}_{uuid}.{extFromMime}` when the handler didn't supply a filename, per
/// spec §4.6 step 6.
#[must_use]
pub fn result_storage_path(
    organization_id: &str,
    action_id: &str,
    media_type: MediaType,
    filename: Option<&str>,
    mime_type: &str,
) -> String {
    let extension = extension_for(filename, mime_type);
    let id = Uuid::new_v4();
    let _ = action_id;
    derive_storage_path(organization_id, media_type, Utc::now(), id, &extension)
}

pub struct Checksums {
    pub md5: String,
    pub sha256: String,
}

#[must_use]
pub fn checksum(bytes: &[u8]) -> Checksums {
    let mut md5_hasher = Md5::new();
    md5_hasher.update(bytes);
    let md5 = format!("{:x}", md5_hasher.finalize());

    let mut sha_hasher = Sha256::new();
    sha_hasher.update(bytes);
    let sha256 = format!("{:x}", sha_hasher.finalize());

    Checksums { md5, sha256 }
}

/// Guesses the resulting `MediaType` from the mime type of a derived file (spec §4.6
/// step 6): anything not explicitly audio is treated as an image, mirroring the action
/// registry's own image/audio split (spec §4.1).
#[must_use]
pub fn media_type_for_mime(mime_type: &str) -> MediaType {
    if mime_type.starts_with("audio/") {
        MediaType::Audio
    } else {
        MediaType::Image
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefers_handler_supplied_filename_extension() {
        assert_eq!(extension_for(Some("converted.mp3"), "audio/wav"), "mp3");
    }

    #[test]
    fn falls_back_to_mime_guess_without_a_filename() {
        assert_eq!(extension_for(None, "image/png"), "png");
    }

    #[test]
    fn classifies_media_type_from_mime() {
        assert_eq!(media_type_for_mime("audio/mpeg"), MediaType::Audio);
        assert_eq!(media_type_for_mime("image/webp"), MediaType::Image);
    }
}
