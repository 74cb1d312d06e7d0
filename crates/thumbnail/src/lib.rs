use image::imageops::FilterType;
use media_store::thumbnail_path_of;
use thiserror::Error;

const THUMBNAIL_SIDE: u32 = 300;

#[derive(Debug, Error)]
pub enum ThumbnailError {
    #[error("failed to decode source image: {0}")]
    Decode(#[from] image::ImageError),
}

/// A derived preview ready to be written to the object store, and the path it belongs at.
pub struct Thumbnail {
    pub storage_path: String,
    pub bytes: Vec<u8>,
    pub content_type: &'static str,
}

/// Renders a single 300x300 WebP preview, fit within the square preserving aspect ratio
/// (spec §4.8). Grounded on the teacher's `generate_thumbnails` crate, generalized from
/// its multi-height AVIF ladder down to the one derived asset this service persists.
pub fn generate_preview(source_bytes: &[u8], source_storage_path: &str) -> Result<Thumbnail, ThumbnailError> {
    let image = image::load_from_memory(source_bytes)?;
    let resized = image.resize(THUMBNAIL_SIDE, THUMBNAIL_SIDE, FilterType::Lanczos3);

    let mut bytes = Vec::new();
    resized.write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::WebP)?;

    Ok(Thumbnail {
        storage_path: thumbnail_path_of(source_storage_path),
        bytes,
        content_type: "image/webp",
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_png(width: u32, height: u32) -> Vec<u8> {
        let img = image::RgbImage::from_pixel(width, height, image::Rgb([10, 20, 30]));
        let mut bytes = Vec::new();
        image::DynamicImage::ImageRgb8(img)
            .write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();
        bytes
    }

    #[test]
    fn shrinks_a_larger_image_to_fit_within_the_square() {
        let source = sample_png(1200, 600);
        let thumb = generate_preview(&source, "org1/image/2026/07/28/abc.jpg").unwrap();
        assert_eq!(thumb.storage_path, "org1/image/2026/07/28/thumbnails/abc_thumb.webp");

        let decoded = image::load_from_memory(&thumb.bytes).unwrap();
        assert!(decoded.width() <= THUMBNAIL_SIDE);
        assert!(decoded.height() <= THUMBNAIL_SIDE);
        assert_eq!(decoded.width(), THUMBNAIL_SIDE);
    }

    #[test]
    fn rejects_non_image_bytes() {
        let err = generate_preview(b"not an image", "org1/image/2026/07/28/abc.jpg");
        assert!(err.is_err());
    }
}
