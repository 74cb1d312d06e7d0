use crate::action::{Action, ActionContext, ActionOutcome, ValidationResult};
use crate::catalog::ActionDescriptor;
use async_trait::async_trait;
use image::GenericImageView;
use media_core::{ActionCategory, MediaType};
use serde_json::{json, Value};
use std::sync::Arc;

/// Reads width/height/format from the input image bytes. `process` category, JSON outcome.
pub struct ImgMetadataAction;

impl ImgMetadataAction {
    #[must_use]
    pub fn descriptor() -> ActionDescriptor {
        ActionDescriptor {
            action_id: "img_metadata".into(),
            display_name: "Image metadata".into(),
            media_type: MediaType::Image,
            category: ActionCategory::Process,
            input_schema: None,
            handler: Arc::new(Self),
        }
    }
}

#[async_trait]
impl Action for ImgMetadataAction {
    fn action_id(&self) -> &str {
        "img_metadata"
    }

    fn display_name(&self) -> &str {
        "Image metadata"
    }

    fn media_type(&self) -> MediaType {
        MediaType::Image
    }

    fn category(&self) -> ActionCategory {
        ActionCategory::Process
    }

    fn validate(&self, _params: &Value) -> ValidationResult {
        ValidationResult::ok()
    }

    async fn execute(&self, ctx: ActionContext) -> Result<ActionOutcome, String> {
        let img = image::load_from_memory(&ctx.bytes)
            .map_err(|e| format!("processing error: failed to decode image: {e}"))?;
        let (width, height) = img.dimensions();
        Ok(ActionOutcome::Json {
            data: json!({ "width": width, "height": height, "format": format!("{:?}", img.color()) }),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn png_bytes(w: u32, h: u32) -> Vec<u8> {
        let img = image::RgbImage::new(w, h);
        let mut buf = std::io::Cursor::new(Vec::new());
        image::DynamicImage::ImageRgb8(img)
            .write_to(&mut buf, image::ImageFormat::Png)
            .unwrap();
        buf.into_inner()
    }

    #[tokio::test]
    async fn extracts_width_and_height() {
        let action = ImgMetadataAction;
        let ctx = ActionContext {
            bytes: png_bytes(16, 16),
            file_info: crate::action::FileInfo {
                mime_type: "image/png".into(),
                file_size_bytes: 1024,
            },
            params: json!({}),
            organization_id: "org1".into(),
            user_id: None,
            job_id: Uuid::nil(),
        };
        let outcome = action.execute(ctx).await.unwrap();
        match outcome {
            ActionOutcome::Json { data } => {
                assert_eq!(data["width"], 16);
                assert_eq!(data["height"], 16);
            }
            _ => panic!("expected JSON outcome"),
        }
    }
}
