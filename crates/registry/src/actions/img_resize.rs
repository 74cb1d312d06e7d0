use crate::action::{Action, ActionContext, ActionOutcome, ValidationResult};
use crate::catalog::ActionDescriptor;
use async_trait::async_trait;
use image::GenericImageView;
use media_core::{ActionCategory, MediaType};
use serde_json::{json, Value};
use std::sync::Arc;

/// Resizes the input image, either by percentage or to explicit pixel dimensions.
/// `modify` category, FILE outcome. Grounds S2/S6 of spec §8.
pub struct ImgResizeAction;

impl ImgResizeAction {
    #[must_use]
    pub fn descriptor() -> ActionDescriptor {
        ActionDescriptor {
            action_id: "img_resize".into(),
            display_name: "Image resize".into(),
            media_type: MediaType::Image,
            category: ActionCategory::Modify,
            input_schema: None,
            handler: Arc::new(Self),
        }
    }

    fn validate_params(params: &Value) -> Vec<String> {
        let mut errors = Vec::new();
        let mode = params.get("mode").and_then(Value::as_str);
        match mode {
            Some("percentage") => {
                let pct = params.get("percentage").and_then(Value::as_f64);
                if !matches!(pct, Some(p) if p > 0.0 && p <= 100.0) {
                    errors.push(
                        "percentage mode requires a numeric `percentage` in (0, 100]".into(),
                    );
                }
            }
            Some("pixels") => {
                if params.get("width").and_then(Value::as_u64).is_none() {
                    errors.push("pixels mode requires an integer `width`".into());
                }
                if params.get("height").and_then(Value::as_u64).is_none() {
                    errors.push("pixels mode requires an integer `height`".into());
                }
            }
            _ => errors.push("`mode` must be \"percentage\" or \"pixels\"".into()),
        }
        errors
    }
}

#[async_trait]
impl Action for ImgResizeAction {
    fn action_id(&self) -> &str {
        "img_resize"
    }

    fn display_name(&self) -> &str {
        "Image resize"
    }

    fn media_type(&self) -> MediaType {
        MediaType::Image
    }

    fn category(&self) -> ActionCategory {
        ActionCategory::Modify
    }

    fn validate(&self, params: &Value) -> ValidationResult {
        ValidationResult {
            errors: Self::validate_params(params),
        }
    }

    async fn execute(&self, ctx: ActionContext) -> Result<ActionOutcome, String> {
        let errors = Self::validate_params(&ctx.params);
        if !errors.is_empty() {
            return Err(format!("validation error: {}", errors.join("; ")));
        }

        let img = image::load_from_memory(&ctx.bytes)
            .map_err(|e| format!("processing error: failed to decode image: {e}"))?;
        let (orig_w, orig_h) = img.dimensions();

        let (target_w, target_h) = match ctx.params.get("mode").and_then(Value::as_str) {
            Some("percentage") => {
                let pct = ctx.params["percentage"].as_f64().unwrap_or(100.0) / 100.0;
                (
                    ((orig_w as f64) * pct).round().max(1.0) as u32,
                    ((orig_h as f64) * pct).round().max(1.0) as u32,
                )
            }
            Some("pixels") => (
                ctx.params["width"].as_u64().unwrap_or(orig_w as u64) as u32,
                ctx.params["height"].as_u64().unwrap_or(orig_h as u64) as u32,
            ),
            _ => unreachable!("validated above"),
        };

        let resized = img.resize_exact(target_w, target_h, image::imageops::FilterType::Lanczos3);
        let mut buf = std::io::Cursor::new(Vec::new());
        resized
            .write_to(&mut buf, image::ImageFormat::Png)
            .map_err(|e| format!("processing error: failed to encode resized image: {e}"))?;

        Ok(ActionOutcome::File {
            bytes: buf.into_inner(),
            mime_type: "image/png".into(),
            filename: None,
            metadata: json!({ "width": target_w, "height": target_h }),
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

    #[test]
    fn pixels_mode_without_dimensions_fails_validation() {
        let action = ImgResizeAction;
        let result = action.validate(&json!({ "mode": "pixels" }));
        assert!(!result.is_valid());
    }

    #[tokio::test]
    async fn percentage_mode_halves_dimensions() {
        let action = ImgResizeAction;
        let ctx = ActionContext {
            bytes: png_bytes(100, 200),
            file_info: crate::action::FileInfo {
                mime_type: "image/png".into(),
                file_size_bytes: 2 * 1024 * 1024,
            },
            params: json!({ "mode": "percentage", "percentage": 50 }),
            organization_id: "org1".into(),
            user_id: None,
            job_id: Uuid::nil(),
        };
        let outcome = action.execute(ctx).await.unwrap();
        match outcome {
            ActionOutcome::File { metadata, .. } => {
                assert_eq!(metadata["width"], 50);
                assert_eq!(metadata["height"], 100);
            }
            _ => panic!("expected FILE outcome"),
        }
    }
}
