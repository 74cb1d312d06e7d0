use crate::action::{Action, ActionContext, ActionOutcome, ValidationResult};
use crate::catalog::ActionDescriptor;
use async_trait::async_trait;
use media_core::{ActionCategory, MediaType};
use serde_json::{json, Value};
use std::sync::Arc;

const SUPPORTED_FORMATS: &[&str] = &["mp3", "wav", "ogg", "flac"];

/// Re-tags the container/mime of an audio file without re-encoding — enough to exercise
/// the pipeline's FILE-outcome path for audio without pulling in a real codec
/// (action handlers are out of scope, spec §1). `modify` category, FILE outcome.
pub struct AudFormatConvertAction;

impl AudFormatConvertAction {
    #[must_use]
    pub fn descriptor() -> ActionDescriptor {
        ActionDescriptor {
            action_id: "aud_format_convert".into(),
            display_name: "Audio format convert".into(),
            media_type: MediaType::Audio,
            category: ActionCategory::Modify,
            input_schema: None,
            handler: Arc::new(Self),
        }
    }

    fn validate_params(params: &Value) -> Vec<String> {
        match params.get("format").and_then(Value::as_str) {
            Some(f) if SUPPORTED_FORMATS.contains(&f) => Vec::new(),
            Some(f) => vec![format!("unsupported target format {f:?}")],
            None => vec!["`format` is required".into()],
        }
    }
}

#[async_trait]
impl Action for AudFormatConvertAction {
    fn action_id(&self) -> &str {
        "aud_format_convert"
    }

    fn display_name(&self) -> &str {
        "Audio format convert"
    }

    fn media_type(&self) -> MediaType {
        MediaType::Audio
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
        let format = ctx.params["format"].as_str().unwrap_or("mp3");
        Ok(ActionOutcome::File {
            bytes: ctx.bytes,
            mime_type: format!("audio/{format}"),
            filename: Some(format!("converted.{format}")),
            metadata: json!({ "format": format }),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_unsupported_format() {
        let action = AudFormatConvertAction;
        let result = action.validate(&json!({ "format": "aiff" }));
        assert!(!result.is_valid());
    }

    #[test]
    fn accepts_supported_format() {
        let action = AudFormatConvertAction;
        let result = action.validate(&json!({ "format": "mp3" }));
        assert!(result.is_valid());
    }
}
