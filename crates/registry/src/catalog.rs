use crate::action::{Action, ValidationResult};
use jsonschema::JSONSchema;
use media_core::{ActionCategory, CoreError, MediaType};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::warn;

/// A registered action plus its declared JSON-Schema-draft-7 input schema (spec §4.1).
pub struct ActionDescriptor {
    pub action_id: String,
    pub display_name: String,
    pub media_type: MediaType,
    pub category: ActionCategory,
    pub input_schema: Option<JSONSchema>,
    pub handler: Arc<dyn Action>,
}

impl ActionDescriptor {
    /// Validates against the compiled JSON Schema (if one was supplied) and then delegates
    /// to the handler's own `validate` for anything schema alone cannot express.
    #[must_use]
    pub fn validate(&self, params: &Value) -> ValidationResult {
        let mut errors = Vec::new();
        if let Some(schema) = &self.input_schema {
            if let Err(validation_errors) = schema.validate(params) {
                errors.extend(validation_errors.map(|e| e.to_string()));
            }
        }
        let handler_result = self.handler.validate(params);
        errors.extend(handler_result.errors);
        ValidationResult { errors }
    }
}

/// A process-local, read-mostly mapping `actionId -> descriptor` (spec §4.1). Loaded once
/// at process startup and treated as immutable afterward (spec §5).
#[derive(Default)]
pub struct ActionRegistry {
    actions: HashMap<String, Arc<ActionDescriptor>>,
}

impl ActionRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registering the same `actionId` twice is a logged warning; the later registration wins.
    pub fn register(&mut self, descriptor: ActionDescriptor) {
        let action_id = descriptor.action_id.clone();
        if self.actions.contains_key(&action_id) {
            warn!("action {action_id:?} registered twice, later registration wins");
        }
        self.actions.insert(action_id, Arc::new(descriptor));
    }

    pub fn get(&self, action_id: &str) -> Result<Arc<ActionDescriptor>, CoreError> {
        self.actions
            .get(action_id)
            .cloned()
            .ok_or_else(|| CoreError::ActionNotFound(action_id.to_string()))
    }

    #[must_use]
    pub fn list(&self) -> Vec<Arc<ActionDescriptor>> {
        self.actions.values().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::img_metadata::ImgMetadataAction;
    use async_trait::async_trait;
    use media_core::ActionCategory;

    struct DummyAction;

    #[async_trait]
    impl Action for DummyAction {
        fn action_id(&self) -> &str {
            "dummy"
        }
        fn display_name(&self) -> &str {
            "Dummy"
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
        async fn execute(
            &self,
            _ctx: crate::action::ActionContext,
        ) -> Result<crate::action::ActionOutcome, String> {
            unimplemented!()
        }
    }

    #[test]
    fn later_registration_wins_and_get_fails_when_absent() {
        let mut registry = ActionRegistry::new();
        registry.register(ActionDescriptor {
            action_id: "dummy".into(),
            display_name: "first".into(),
            media_type: MediaType::Image,
            category: ActionCategory::Process,
            input_schema: None,
            handler: Arc::new(DummyAction),
        });
        registry.register(ActionDescriptor {
            action_id: "dummy".into(),
            display_name: "second".into(),
            media_type: MediaType::Image,
            category: ActionCategory::Process,
            input_schema: None,
            handler: Arc::new(DummyAction),
        });

        let found = registry.get("dummy").unwrap();
        assert_eq!(found.display_name, "second");

        assert!(registry.get("missing").is_err());
    }

    #[test]
    fn img_metadata_registers_with_a_compiled_schema() {
        let mut registry = ActionRegistry::new();
        registry.register(ImgMetadataAction::descriptor());
        let descriptor = registry.get("img_metadata").unwrap();
        assert_eq!(descriptor.media_type, MediaType::Image);
        let result = descriptor.validate(&serde_json::json!({}));
        assert!(result.is_valid());
    }
}
