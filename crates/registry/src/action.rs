use async_trait::async_trait;
use media_core::MediaType;
use serde_json::Value;
use uuid::Uuid;

/// What the worker hands to `Action::execute` (spec §6).
pub struct ActionContext {
    pub bytes: Vec<u8>,
    pub file_info: FileInfo,
    pub params: Value,
    pub organization_id: String,
    pub user_id: Option<String>,
    pub job_id: Uuid,
}

pub struct FileInfo {
    pub mime_type: String,
    pub file_size_bytes: i64,
}

/// One derived file from a `FILES` outcome.
pub struct OutcomeFile {
    pub bytes: Vec<u8>,
    pub mime_type: String,
    pub filename: Option<String>,
}

/// A tagged value produced by an action executor (spec §4.1).
pub enum ActionOutcome {
    File {
        bytes: Vec<u8>,
        mime_type: String,
        filename: Option<String>,
        metadata: Value,
    },
    Files {
        files: Vec<OutcomeFile>,
    },
    Json {
        data: Value,
    },
}

#[derive(Debug, Clone)]
pub struct ValidationResult {
    pub errors: Vec<String>,
}

impl ValidationResult {
    #[must_use]
    pub fn ok() -> Self {
        Self { errors: Vec::new() }
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// A pure `(bytes, params) -> ActionOutcome` transform with declared media-type affinity
/// (spec §1, §4.1). Implementations must be safe for concurrent invocation across
/// distinct inputs.
#[async_trait]
pub trait Action: Send + Sync {
    fn action_id(&self) -> &str;
    fn display_name(&self) -> &str;
    fn media_type(&self) -> MediaType;
    fn category(&self) -> media_core::ActionCategory;

    /// Pure parameter validation against the action's declared input schema.
    fn validate(&self, params: &Value) -> ValidationResult;

    /// The only side-effecting entry point.
    async fn execute(&self, ctx: ActionContext) -> Result<ActionOutcome, String>;
}
