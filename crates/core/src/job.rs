use crate::status::{JobStatus, PriorityTier};
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::Type;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, serde::Serialize, serde::Deserialize)]
#[sqlx(type_name = "action_category", rename_all = "UPPERCASE")]
pub enum ActionCategory {
    Transcribe,
    Modify,
    Process,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, serde::Serialize, serde::Deserialize)]
#[sqlx(type_name = "result_type", rename_all = "UPPERCASE")]
pub enum ResultType {
    File,
    Json,
    Files,
}

/// The submitter: exactly one of `user_id` / `api_key_id` identifies them (spec §3).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submitter {
    User(String),
    ApiKey(String),
}

/// The central entity (spec §3).
#[derive(Debug, Clone, sqlx::FromRow, serde::Serialize, serde::Deserialize)]
pub struct Job {
    pub job_id: Uuid,
    pub organization_id: String,
    pub user_id: Option<String>,
    pub api_key_id: Option<String>,
    pub input_media_id: Uuid,
    pub action_id: String,
    pub action_category: ActionCategory,
    pub parameters: Value,
    pub priority: i32,
    pub priority_tier: PriorityTier,
    pub status: JobStatus,
    pub retry_count: i32,
    pub worker_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub queued_at: Option<DateTime<Utc>>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub result_type: Option<ResultType>,
    pub result_media_id: Option<Uuid>,
    pub result_data: Option<Value>,
    pub error_code: Option<String>,
    pub error_message: Option<String>,
    pub processing_time_ms: Option<i64>,
}

impl Job {
    #[must_use]
    pub fn submitter(&self) -> Option<Submitter> {
        if let Some(u) = &self.user_id {
            Some(Submitter::User(u.clone()))
        } else {
            self.api_key_id.clone().map(Submitter::ApiKey)
        }
    }
}

/// Append-only ledger entry, one per terminal COMPLETED/FAILED transition (spec §3).
#[derive(Debug, Clone, sqlx::FromRow, serde::Serialize, serde::Deserialize)]
pub struct UsageRecord {
    pub record_id: Uuid,
    pub organization_id: String,
    pub job_id: Uuid,
    pub action_type: String,
    pub status: JobStatus,
    pub processing_time_ms: i64,
    pub ai_tokens_used: Option<i64>,
    pub created_at: DateTime<Utc>,
}
