use chrono::{DateTime, Utc};
use media_core::PriorityTier;
use serde_json::Value;
use uuid::Uuid;

/// `{jobId, actionId, payload, priority, attemptsMade, nextAttemptAt}` (spec §3).
#[derive(Debug, Clone, sqlx::FromRow, serde::Serialize, serde::Deserialize)]
pub struct QueueEntry {
    pub job_id: Uuid,
    pub tier: PriorityTier,
    pub action_id: String,
    pub payload: Value,
    pub priority: i32,
    pub attempts_made: i32,
    pub next_attempt_at: DateTime<Utc>,
    pub claimed_by: Option<String>,
    pub claimed_until: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct TierStats {
    pub waiting: i64,
    pub active: i64,
    pub completed: i64,
    pub failed: i64,
}

#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct QueueStats {
    pub high: TierStats,
    pub normal: TierStats,
    pub low: TierStats,
}
