use crate::error::MetadataError;
use media_core::{JobStatus, UsageRecord};
use sqlx::{Executor, Postgres};
use uuid::Uuid;

pub struct NewUsageRecord {
    pub record_id: Uuid,
    pub organization_id: String,
    pub job_id: Uuid,
    pub action_type: String,
    pub status: JobStatus,
    pub processing_time_ms: i64,
    pub ai_tokens_used: Option<i64>,
}

pub struct UsageStore;

impl UsageStore {
    /// Append-only insert, emitted once per terminal COMPLETED/FAILED transition
    /// (spec §3, §4.6 step 7, §7).
    pub async fn insert<'e, E>(
        executor: E,
        record: NewUsageRecord,
    ) -> Result<UsageRecord, MetadataError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let row = sqlx::query_as::<_, UsageRecord>(
            r"
            INSERT INTO usage_records (
                record_id, organization_id, job_id, action_type, status,
                processing_time_ms, ai_tokens_used
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            ",
        )
        .bind(record.record_id)
        .bind(record.organization_id)
        .bind(record.job_id)
        .bind(record.action_type)
        .bind(record.status)
        .bind(record.processing_time_ms)
        .bind(record.ai_tokens_used)
        .fetch_one(executor)
        .await?;
        Ok(row)
    }
}
