use crate::error::MetadataError;
use chrono::{DateTime, Utc};
use media_core::{ActionCategory, Job, JobStatus, PriorityTier, ResultType};
use serde_json::Value;
use sqlx::{Executor, Postgres};
use uuid::Uuid;

/// Insert shape for `createJobPending` (spec §4.2, §4.5 step 4).
pub struct NewJob {
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
}

/// Everything a status transition may update alongside `status` itself. All fields default
/// to "leave unchanged" (`None`) so a given CAS only touches the columns its transition
/// actually owns.
#[derive(Default)]
pub struct JobPatch {
    pub queued_at: Option<DateTime<Utc>>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub worker_id: Option<Option<String>>,
    pub retry_count: Option<i32>,
    pub result_type: Option<Option<ResultType>>,
    pub result_media_id: Option<Option<Uuid>>,
    pub result_data: Option<Option<Value>>,
    pub error_code: Option<Option<String>>,
    pub error_message: Option<Option<String>>,
    pub processing_time_ms: Option<Option<i64>>,
}

pub struct JobStore;

impl JobStore {
    /// `createJobPending`: single-row insert in status `PENDING`.
    pub async fn create_pending<'e, E>(executor: E, spec: NewJob) -> Result<Job, MetadataError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let job = sqlx::query_as::<_, Job>(
            r"
            INSERT INTO jobs (
                job_id, organization_id, user_id, api_key_id, input_media_id,
                action_id, action_category, parameters, priority, priority_tier, status
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, 'PENDING')
            RETURNING *
            ",
        )
        .bind(spec.job_id)
        .bind(spec.organization_id)
        .bind(spec.user_id)
        .bind(spec.api_key_id)
        .bind(spec.input_media_id)
        .bind(spec.action_id)
        .bind(spec.action_category)
        .bind(spec.parameters)
        .bind(spec.priority)
        .bind(spec.priority_tier)
        .fetch_one(executor)
        .await?;
        Ok(job)
    }

    /// `transitionJob`: compare-and-set on `status`; the sole primitive allowed to change a
    /// job's status (spec §4.2, invariant 1). Returns `MetadataError::StateMismatch` if the
    /// job is not currently in one of `from`.
    #[allow(clippy::too_many_lines)]
    pub async fn transition<'e, E>(
        executor: E,
        job_id: Uuid,
        from: &[JobStatus],
        to: JobStatus,
        patch: JobPatch,
    ) -> Result<Job, MetadataError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let job = sqlx::query_as::<_, Job>(
            r"
            UPDATE jobs SET
                status = $2,
                queued_at = COALESCE($3, queued_at),
                started_at = COALESCE($4, started_at),
                completed_at = COALESCE($5, completed_at),
                worker_id = CASE WHEN $6 THEN $7 ELSE worker_id END,
                retry_count = COALESCE($8, retry_count),
                result_type = CASE WHEN $9 THEN $10 ELSE result_type END,
                result_media_id = CASE WHEN $11 THEN $12 ELSE result_media_id END,
                result_data = CASE WHEN $13 THEN $14 ELSE result_data END,
                error_code = CASE WHEN $15 THEN $16 ELSE error_code END,
                error_message = CASE WHEN $17 THEN $18 ELSE error_message END,
                processing_time_ms = CASE WHEN $19 THEN $20 ELSE processing_time_ms END
            WHERE job_id = $1 AND status = ANY($21)
            RETURNING *
            ",
        )
        .bind(job_id)
        .bind(to)
        .bind(patch.queued_at)
        .bind(patch.started_at)
        .bind(patch.completed_at)
        .bind(patch.worker_id.is_some())
        .bind(patch.worker_id.flatten())
        .bind(patch.retry_count)
        .bind(patch.result_type.is_some())
        .bind(patch.result_type.flatten())
        .bind(patch.result_media_id.is_some())
        .bind(patch.result_media_id.flatten())
        .bind(patch.result_data.is_some())
        .bind(patch.result_data.flatten())
        .bind(patch.error_code.is_some())
        .bind(patch.error_code.flatten())
        .bind(patch.error_message.is_some())
        .bind(patch.error_message.flatten())
        .bind(patch.processing_time_ms.is_some())
        .bind(patch.processing_time_ms.flatten())
        .bind(from)
        .fetch_optional(executor)
        .await?;

        job.ok_or(MetadataError::StateMismatch)
    }

    /// The worker's claim-time CAS (spec §4.6 step 1, §5 shared-resource policy). Besides
    /// the plain `{PENDING, QUEUED} -> PROCESSING` case, this also lets a second worker
    /// reclaim a job that is *already* `PROCESSING` if `started_at` predates
    /// `stale_before` — the job-row equivalent of the broker's own visibility-timeout
    /// witness, so a stalled delivery can be picked back up without a third status.
    pub async fn claim_for_worker<'e, E>(
        executor: E,
        job_id: Uuid,
        worker_id: &str,
        stale_before: DateTime<Utc>,
    ) -> Result<Job, MetadataError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let job = sqlx::query_as::<_, Job>(
            r"
            UPDATE jobs SET
                status = 'PROCESSING',
                worker_id = $2,
                started_at = COALESCE(started_at, now())
            WHERE job_id = $1
              AND (
                status IN ('PENDING', 'QUEUED')
                OR (status = 'PROCESSING' AND started_at < $3)
              )
            RETURNING *
            ",
        )
        .bind(job_id)
        .bind(worker_id)
        .bind(stale_before)
        .fetch_optional(executor)
        .await?;

        job.ok_or(MetadataError::StateMismatch)
    }

    /// `findJob`: tenant-scoped read. Refuses cross-tenant access (spec §4.2).
    pub async fn find<'e, E>(
        executor: E,
        organization_id: &str,
        job_id: Uuid,
        user_id: Option<&str>,
    ) -> Result<Job, MetadataError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let job = sqlx::query_as::<_, Job>(
            r"
            SELECT * FROM jobs
            WHERE job_id = $1 AND organization_id = $2
              AND ($3::text IS NULL OR user_id = $3)
            ",
        )
        .bind(job_id)
        .bind(organization_id)
        .bind(user_id)
        .fetch_optional(executor)
        .await?;
        job.ok_or(MetadataError::NotFound)
    }

    /// `listJobs`: ordered by `createdAt DESC`, tenant-scoped.
    pub async fn list<'e, E>(
        executor: E,
        organization_id: &str,
        status: Option<JobStatus>,
        media_id: Option<Uuid>,
        user_id: Option<&str>,
        page: i64,
        limit: i64,
    ) -> Result<(Vec<Job>, i64), MetadataError>
    where
        E: Executor<'e, Database = Postgres> + Copy,
    {
        let offset = page.max(0) * limit.max(1);
        let rows = sqlx::query_as::<_, Job>(
            r"
            SELECT * FROM jobs
            WHERE organization_id = $1
              AND ($2::text IS NULL OR user_id = $2)
              AND ($3::uuid IS NULL OR input_media_id = $3)
              AND ($4::job_status IS NULL OR status = $4)
            ORDER BY created_at DESC
            LIMIT $5 OFFSET $6
            ",
        )
        .bind(organization_id)
        .bind(user_id)
        .bind(media_id)
        .bind(status)
        .bind(limit)
        .bind(offset)
        .fetch_all(executor)
        .await?;

        let total: i64 = sqlx::query_scalar(
            r"
            SELECT COUNT(*) FROM jobs
            WHERE organization_id = $1
              AND ($2::text IS NULL OR user_id = $2)
              AND ($3::uuid IS NULL OR input_media_id = $3)
              AND ($4::job_status IS NULL OR status = $4)
            ",
        )
        .bind(organization_id)
        .bind(user_id)
        .bind(media_id)
        .bind(status)
        .fetch_one(executor)
        .await?;

        Ok((rows, total))
    }

    /// `deleteJob`: hard delete. Caller must already have ensured the job is terminal or
    /// removed from all broker queues (spec §4.2).
    pub async fn delete<'e, E>(executor: E, job_id: Uuid) -> Result<(), MetadataError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query("DELETE FROM jobs WHERE job_id = $1")
            .bind(job_id)
            .execute(executor)
            .await?;
        Ok(())
    }

    /// Feeds the reconciliation sweep (spec §7, §4.9 C9): non-terminal jobs whose
    /// `started_at`/`queued_at` predates `older_than`.
    pub async fn find_stuck<'e, E>(
        executor: E,
        older_than: DateTime<Utc>,
    ) -> Result<Vec<Job>, MetadataError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let rows = sqlx::query_as::<_, Job>(
            r"
            SELECT * FROM jobs
            WHERE status IN ('PENDING', 'QUEUED', 'PROCESSING')
              AND COALESCE(started_at, queued_at, created_at) < $1
            ",
        )
        .bind(older_than)
        .fetch_all(executor)
        .await?;
        Ok(rows)
    }
}
