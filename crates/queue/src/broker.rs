use crate::entry::{QueueEntry, QueueStats, TierStats};
use crate::error::QueueError;
use chrono::{DateTime, Duration, Utc};
use media_core::PriorityTier;
use serde_json::Value;
use sqlx::PgPool;
use std::time::Duration as StdDuration;
use tracing::{info, warn};
use uuid::Uuid;

/// Durable three-tier priority queue broker backed by Postgres (spec §4.4). Grounded on
/// the teacher's single-tier `job_queue`/`jobs` claim query (`FOR UPDATE SKIP LOCKED`),
/// generalized to per-tier dispatch plus retry-with-backoff and a dead-letter tombstone.
pub struct PriorityQueueBroker {
    pool: PgPool,
    max_attempts: i32,
    completed_retention: Duration,
    failed_retention: Duration,
}

/// What `enqueue` needs from the submission coordinator (spec §4.5 step 6).
pub struct EnqueueSpec {
    pub job_id: Uuid,
    pub tier: PriorityTier,
    pub action_id: String,
    pub payload: Value,
    pub priority: i32,
}

/// `nextAttemptAt = now + base * 2^(attemptsMade-1)` per spec §4.4.
#[must_use]
pub fn backoff_duration(tier: PriorityTier, attempts_made: i32) -> Duration {
    let base = tier.backoff_base_secs();
    let exponent = (attempts_made - 1).max(0) as u32;
    Duration::seconds(base * 2i64.pow(exponent))
}

impl PriorityQueueBroker {
    #[must_use]
    pub fn new(
        pool: PgPool,
        max_attempts: i32,
        completed_retention: Duration,
        failed_retention: Duration,
    ) -> Self {
        Self {
            pool,
            max_attempts,
            completed_retention,
            failed_retention,
        }
    }

    /// Durable enqueue: returns only after the entry is persisted. The entry's broker-side
    /// id equals `jobId` (spec §4.5 step 6), so a retried submission call is idempotent —
    /// `ON CONFLICT DO NOTHING` makes a second enqueue for the same job a no-op, preserving
    /// invariant 5 (at most one active broker entry per job).
    pub async fn enqueue(&self, spec: EnqueueSpec) -> Result<(), QueueError> {
        sqlx::query(
            r"
            INSERT INTO queue_entries (job_id, tier, action_id, payload, priority)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (job_id) DO NOTHING
            ",
        )
        .bind(spec.job_id)
        .bind(spec.tier)
        .bind(spec.action_id)
        .bind(spec.payload)
        .bind(spec.priority)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Claims the next visible entry on `tier`, making it invisible until `now + visibility`.
    /// A stalled (expired) claim is eligible for re-delivery, same as a never-claimed entry.
    pub async fn claim(
        &self,
        tier: PriorityTier,
        worker_id: &str,
        visibility: StdDuration,
    ) -> Result<Option<QueueEntry>, QueueError> {
        let visibility = Duration::from_std(visibility).unwrap_or(Duration::seconds(300));
        let claimed_until = Utc::now() + visibility;

        let entry = sqlx::query_as::<_, QueueEntry>(
            r"
            WITH candidate AS (
                SELECT job_id
                FROM queue_entries
                WHERE tier = $1
                  AND next_attempt_at <= now()
                  AND (claimed_until IS NULL OR claimed_until < now())
                ORDER BY priority DESC, next_attempt_at ASC
                FOR UPDATE SKIP LOCKED
                LIMIT 1
            )
            UPDATE queue_entries
            SET claimed_by = $2, claimed_until = $3
            WHERE job_id = (SELECT job_id FROM candidate)
            RETURNING *
            ",
        )
        .bind(tier)
        .bind(worker_id)
        .bind(claimed_until)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(entry) = &entry {
            info!(job_id = %entry.job_id, ?tier, worker_id, "claimed queue entry");
        }
        Ok(entry)
    }

    /// Discards a successfully (or non-retriably) processed entry, retaining a row in
    /// `queue_completed` for operator inspection (spec §4.4 retention).
    pub async fn ack(&self, job_id: Uuid, tier: PriorityTier) -> Result<(), QueueError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM queue_entries WHERE job_id = $1")
            .bind(job_id)
            .execute(&mut *tx)
            .await?;
        sqlx::query(
            "INSERT INTO queue_completed (job_id, tier) VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(job_id)
        .bind(tier)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;
        Ok(())
    }

    /// Retry with exponential backoff, per spec §4.4: `nextAttemptAt = now + base * 2^(attempts-1)`.
    /// After `max_attempts`, the entry moves to a failed tombstone and is not re-delivered.
    pub async fn nack(&self, job_id: Uuid, tier: PriorityTier, reason: &str) -> Result<(), QueueError> {
        let mut tx = self.pool.begin().await?;

        let attempts_made: Option<i32> = sqlx::query_scalar(
            "SELECT attempts_made FROM queue_entries WHERE job_id = $1 FOR UPDATE",
        )
        .bind(job_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(previous_attempts) = attempts_made else {
            tx.commit().await?;
            return Ok(());
        };
        let attempts_made = previous_attempts + 1;

        if attempts_made >= self.max_attempts {
            warn!(job_id = %job_id, ?tier, attempts_made, "moving to dead-letter tombstone");
            let action_id: String =
                sqlx::query_scalar("SELECT action_id FROM queue_entries WHERE job_id = $1")
                    .bind(job_id)
                    .fetch_one(&mut *tx)
                    .await?;
            sqlx::query(
                r"
                INSERT INTO queue_failures (job_id, tier, action_id, reason, attempts_made)
                VALUES ($1, $2, $3, $4, $5)
                ON CONFLICT (job_id) DO NOTHING
                ",
            )
            .bind(job_id)
            .bind(tier)
            .bind(&action_id)
            .bind(reason)
            .bind(attempts_made)
            .execute(&mut *tx)
            .await?;
            sqlx::query("DELETE FROM queue_entries WHERE job_id = $1")
                .bind(job_id)
                .execute(&mut *tx)
                .await?;
        } else {
            let backoff = backoff_duration(tier, attempts_made);
            let next_attempt_at = Utc::now() + backoff;
            warn!(job_id = %job_id, ?tier, attempts_made, ?backoff, reason, "rescheduling with backoff");
            sqlx::query(
                r"
                UPDATE queue_entries
                SET attempts_made = $2, next_attempt_at = $3, claimed_by = NULL, claimed_until = NULL
                WHERE job_id = $1
                ",
            )
            .bind(job_id)
            .bind(attempts_made)
            .bind(next_attempt_at)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Scans all three tiers for `jobId` (spec §4.4 `find`). At most one match, per
    /// invariant 5.
    pub async fn find(&self, job_id: Uuid) -> Result<Option<QueueEntry>, QueueError> {
        let entry = sqlx::query_as::<_, QueueEntry>("SELECT * FROM queue_entries WHERE job_id = $1")
            .bind(job_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(entry)
    }

    /// Idempotent removal, used by cancellation (spec §4.7) — a no-op if absent or already
    /// claimed and acked.
    pub async fn remove(&self, job_id: Uuid) -> Result<(), QueueError> {
        sqlx::query("DELETE FROM queue_entries WHERE job_id = $1")
            .bind(job_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Per-tier `{waiting, active, completed, failed}` (spec §4.4 `stats`).
    pub async fn stats(&self) -> Result<QueueStats, QueueError> {
        let mut stats = QueueStats::default();
        let completed_cutoff = Utc::now() - self.completed_retention;
        let failed_cutoff = Utc::now() - self.failed_retention;

        for tier in PriorityTier::all() {
            let tier_stats = self.tier_stats(tier, completed_cutoff, failed_cutoff).await?;
            match tier {
                PriorityTier::High => stats.high = tier_stats,
                PriorityTier::Normal => stats.normal = tier_stats,
                PriorityTier::Low => stats.low = tier_stats,
            }
        }
        Ok(stats)
    }

    async fn tier_stats(
        &self,
        tier: PriorityTier,
        completed_cutoff: DateTime<Utc>,
        failed_cutoff: DateTime<Utc>,
    ) -> Result<TierStats, QueueError> {
        let waiting: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM queue_entries WHERE tier = $1 AND (claimed_until IS NULL OR claimed_until < now())",
        )
        .bind(tier)
        .fetch_one(&self.pool)
        .await?;
        let active: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM queue_entries WHERE tier = $1 AND claimed_until >= now()",
        )
        .bind(tier)
        .fetch_one(&self.pool)
        .await?;
        let completed: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM queue_completed WHERE tier = $1 AND completed_at >= $2",
        )
        .bind(tier)
        .bind(completed_cutoff)
        .fetch_one(&self.pool)
        .await?;
        let failed: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM queue_failures WHERE tier = $1 AND failed_at >= $2",
        )
        .bind(tier)
        .bind(failed_cutoff)
        .fetch_one(&self.pool)
        .await?;

        Ok(TierStats {
            waiting,
            active,
            completed,
            failed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_doubles_each_attempt_per_tier_base() {
        assert_eq!(backoff_duration(PriorityTier::High, 1), Duration::seconds(1));
        assert_eq!(backoff_duration(PriorityTier::High, 2), Duration::seconds(2));
        assert_eq!(backoff_duration(PriorityTier::High, 3), Duration::seconds(4));
        assert_eq!(backoff_duration(PriorityTier::Normal, 1), Duration::seconds(2));
        assert_eq!(backoff_duration(PriorityTier::Low, 1), Duration::seconds(5));
    }
}
