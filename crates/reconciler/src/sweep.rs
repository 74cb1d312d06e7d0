use chrono::Utc;
use media_core::{ErrorCode, JobStatus};
use media_metadata::{JobPatch, JobStore, MetadataError};
use media_queue::PriorityQueueBroker;
use sqlx::PgPool;
use std::time::Duration;
use tracing::{info, warn};

/// Periodic sweep (spec §7, C9): a non-terminal job with no live broker entry and a stale
/// `startedAt`/`queuedAt`/`createdAt` is CAS'd to `FAILED{STALLED}` so no job is ever stuck
/// forever — the reconciliation guarantee that backs the "no LOST or STUCK state" claim.
pub async fn sweep_once(pool: &PgPool, broker: &PriorityQueueBroker, job_timeout: Duration) -> Result<usize, MetadataError> {
    let cutoff = Utc::now() - chrono::Duration::from_std(job_timeout * 2).unwrap_or_default();
    let candidates = JobStore::find_stuck(pool, cutoff).await?;

    let mut swept = 0;
    for job in candidates {
        let still_queued = broker.find(job.job_id).await.unwrap_or_default().is_some();
        if still_queued {
            continue;
        }

        let result = JobStore::transition(
            pool,
            job.job_id,
            &[JobStatus::Pending, JobStatus::Queued, JobStatus::Processing],
            JobStatus::Failed,
            JobPatch {
                completed_at: Some(Utc::now()),
                error_code: Some(Some(ErrorCode::Stalled.as_str().to_string())),
                error_message: Some(Some("no live broker entry found for a stale job".into())),
                ..Default::default()
            },
        )
        .await;

        match result {
            Ok(_) => {
                warn!(job_id = %job.job_id, "reconciled orphaned job to FAILED{{STALLED}}");
                swept += 1;
            }
            Err(MetadataError::StateMismatch) => {
                // Raced with a worker or the lifecycle controller; leave it alone.
            }
            Err(e) => return Err(e),
        }
    }

    if swept > 0 {
        info!(swept, "reconciliation sweep completed");
    }
    Ok(swept)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cutoff_is_twice_the_job_timeout_in_the_past() {
        let timeout = Duration::from_secs(100);
        let now = Utc::now();
        let cutoff = now - chrono::Duration::from_std(timeout * 2).unwrap();
        assert!(cutoff < now - chrono::Duration::seconds(199));
        assert!(cutoff > now - chrono::Duration::seconds(201));
    }
}
