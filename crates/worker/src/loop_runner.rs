use crate::context::WorkerContext;
use crate::execute::{execute_entry, Outcome};
use media_core::PriorityTier;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{info, warn};

/// Caps claims at 10/s per worker to protect downstream services (spec §5).
const CLAIM_RATE_LIMIT: Duration = Duration::from_millis(100);
/// How long an empty queue is slept on before the next claim attempt.
const IDLE_SLEEP: Duration = Duration::from_millis(500);
/// Extra slack added on top of the per-job deadline for the broker's visibility window
/// (spec §4.6's pseudocode: `visibility = jobTimeout + 30s`).
const VISIBILITY_SLACK: Duration = Duration::from_secs(30);

/// One worker's endless claim-execute-ack loop for a single tier (spec §4.6). Bound to one
/// queue, as §5 requires ("HIGH is ... never starves LOW as each worker is bound to one
/// queue"); concurrency across workers on the same tier is achieved by spawning several of
/// these, not by this loop fanning out internally.
pub async fn run_tier_worker(ctx: WorkerContext, tier: PriorityTier) {
    info!(worker_id = %ctx.worker_id, ?tier, "worker starting");
    let visibility = ctx.job_timeout + VISIBILITY_SLACK;

    loop {
        let claim_started = tokio::time::Instant::now();
        let entry = match ctx.broker.claim(tier, &ctx.worker_id, visibility).await {
            Ok(entry) => entry,
            Err(e) => {
                warn!(worker_id = %ctx.worker_id, ?tier, error = %e, "claim failed, backing off");
                sleep(IDLE_SLEEP).await;
                continue;
            }
        };

        let Some(entry) = entry else {
            sleep(IDLE_SLEEP).await;
            continue;
        };

        let job_id = entry.job_id;
        match execute_entry(&ctx, &entry).await {
            Outcome::Ack => {
                if let Err(e) = ctx.broker.ack(job_id, tier).await {
                    warn!(worker_id = %ctx.worker_id, %job_id, error = %e, "failed to ack completed entry");
                }
            }
            Outcome::Nack { reason } => {
                if let Err(e) = ctx.broker.nack(job_id, tier, &reason).await {
                    warn!(worker_id = %ctx.worker_id, %job_id, error = %e, "failed to nack entry");
                }
            }
        }

        let elapsed = claim_started.elapsed();
        if elapsed < CLAIM_RATE_LIMIT {
            sleep(CLAIM_RATE_LIMIT - elapsed).await;
        }
    }
}
