use media_queue::PriorityQueueBroker;
use media_registry::ActionRegistry;
use media_store::ObjectStore;
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;

/// Everything a single worker needs for its claim-execute-ack loop (spec §4.6). Grounded
/// on the teacher's `WorkerContext`, trimmed to this pipeline's concerns (no media
/// analyzer, no S2S client — this crate has no ML side).
pub struct WorkerContext {
    pub worker_id: String,
    pub pool: PgPool,
    pub registry: Arc<ActionRegistry>,
    pub broker: Arc<PriorityQueueBroker>,
    pub store: Arc<dyn ObjectStore>,
    pub job_timeout: Duration,
}

impl WorkerContext {
    #[must_use]
    pub fn new(
        worker_id: String,
        pool: PgPool,
        registry: Arc<ActionRegistry>,
        broker: Arc<PriorityQueueBroker>,
        store: Arc<dyn ObjectStore>,
        job_timeout: Duration,
    ) -> Self {
        Self {
            worker_id,
            pool,
            registry,
            broker,
            store,
            job_timeout,
        }
    }
}
