mod error;
mod lifecycle;
mod query;
mod submit;

pub use error::CoordinatorError;
pub use query::JobResult;

use media_registry::ActionRegistry;
use media_store::ObjectStore;
use sqlx::PgPool;
use std::sync::Arc;

/// The facade the HTTP front door (or any other caller) talks to (spec §6). Plain async
/// library, no transport of its own — routes, auth, and request parsing live outside this
/// crate.
pub struct Coordinator {
    pool: PgPool,
    registry: Arc<ActionRegistry>,
    broker: media_queue::PriorityQueueBroker,
    store: Arc<dyn ObjectStore>,
}

impl Coordinator {
    #[must_use]
    pub fn new(
        pool: PgPool,
        registry: Arc<ActionRegistry>,
        broker: media_queue::PriorityQueueBroker,
        store: Arc<dyn ObjectStore>,
    ) -> Self {
        Self {
            pool,
            registry,
            broker,
            store,
        }
    }
}
