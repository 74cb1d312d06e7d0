use chrono::Duration as ChronoDuration;
use clap::Parser;
use color_eyre::Result;
use media_core::PriorityTier;
use media_metadata::get_db_pool;
use media_queue::PriorityQueueBroker;
use settings::load_app_settings;
use std::sync::Arc;
use tracing::info;
use tracing::Level;
use tracing_subscriber::{fmt, EnvFilter};
use worker::context::WorkerContext;
use worker::execute::worker_id;
use worker::loop_runner::run_tier_worker;

/// Long-running consumer fleet: `concurrency` workers per priority tier (spec §4.6 C6).
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Overrides `queue.concurrency` from settings.yaml for this process.
    #[clap(long)]
    concurrency: Option<usize>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into());
    let subscriber = fmt::Subscriber::builder()
        .with_max_level(Level::INFO)
        .with_env_filter(filter)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    color_eyre::install()?;

    let args = Args::parse();
    let settings = load_app_settings()?;
    let pool = get_db_pool(&settings.secrets.database_url, true).await?;

    let registry = Arc::new(media_registry::default_registry());

    let store = media_store::build_object_store(&settings.storage.backend)?;
    let broker = Arc::new(PriorityQueueBroker::new(
        pool.clone(),
        settings.queue.job_max_retries,
        ChronoDuration::hours(24),
        ChronoDuration::days(7),
    ));

    let concurrency = args.concurrency.unwrap_or(settings.queue.concurrency);
    info!(concurrency, "starting worker fleet");

    let mut handles = Vec::new();
    for tier in PriorityTier::all() {
        let tier_label = tier.as_str().to_lowercase();
        for index in 0..concurrency {
            let ctx = WorkerContext::new(
                worker_id(&tier_label, index),
                pool.clone(),
                registry.clone(),
                broker.clone(),
                store.clone(),
                settings.queue.job_timeout,
            );
            handles.push(tokio::spawn(run_tier_worker(ctx, tier)));
        }
    }

    for handle in handles {
        handle.await?;
    }

    Ok(())
}
