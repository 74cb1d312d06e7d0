use clap::Parser;
use color_eyre::Result;
use media_metadata::get_db_pool;
use media_queue::PriorityQueueBroker;
use reconciler::sweep_once;
use settings::load_app_settings;
use tracing::{info, warn};
use tracing::Level;
use tracing_subscriber::{fmt, EnvFilter};

/// Background sweep process (spec §7, C9): periodically reconciles jobs stuck in a
/// non-terminal status with no live broker entry. Runs as its own binary so it can be
/// scaled and deployed independently of the worker fleet, mirroring the teacher's
/// `tasks` process.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Overrides `queue.reconcile_interval` from settings.yaml for this process.
    #[clap(long)]
    interval_secs: Option<u64>,
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

    let broker = PriorityQueueBroker::new(
        pool.clone(),
        settings.queue.job_max_retries,
        settings.retention.completed_entry_retention,
        settings.retention.failed_tombstone_retention,
    );

    let interval_secs = args.interval_secs.unwrap_or(settings.queue.reconcile_interval.as_secs());
    let mut ticker = tokio::time::interval(std::time::Duration::from_secs(interval_secs));
    info!(interval_secs, "reconciliation sweep starting");

    loop {
        ticker.tick().await;
        match sweep_once(&pool, &broker, settings.queue.job_timeout).await {
            Ok(swept) if swept > 0 => info!(swept, "sweep cycle reconciled stuck jobs"),
            Ok(_) => {}
            Err(e) => warn!(error = %e, "sweep cycle failed"),
        }
    }
}
