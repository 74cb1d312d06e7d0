use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::env;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};

/// Walks up from the running binary looking for a `migrations/` directory, mirroring the
/// teacher's `find_migrations_dir` (workspace layout puts migrations at the repo root,
/// several directories above any binary's `target/` output).
fn find_migrations_dir() -> Result<PathBuf, sqlx::Error> {
    let mut current_dir = env::current_exe()
        .map_err(sqlx::Error::Io)?
        .parent()
        .map(std::path::Path::to_path_buf)
        .unwrap_or_default();

    loop {
        let migrations_path = current_dir.join("migrations");
        if migrations_path.is_dir() {
            return Ok(migrations_path);
        }
        if !current_dir.pop() {
            return Err(sqlx::Error::Configuration(
                "could not find a migrations/ directory in any parent path".into(),
            ));
        }
    }
}

/// Connects and, optionally, runs pending migrations (spec §4.10 bootstrap).
pub async fn get_db_pool(database_url: &str, run_migrations: bool) -> Result<PgPool, sqlx::Error> {
    info!(
        database = database_url.rsplit('/').next().unwrap_or("?"),
        "connecting to database"
    );
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .min_connections(1)
        .max_lifetime(Duration::from_secs(30 * 60))
        .idle_timeout(Duration::from_secs(10 * 60))
        .acquire_timeout(Duration::from_secs(10))
        .test_before_acquire(true)
        .connect(database_url)
        .await?;

    if run_migrations {
        match find_migrations_dir() {
            Ok(dir) => {
                let migrator = Migrator::new(dir).await?;
                match migrator.run(&pool).await {
                    Ok(()) => info!("database migrations completed"),
                    Err(e) => warn!(error = %e, "database migration run failed"),
                }
            }
            Err(e) => warn!(error = %e, "skipping migrations, directory not found"),
        }
    }
    Ok(pool)
}
