use crate::RawSettings;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct AppSettings {
    pub queue: QueueSettings,
    pub storage: StorageSettings,
    pub retention: RetentionSettings,
    pub secrets: SecretSettings,
}

#[derive(Debug, Clone)]
pub struct QueueSettings {
    pub concurrency: usize,
    pub job_timeout: Duration,
    pub job_max_retries: i32,
    pub reconcile_interval: Duration,
}

#[derive(Debug, Clone)]
pub enum StorageBackend {
    Local { root: PathBuf },
    S3 { bucket: String, endpoint: Option<String>, region: Option<String> },
}

#[derive(Debug, Clone)]
pub struct StorageSettings {
    pub backend: StorageBackend,
}

#[derive(Debug, Clone)]
pub struct RetentionSettings {
    pub default_retention: chrono::Duration,
    pub completed_entry_retention: chrono::Duration,
    pub failed_tombstone_retention: chrono::Duration,
}

#[derive(Debug, Clone)]
pub struct SecretSettings {
    pub database_url: String,
}

impl From<RawSettings> for AppSettings {
    fn from(raw: RawSettings) -> Self {
        let backend = match raw.storage.backend.as_str() {
            "s3" => StorageBackend::S3 {
                bucket: raw.storage.s3_bucket.unwrap_or_default(),
                endpoint: raw.storage.s3_endpoint,
                region: raw.storage.s3_region,
            },
            _ => {
                let root = std::path::absolute(&raw.storage.local_root)
                    .expect("Invalid storage.local_root");
                StorageBackend::Local { root }
            }
        };

        Self {
            queue: QueueSettings {
                concurrency: raw.queue.concurrency,
                job_timeout: Duration::from_millis(raw.queue.job_timeout_ms as u64),
                job_max_retries: raw.queue.job_max_retries,
                reconcile_interval: Duration::from_secs(raw.queue.reconcile_interval_secs),
            },
            storage: StorageSettings { backend },
            retention: RetentionSettings {
                default_retention: chrono::Duration::days(raw.retention.default_retention_days),
                completed_entry_retention: chrono::Duration::hours(
                    raw.retention.completed_entry_retention_hours,
                ),
                failed_tombstone_retention: chrono::Duration::days(
                    raw.retention.failed_tombstone_retention_days,
                ),
            },
            secrets: SecretSettings {
                database_url: raw.secrets.database_url,
            },
        }
    }
}
