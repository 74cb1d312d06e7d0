use serde::Deserialize;

/// Mirrors `config/settings.yaml` before any path canonicalization or defaulting happens.
#[derive(Debug, Deserialize, Clone)]
pub struct RawSettings {
    pub queue: RawQueueSettings,
    pub storage: RawStorageSettings,
    pub retention: RawRetentionSettings,
    pub secrets: RawSecretSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RawQueueSettings {
    /// Workers per priority tier.
    pub concurrency: usize,
    pub job_timeout_ms: i64,
    pub job_max_retries: i32,
    pub reconcile_interval_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RawStorageSettings {
    /// "local" or "s3"
    pub backend: String,
    pub local_root: String,
    pub s3_bucket: Option<String>,
    pub s3_endpoint: Option<String>,
    pub s3_region: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RawRetentionSettings {
    pub default_retention_days: i64,
    pub completed_entry_retention_hours: i64,
    pub failed_tombstone_retention_days: i64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RawSecretSettings {
    pub database_url: String,
}
