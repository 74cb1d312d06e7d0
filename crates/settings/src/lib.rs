mod load_settings;
mod raw_settings;
mod settings;

pub use load_settings::*;
pub use raw_settings::*;
pub use settings::*;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_sample(dir: &std::path::Path) -> std::path::PathBuf {
        let path = dir.join("settings.yaml");
        let mut f = std::fs::File::create(&path).unwrap();
        write!(
            f,
            r#"
queue:
  concurrency: 5
  job_timeout_ms: 300000
  job_max_retries: 3
  reconcile_interval_secs: 60
storage:
  backend: local
  local_root: ./media
retention:
  default_retention_days: 30
  completed_entry_retention_hours: 24
  failed_tombstone_retention_days: 7
secrets:
  database_url: postgres://localhost/media
"#
        )
        .unwrap();
        path
    }

    #[test]
    fn loads_and_converts_settings() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_sample(dir.path());
        let settings = load_settings_from_path(&path, false).unwrap();
        assert_eq!(settings.queue.concurrency, 5);
        assert_eq!(settings.queue.job_max_retries, 3);
        assert!(matches!(
            settings.storage.backend,
            StorageBackend::Local { .. }
        ));
    }
}
