use crate::error::CoordinatorError;
use crate::Coordinator;
use chrono::Utc;
use media_core::{Job, JobStatus};
use media_metadata::{JobPatch, JobStore, MediaFileStore};
use uuid::Uuid;

impl Coordinator {
    /// `cancelJob` (spec §4.7). A job already `PROCESSING` is cancelled cooperatively: the
    /// worker discovers the new status on its own next CAS and discards its result (§5).
    pub async fn cancel_job(
        &self,
        organization_id: &str,
        job_id: Uuid,
        requester_user_id: Option<&str>,
    ) -> Result<Job, CoordinatorError> {
        let job = JobStore::find(&self.pool, organization_id, job_id, requester_user_id).await?;
        if job.status.is_terminal() {
            return Err(CoordinatorError::IllegalState);
        }

        if matches!(job.status, JobStatus::Pending | JobStatus::Queued) {
            self.broker.remove(job_id).await?;
        }

        let cancelled = JobStore::transition(
            &self.pool,
            job_id,
            &[JobStatus::Pending, JobStatus::Queued, JobStatus::Processing],
            JobStatus::Cancelled,
            JobPatch {
                completed_at: Some(Utc::now()),
                ..Default::default()
            },
        )
        .await?;
        Ok(cancelled)
    }

    /// `deleteJob` (spec §4.7). Hard-deletes the job row; optionally soft-deletes the
    /// result media and best-effort removes its blob and thumbnail from the object store.
    pub async fn delete_job(
        &self,
        organization_id: &str,
        job_id: Uuid,
        requester_user_id: Option<&str>,
        also_delete_result_file: bool,
    ) -> Result<(), CoordinatorError> {
        let job = JobStore::find(&self.pool, organization_id, job_id, requester_user_id).await?;

        if matches!(job.status, JobStatus::Pending | JobStatus::Queued) {
            self.broker.remove(job_id).await?;
        }

        if also_delete_result_file {
            if let Some(result_media_id) = job.result_media_id {
                let media = MediaFileStore::find(&self.pool, organization_id, result_media_id).await;
                if let Ok(media) = media {
                    MediaFileStore::soft_delete(&self.pool, organization_id, result_media_id).await?;
                    if let Err(e) = self.store.delete(&media.storage_path).await {
                        tracing::warn!(job_id = %job_id, error = %e, "failed to delete result blob");
                    }
                    if let Some(thumb) = &media.thumbnail_path {
                        if let Err(e) = self.store.delete(thumb).await {
                            tracing::warn!(job_id = %job_id, error = %e, "failed to delete thumbnail blob");
                        }
                    }
                }
            }
        }

        JobStore::delete(&self.pool, job_id).await?;
        Ok(())
    }
}
