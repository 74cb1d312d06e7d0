use crate::error::CoordinatorError;
use crate::Coordinator;
use media_core::{Job, JobStatus, ResultType};
use media_metadata::JobStore;
use serde_json::Value;
use uuid::Uuid;

/// The tagged value `getJobResult` returns (spec §6): not a `Job` itself, just the part a
/// caller wants once the job is done.
#[derive(Debug, Clone)]
pub struct JobResult {
    pub result_type: ResultType,
    pub data: Option<Value>,
    pub media_id: Option<Uuid>,
}

impl Coordinator {
    pub async fn get_job(
        &self,
        organization_id: &str,
        job_id: Uuid,
        user_id: Option<&str>,
    ) -> Result<Job, CoordinatorError> {
        Ok(JobStore::find(&self.pool, organization_id, job_id, user_id).await?)
    }

    pub async fn list_jobs(
        &self,
        organization_id: &str,
        status: Option<JobStatus>,
        media_id: Option<Uuid>,
        user_id: Option<&str>,
        page: i64,
        limit: i64,
    ) -> Result<(Vec<Job>, i64), CoordinatorError> {
        Ok(JobStore::list(&self.pool, organization_id, status, media_id, user_id, page, limit).await?)
    }

    /// `getJobResult` (spec §6). Fails `IllegalState` if the job has not reached `COMPLETED`.
    pub async fn get_job_result(
        &self,
        organization_id: &str,
        job_id: Uuid,
        user_id: Option<&str>,
    ) -> Result<JobResult, CoordinatorError> {
        let job = JobStore::find(&self.pool, organization_id, job_id, user_id).await?;
        if job.status != JobStatus::Completed {
            return Err(CoordinatorError::IllegalState);
        }
        let result_type = job.result_type.ok_or(CoordinatorError::IllegalState)?;
        Ok(JobResult {
            result_type,
            data: job.result_data,
            media_id: job.result_media_id,
        })
    }

    /// `queueStats` (spec §6).
    pub async fn queue_stats(&self) -> Result<media_queue::QueueStats, CoordinatorError> {
        Ok(self.broker.stats().await?)
    }
}
