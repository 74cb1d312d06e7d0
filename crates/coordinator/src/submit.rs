use crate::error::CoordinatorError;
use crate::Coordinator;
use bon::bon;
use media_core::{CoreError, Job, JobStatus, PriorityTier};
use media_metadata::{JobPatch, JobStore, MediaFileStore, NewJob};
use media_queue::EnqueueSpec;
use serde_json::Value;
use uuid::Uuid;

#[bon]
impl Coordinator {
    /// `submitJob` (spec §4.5). Validates against the registry and the input media's
    /// readiness, inserts a `PENDING` job, enqueues it on the size-derived tier, then
    /// upgrades to `QUEUED`. A cancel racing step 7 is tolerated: the broker entry is
    /// removed best-effort and the (now-cancelled) job is returned instead of erroring.
    ///
    /// Built with `bon`, the same builder crate the teacher uses for `enqueue_job`.
    #[builder]
    pub async fn submit_job(
        &self,
        #[builder(start_fn)] organization_id: String,
        input_media_id: Uuid,
        action_id: String,
        user_id: Option<String>,
        api_key_id: Option<String>,
        #[builder(default = serde_json::json!({}))] parameters: Value,
        #[builder(default = 50)] priority: i32,
    ) -> Result<Job, CoordinatorError> {
        let input_media = MediaFileStore::find(&self.pool, &organization_id, input_media_id).await?;
        if !input_media.status.is_ready() {
            return Err(CoordinatorError::NotFound);
        }

        let descriptor = self.registry.get(&action_id)?;
        if descriptor.media_type != input_media.media_type {
            return Err(CoreError::ActionNotSupported(action_id).into());
        }

        let validation = descriptor.validate(&parameters);
        if !validation.is_valid() {
            return Err(CoreError::Validation(validation.errors).into());
        }

        let job_id = Uuid::new_v4();
        let job = JobStore::create_pending(
            &self.pool,
            NewJob {
                job_id,
                organization_id: organization_id.clone(),
                user_id,
                api_key_id,
                input_media_id,
                action_id: action_id.clone(),
                action_category: descriptor.category,
                parameters: parameters.clone(),
                priority,
                priority_tier: PriorityTier::of_size(input_media.file_size_bytes),
            },
        )
        .await?;

        self.broker
            .enqueue(EnqueueSpec {
                job_id,
                tier: job.priority_tier,
                action_id,
                payload: parameters,
                priority,
            })
            .await?;

        let transitioned = JobStore::transition(
            &self.pool,
            job_id,
            &[JobStatus::Pending],
            JobStatus::Queued,
            JobPatch {
                queued_at: Some(chrono::Utc::now()),
                ..Default::default()
            },
        )
        .await;

        match transitioned {
            Ok(job) => Ok(job),
            Err(media_metadata::MetadataError::StateMismatch) => {
                let _ = self.broker.remove(job_id).await;
                Ok(JobStore::find(&self.pool, &organization_id, job_id, None).await?)
            }
            Err(e) => Err(e.into()),
        }
    }
}
