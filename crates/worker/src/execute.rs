use crate::context::WorkerContext;
use crate::result::{checksum, media_type_for_mime, result_storage_path};
use chrono::Utc;
use media_core::{ErrorCode, Job, JobStatus};
use media_metadata::{JobPatch, JobStore, MediaFileStore, NewMediaFile, NewUsageRecord, UsageStore};
use media_queue::QueueEntry;
use media_registry::{ActionContext, ActionOutcome, FileInfo};
use serde_json::{json, Value};
use tracing::{error, info, warn};
use uuid::Uuid;

/// What the worker loop does with a finished `execute` call: whether to `ack` or `nack`
/// the broker entry (spec §4.6's pseudocode).
pub enum Outcome {
    Ack,
    Nack { reason: String },
}

/// The claim-execute-ack body (spec §4.6 `execute(entry)`). A CAS mismatch at any step is
/// an invariant violation (spec §7): logged, the entry is dropped (`Ack`), no retry.
pub async fn execute_entry(ctx: &WorkerContext, entry: &QueueEntry) -> Outcome {
    let job_id = entry.job_id;
    let stale_before = Utc::now() - chrono::Duration::from_std(ctx.job_timeout).unwrap_or_default();

    let job = match JobStore::claim_for_worker(&ctx.pool, job_id, &ctx.worker_id, stale_before).await {
        Ok(job) => job,
        Err(media_metadata::MetadataError::StateMismatch) => {
            warn!(job_id = %job_id, "claim CAS mismatch, dropping entry (spec §7 invariant violation)");
            return Outcome::Ack;
        }
        Err(e) => {
            error!(job_id = %job_id, error = %e, "metadata store error claiming job, retrying");
            return Outcome::Nack {
                reason: format!("metadata error: {e}"),
            };
        }
    };

    info!(job_id = %job_id, worker_id = %ctx.worker_id, action_id = %job.action_id, "claimed job");

    match run_job(ctx, &job, entry.attempts_made).await {
        Ok(()) => Outcome::Ack,
        Err(RunError::Retriable(reason)) => {
            requeue_for_retry(ctx, &job).await;
            Outcome::Nack { reason }
        }
        Err(RunError::NonRetriable { code, message }) => {
            fail_job(ctx, &job, entry.attempts_made, code, &message).await;
            Outcome::Ack
        }
    }
}

/// CAS `PROCESSING -> QUEUED` ahead of the broker's own `nack` (spec §4.4 retry-with-
/// backoff), so the redelivered entry can re-claim through the normal
/// `{PENDING,QUEUED} -> PROCESSING` arm instead of needing the job to sit in `PROCESSING`
/// past `JOB_TIMEOUT_MS` before `claim_for_worker`'s stale-witness arm would match it.
async fn requeue_for_retry(ctx: &WorkerContext, job: &Job) {
    let requeued = JobStore::transition(
        &ctx.pool,
        job.job_id,
        &[JobStatus::Processing],
        JobStatus::Queued,
        JobPatch::default(),
    )
    .await;

    match requeued {
        Ok(_) => {}
        Err(media_metadata::MetadataError::StateMismatch) => {
            warn!(job_id = %job.job_id, "job left PROCESSING before it could be requeued for retry (likely cancelled)");
        }
        Err(e) => error!(job_id = %job.job_id, error = %e, "failed to requeue job for retry"),
    }
}

enum RunError {
    Retriable(String),
    NonRetriable { code: ErrorCode, message: String },
}

async fn run_job(ctx: &WorkerContext, job: &Job, attempts_made: i32) -> Result<(), RunError> {
    let descriptor = ctx.registry.get(&job.action_id).map_err(|_| RunError::NonRetriable {
        code: ErrorCode::ActionNotFound,
        message: format!("action {:?} no longer exists in the registry", job.action_id),
    })?;

    let media = MediaFileStore::find(&ctx.pool, &job.organization_id, job.input_media_id)
        .await
        .map_err(|_| RunError::NonRetriable {
            code: ErrorCode::NotFound,
            message: "input media file no longer exists".into(),
        })?;

    let (bytes, _content_type) = ctx
        .store
        .get(&media.storage_path)
        .await
        .map_err(|e| RunError::Retriable(format!("storage error downloading input: {e}")))?;

    let action_ctx = ActionContext {
        bytes: bytes.to_vec(),
        file_info: FileInfo {
            mime_type: media.mime_type.clone(),
            file_size_bytes: media.file_size_bytes,
        },
        params: job.parameters.clone(),
        organization_id: job.organization_id.clone(),
        user_id: job.user_id.clone(),
        job_id: job.job_id,
    };

    let outcome = tokio::time::timeout(ctx.job_timeout, descriptor.handler.execute(action_ctx))
        .await
        .map_err(|_| RunError::NonRetriable {
            code: ErrorCode::Timeout,
            message: "action execution exceeded the per-job deadline".into(),
        })?
        .map_err(|message| {
            let code = ErrorCode::classify(&message);
            RunError::NonRetriable { code, message }
        })?;

    let (result_type, result_media_id, result_data) = persist_outcome(ctx, job, outcome).await?;

    let started_at = job.started_at.unwrap_or_else(Utc::now);
    let now = Utc::now();
    let processing_time_ms = (now - started_at).num_milliseconds().max(0);

    let completed = JobStore::transition(
        &ctx.pool,
        job.job_id,
        &[JobStatus::Processing],
        JobStatus::Completed,
        JobPatch {
            completed_at: Some(now),
            retry_count: Some(attempts_made),
            result_type: Some(Some(result_type)),
            result_media_id: Some(result_media_id),
            result_data: Some(Some(result_data.clone())),
            processing_time_ms: Some(Some(processing_time_ms)),
            ..Default::default()
        },
    )
    .await;

    match completed {
        Ok(_) => {
            emit_usage(ctx, job, JobStatus::Completed, processing_time_ms, &result_data).await;
            Ok(())
        }
        Err(media_metadata::MetadataError::StateMismatch) => {
            // The job was cancelled while we were executing (spec §5 cooperative
            // cancellation): our result is discarded, the uploaded bytes are orphaned
            // for the reconciliation sweep / 30-day expiry to clean up.
            warn!(job_id = %job.job_id, "job was cancelled mid-execution, discarding result");
            Ok(())
        }
        Err(e) => Err(RunError::Retriable(format!("metadata error persisting result: {e}"))),
    }
}

async fn persist_outcome(
    ctx: &WorkerContext,
    job: &Job,
    outcome: ActionOutcome,
) -> Result<(media_core::ResultType, Option<Uuid>, Value), RunError> {
    match outcome {
        ActionOutcome::Json { data } => Ok((media_core::ResultType::Json, None, data)),
        ActionOutcome::File {
            bytes,
            mime_type,
            filename,
            metadata,
        } => {
            let media_id = upload_result_file(ctx, job, &bytes, &mime_type, filename.as_deref()).await?;
            Ok((media_core::ResultType::File, Some(media_id), metadata))
        }
        ActionOutcome::Files { files } => {
            let mut file_ids = Vec::with_capacity(files.len());
            for file in files {
                let media_id =
                    upload_result_file(ctx, job, &file.bytes, &file.mime_type, file.filename.as_deref()).await?;
                file_ids.push(media_id.to_string());
            }
            Ok((media_core::ResultType::Files, None, json!({ "fileIds": file_ids })))
        }
    }
}

async fn upload_result_file(
    ctx: &WorkerContext,
    job: &Job,
    bytes: &[u8],
    mime_type: &str,
    filename: Option<&str>,
) -> Result<Uuid, RunError> {
    let media_type = media_type_for_mime(mime_type);
    let storage_path = result_storage_path(&job.organization_id, &job.action_id, media_type, filename, mime_type);

    ctx.store
        .put(
            &storage_path,
            bytes::Bytes::copy_from_slice(bytes),
            mime_type,
            std::collections::HashMap::new(),
        )
        .await
        .map_err(|e| RunError::Retriable(format!("storage error uploading result: {e}")))?;

    let mut thumbnail_path = None;
    if matches!(media_type, media_core::MediaType::Image) {
        match media_thumbnail::generate_preview(bytes, &storage_path) {
            Ok(thumb) => {
                if let Err(e) = ctx
                    .store
                    .put(
                        &thumb.storage_path,
                        bytes::Bytes::from(thumb.bytes),
                        thumb.content_type,
                        std::collections::HashMap::new(),
                    )
                    .await
                {
                    warn!(job_id = %job.job_id, error = %e, "thumbnail upload failed, continuing without one");
                } else {
                    thumbnail_path = Some(thumb.storage_path);
                }
            }
            Err(e) => {
                warn!(job_id = %job.job_id, error = %e, "thumbnail generation failed, continuing without one");
            }
        }
    }

    let sums = checksum(bytes);
    let media = MediaFileStore::create(
        &ctx.pool,
        NewMediaFile {
            media_id: Uuid::new_v4(),
            organization_id: job.organization_id.clone(),
            storage_path,
            media_type,
            mime_type: mime_type.to_string(),
            file_size_bytes: bytes.len() as i64,
            checksum_md5: sums.md5,
            checksum_sha256: sums.sha256,
            metadata: json!({}),
            thumbnail_path,
            expires_at: Some(Utc::now() + chrono::Duration::days(30)),
        },
    )
    .await
    .map_err(|e| RunError::Retriable(format!("metadata error creating result media: {e}")))?;

    Ok(media.media_id)
}

async fn fail_job(ctx: &WorkerContext, job: &Job, attempts_made: i32, code: ErrorCode, message: &str) {
    let now = Utc::now();
    let started_at = job.started_at.unwrap_or(now);
    let processing_time_ms = (now - started_at).num_milliseconds().max(0);

    let failed = JobStore::transition(
        &ctx.pool,
        job.job_id,
        &[JobStatus::Processing],
        JobStatus::Failed,
        JobPatch {
            completed_at: Some(now),
            retry_count: Some(attempts_made),
            error_code: Some(Some(code.as_str().to_string())),
            error_message: Some(Some(message.to_string())),
            processing_time_ms: Some(Some(processing_time_ms)),
            ..Default::default()
        },
    )
    .await;

    match failed {
        Ok(_) => emit_usage(ctx, job, JobStatus::Failed, processing_time_ms, &Value::Null).await,
        Err(media_metadata::MetadataError::StateMismatch) => {
            warn!(job_id = %job.job_id, "job left PROCESSING before failure could be recorded (likely cancelled)");
        }
        Err(e) => error!(job_id = %job.job_id, error = %e, "failed to persist job failure"),
    }
}

async fn emit_usage(ctx: &WorkerContext, job: &Job, status: JobStatus, processing_time_ms: i64, result_data: &Value) {
    let ai_tokens_used = result_data.get("aiTokensUsed").and_then(Value::as_i64);
    if let Err(e) = UsageStore::insert(
        &ctx.pool,
        NewUsageRecord {
            record_id: Uuid::new_v4(),
            organization_id: job.organization_id.clone(),
            job_id: job.job_id,
            action_type: job.action_id.clone(),
            status,
            processing_time_ms,
            ai_tokens_used,
        },
    )
    .await
    {
        error!(job_id = %job.job_id, error = %e, "failed to emit usage record");
    }
}

/// Advisory worker-id, matching the teacher's `worker-<pid>-<n>` convention (spec §4.6
/// step 1).
#[must_use]
pub fn worker_id(tier_label: &str, index: usize) -> String {
    format!("worker-{}-{tier_label}-{index}", std::process::id())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn worker_id_embeds_pid_tier_and_index() {
        let id = worker_id("high", 3);
        assert!(id.starts_with("worker-"));
        assert!(id.ends_with("-high-3"));
    }
}
