use media_core::CoreError;
use media_metadata::MetadataError;
use media_queue::QueueError;
use thiserror::Error;

/// Unifies the three lower gateways' errors into the one surface the external interfaces
/// (spec §6) expose. Variant names mirror the semantic error kinds of spec §7, not the
/// originating crate.
#[derive(Debug, Error)]
pub enum CoordinatorError {
    #[error(transparent)]
    Validation(#[from] CoreError),

    #[error("job not found")]
    NotFound,

    #[error("job is not in a cancellable or deletable state")]
    IllegalState,

    #[error("metadata store error: {0}")]
    Metadata(MetadataError),

    #[error("queue broker error: {0}")]
    Queue(#[from] QueueError),
}

/// `MetadataError::NotFound` collapses into `CoordinatorError::NotFound`; everything else
/// is an opaque storage failure.
impl From<MetadataError> for CoordinatorError {
    fn from(err: MetadataError) -> Self {
        match err {
            MetadataError::NotFound => Self::NotFound,
            other => Self::Metadata(other),
        }
    }
}
