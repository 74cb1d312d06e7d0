use thiserror::Error;

/// All object-store failures surface as a single retriable kind (spec §4.3).
#[derive(Debug, Error)]
#[error("storage error during {operation}: {source}")]
pub struct StoreError {
    pub operation: &'static str,
    #[source]
    pub source: Box<dyn std::error::Error + Send + Sync>,
}

impl StoreError {
    pub fn new(operation: &'static str, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self {
            operation,
            source: Box::new(source),
        }
    }
}

#[derive(Debug, Error)]
#[error("object not found at {0}")]
pub struct NotFoundError(pub String);
