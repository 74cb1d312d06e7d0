use thiserror::Error;

/// Mirrors the teacher's `DbError`, extended with the CAS-mismatch variant the metadata
/// gateway's `transition_job` primitive needs (spec §4.2).
#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("database error: {0}")]
    Sqlx(sqlx::Error),

    #[error("unique constraint violated")]
    UniqueViolation(sqlx::Error),

    #[error("json serialization error: {0}")]
    SerdeJson(#[from] serde_json::Error),

    #[error("not found")]
    NotFound,

    #[error("status compare-and-set failed: job was not in an expected state")]
    StateMismatch,
}

impl From<sqlx::Error> for MetadataError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => Self::NotFound,
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                Self::UniqueViolation(err)
            }
            _ => Self::Sqlx(err),
        }
    }
}
