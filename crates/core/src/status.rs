use sqlx::Type;
use std::fmt;

/// Mirrors the teacher's `job_status` Postgres enum, generalized to the six states
/// this pipeline's jobs can occupy (see spec §3 invariant 1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, serde::Serialize, serde::Deserialize)]
#[sqlx(type_name = "job_status", rename_all = "UPPERCASE")]
pub enum JobStatus {
    Pending,
    Queued,
    Processing,
    Completed,
    Failed,
    Cancelled,
}

impl JobStatus {
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Cancelled)
    }

    /// The ordering used by the status-monotonicity property (spec §8 property 2):
    /// PENDING < QUEUED < PROCESSING < {COMPLETED, FAILED, CANCELLED}.
    #[must_use]
    pub const fn rank(self) -> u8 {
        match self {
            Self::Pending => 0,
            Self::Queued => 1,
            Self::Processing => 2,
            Self::Completed | Self::Failed | Self::Cancelled => 3,
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Pending => "PENDING",
            Self::Queued => "QUEUED",
            Self::Processing => "PROCESSING",
            Self::Completed => "COMPLETED",
            Self::Failed => "FAILED",
            Self::Cancelled => "CANCELLED",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, serde::Serialize, serde::Deserialize)]
#[sqlx(type_name = "priority_tier", rename_all = "UPPERCASE")]
pub enum PriorityTier {
    High,
    Normal,
    Low,
}

const HIGH_NORMAL_BOUNDARY: i64 = 5 * 1024 * 1024;
const NORMAL_LOW_BOUNDARY: i64 = 20 * 1024 * 1024;

impl PriorityTier {
    /// Spec §4.4 / §8 property 4: `< 5 MiB -> HIGH`, `5-20 MiB -> NORMAL`, `> 20 MiB -> LOW`.
    /// Both boundaries land in NORMAL.
    #[must_use]
    pub fn of_size(file_size_bytes: i64) -> Self {
        if file_size_bytes < HIGH_NORMAL_BOUNDARY {
            Self::High
        } else if file_size_bytes > NORMAL_LOW_BOUNDARY {
            Self::Low
        } else {
            Self::Normal
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::High => "HIGH",
            Self::Normal => "NORMAL",
            Self::Low => "LOW",
        }
    }

    #[must_use]
    pub const fn all() -> [Self; 3] {
        [Self::High, Self::Normal, Self::Low]
    }

    /// Retry backoff base per spec §4.4: 1s HIGH, 2s NORMAL, 5s LOW.
    #[must_use]
    pub const fn backoff_base_secs(self) -> i64 {
        match self {
            Self::High => 1,
            Self::Normal => 2,
            Self::Low => 5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tier_boundaries_land_in_normal() {
        assert_eq!(PriorityTier::of_size(5 * 1024 * 1024 - 1), PriorityTier::High);
        assert_eq!(PriorityTier::of_size(5 * 1024 * 1024), PriorityTier::Normal);
        assert_eq!(PriorityTier::of_size(20 * 1024 * 1024), PriorityTier::Normal);
        assert_eq!(PriorityTier::of_size(20 * 1024 * 1024 + 1), PriorityTier::Low);
    }

    #[test]
    fn status_rank_orders_terminal_states_equal() {
        assert!(JobStatus::Pending.rank() < JobStatus::Queued.rank());
        assert!(JobStatus::Queued.rank() < JobStatus::Processing.rank());
        assert!(JobStatus::Processing.rank() < JobStatus::Completed.rank());
        assert_eq!(JobStatus::Completed.rank(), JobStatus::Failed.rank());
        assert_eq!(JobStatus::Failed.rank(), JobStatus::Cancelled.rank());
    }

    #[test]
    fn terminal_states() {
        assert!(JobStatus::Completed.is_terminal());
        assert!(JobStatus::Failed.is_terminal());
        assert!(JobStatus::Cancelled.is_terminal());
        assert!(!JobStatus::Pending.is_terminal());
        assert!(!JobStatus::Queued.is_terminal());
        assert!(!JobStatus::Processing.is_terminal());
    }
}
