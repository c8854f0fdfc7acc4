use crate::analytics::AggregateError;
use crate::perps::FetchError;

/// Failures that abort one tracker cycle. None of them stop the scheduler.
#[derive(Debug, thiserror::Error)]
pub enum CycleError {
    #[error("failed to fetch positions: {0}")]
    Fetch(#[from] FetchError),

    #[error("failed to aggregate open interest: {0}")]
    Aggregate(#[from] AggregateError),

    #[error("failed to read previous sample: {0:#}")]
    StorageRead(anyhow::Error),

    #[error("failed to store sample: {0:#}")]
    StorageWrite(anyhow::Error),
}

impl CycleError {
    /// Name of the cycle step that failed, for logs and metric labels.
    pub fn stage(&self) -> &'static str {
        match self {
            CycleError::Fetch(_) => "fetch",
            CycleError::Aggregate(_) => "aggregate",
            CycleError::StorageRead(_) => "read_previous",
            CycleError::StorageWrite(_) => "persist",
        }
    }
}
