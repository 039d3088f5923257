use thiserror::Error;

/// Fatal analysis failures.
///
/// Everything recoverable (unreadable files, unmatched declaration bodies,
/// duplicate names) is downgraded to an [`Issue`](crate::analysis::Issue)
/// on the result; only total inability to access the given root
/// short-circuits a run.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("root path does not exist: {0}")]
    RootNotFound(String),

    #[error("analysis task failed: {0}")]
    TaskFailed(String),
}
