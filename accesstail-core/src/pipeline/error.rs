use crate::tail::TailError;
use thiserror::Error;
use tokio::task::JoinError;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("all {} files failed", errors.len())]
    AllFilesFailed { errors: Vec<TailError> },

    #[error("aggregator task failed")]
    Aggregator(#[source] JoinError),
}
