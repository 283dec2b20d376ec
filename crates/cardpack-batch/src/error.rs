use thiserror::Error;

/// Batch-level failure.
///
/// Per-item retrieval failures never surface here; they are recorded in the
/// item outcomes and the batch continues. Only a failure of the archive
/// itself aborts a run.
#[derive(Debug, Error)]
pub enum BatchError {
    #[error("failed to assemble export archive: {0}")]
    Assembly(#[from] cardpack_archive::Error),
}
