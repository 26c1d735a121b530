use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SprintError {
    #[error("sprint {0} not found")]
    NotFound(i64),

    #[error(transparent)]
    Store(#[from] perch_store::StoreError),

    #[error("failed to access sprint content {path}: {source}")]
    Content {
        path: PathBuf,
        source: std::io::Error,
    },
}
