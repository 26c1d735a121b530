use thiserror::Error;

/// Guard violations carry the exact message surfaced to the caller; only
/// `Store` is an internal failure.
#[derive(Debug, Error)]
pub enum ClockError {
    #[error("Already punched in.")]
    AlreadyPunchedIn,

    #[error("Not punched in.")]
    NotPunchedIn,

    #[error("Already on break.")]
    AlreadyOnBreak,

    #[error("Not on break.")]
    NotOnBreak,

    #[error("Still on break.")]
    StillOnBreak,

    #[error(transparent)]
    Store(#[from] perch_store::StoreError),
}

impl ClockError {
    /// True for state-machine guard violations (as opposed to I/O failures).
    pub fn is_conflict(&self) -> bool {
        !matches!(self, ClockError::Store(_))
    }
}
