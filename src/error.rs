//! Crate-wide error type.
//!
//! A run never returns `NonConvergence` itself: an exhausted round budget is
//! reported as a [`crate::RunStatus`] next to the best-effort distances.
//! Callers that need a fixpoint turn it into [`SsspError::NonConvergence`]
//! via [`crate::RunOutcome::into_converged`].

use thiserror::Error;

use crate::worker::WorkerError;

pub type Result<T, E = SsspError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum SsspError {
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("invalid graph: {0}")]
    InvalidGraph(String),

    #[error("parse error on line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("no fixpoint after {rounds} rounds")]
    NonConvergence { rounds: usize },

    #[error("result mismatch on {mismatches} of {vertices} vertices (first at vertex {first})")]
    ResultMismatch { mismatches: usize, vertices: usize, first: usize },

    #[error(transparent)]
    Worker(#[from] WorkerError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl SsspError {
    pub(crate) fn config(msg: impl Into<String>) -> Self {
        SsspError::InvalidConfiguration(msg.into())
    }

    /// Stable negative code used across the C ABI.
    pub fn code(&self) -> i32 {
        match self {
            SsspError::InvalidConfiguration(_) => -1,
            SsspError::InvalidGraph(_) => -2,
            SsspError::Parse { .. } => -3,
            SsspError::NonConvergence { .. } => -4,
            SsspError::ResultMismatch { .. } => -5,
            SsspError::Worker(_) => -6,
            SsspError::Io(_) => -7,
        }
    }
}
