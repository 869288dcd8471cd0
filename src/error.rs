//! Error types for the DQN library

use std::path::PathBuf;
use thiserror::Error;

/// Errors produced by agent construction, weight transfer, and checkpointing
#[derive(Error, Debug)]
pub enum DqnError {
    /// The checkpoint directory already exists
    ///
    /// Returned by [`crate::DqnAgent::new`] and [`crate::Checkpointer::create`]
    /// so that a new training run cannot silently clobber the results of a
    /// previous one. The caller decides whether to abort or pick another path.
    #[error("checkpoint directory already exists: {}", .0.display())]
    AlreadyExists(PathBuf),

    /// A caller-supplied value is outside its valid range
    ///
    /// Covers configuration validation failures and weight transfer between
    /// networks of differing architecture.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// IO error from the checkpoint store
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Checkpoint metadata (de)serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Network weight record error from Burn's recorder
    #[error("record error: {0}")]
    Record(#[from] burn::record::RecorderError),
}

/// Result type alias for DQN operations
pub type Result<T> = std::result::Result<T, DqnError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_already_exists_display_names_the_path() {
        let err = DqnError::AlreadyExists(PathBuf::from("runs/exp1"));
        let msg = err.to_string();
        assert!(msg.contains("already exists"));
        assert!(msg.contains("exp1"));
    }

    #[test]
    fn test_invalid_argument_display() {
        let err = DqnError::InvalidArgument("learning_rate must be positive".to_string());
        assert!(err.to_string().contains("learning_rate"));
    }
}
