//! Error types shared by every discovery source, the synthesizer and the verifier

use crate::runner::RunError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while discovering syscalls, building or verifying profiles
#[derive(Error, Debug)]
pub enum SeccompError {
    #[error("profile content is invalid")]
    InvalidProfile,

    #[error("profile allows high-risk system calls ({count} found)")]
    HighRiskSyscallsAllowed { count: usize },

    #[error("syscall id {0} not supported")]
    UnsupportedSyscallId(u32),

    #[error("invalid template name: {0}")]
    InvalidTemplateName(String),

    #[error("execution aborted, command could not be executed: {source}")]
    ExecutionAborted {
        #[source]
        source: RunError,
    },

    #[error("probe for syscall '{syscall}' could not be run: {source}")]
    ProbeHarness {
        syscall: String,
        #[source]
        source: RunError,
    },

    #[error("syslog file '{}' could not be opened: {source}", path.display())]
    LogUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("binary extraction failed for '{}': {reason}", path.display())]
    Extraction { path: PathBuf, reason: String },

    #[error("audit pattern could not be compiled: {0}")]
    Pattern(#[from] regex::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SeccompError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_id_message() {
        let err = SeccompError::UnsupportedSyscallId(777);
        assert_eq!(err.to_string(), "syscall id 777 not supported");
    }

    #[test]
    fn test_execution_aborted_wraps_cause() {
        let err = SeccompError::ExecutionAborted {
            source: RunError::Harness("could not load container".to_string()),
        };
        assert_eq!(
            err.to_string(),
            "execution aborted, command could not be executed: could not load container"
        );
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_sentinel_messages() {
        assert_eq!(
            SeccompError::InvalidProfile.to_string(),
            "profile content is invalid"
        );
        assert!(SeccompError::HighRiskSyscallsAllowed { count: 3 }
            .to_string()
            .starts_with("profile allows high-risk system calls"));
    }
}
