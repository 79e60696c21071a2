//! Error taxonomy shared by the picker and every command.
//!
//! Nothing here is fatal to the host: the registry turns each variant into an
//! error notification and the invocation ends.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::core::process::RunError;

pub type Result<T> = std::result::Result<T, CommandError>;

#[derive(Debug, Error)]
pub enum CommandError {
    /// The command makes no sense here (e.g. git outside a repository).
    #[error("{0}")]
    NotApplicable(String),

    #[error("File does not exist: {}", .0.display())]
    TargetMissing(PathBuf),

    #[error("Unsupported archive format: {}", .0.display())]
    UnsupportedFormat(PathBuf),

    #[error("{program} timed out after {}s", .after.as_secs())]
    ToolTimeout { program: String, after: Duration },

    /// Neither the preferred nor the fallback binary is on `PATH`.
    #[error("{0}: command not found")]
    ToolNotFound(String),

    #[error("{program} failed: {diagnostic}")]
    ProcessFailure { program: String, diagnostic: String },

    #[error("Number of lines ({lines}) doesn't match selected files ({files})")]
    CountMismatch { lines: usize, files: usize },

    /// The selector produced something the action cannot accept.
    #[error("Invalid selection: {0}")]
    InvalidSelection(String),

    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    /// A host effect (cd, select, reload...) could not be applied.
    #[error("{action} failed: {source}")]
    Host {
        action: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CommandError {
    pub fn not_applicable(msg: impl Into<String>) -> Self {
        Self::NotApplicable(msg.into())
    }

    pub fn invalid_selection(msg: impl Into<String>) -> Self {
        Self::InvalidSelection(msg.into())
    }

    pub fn host(action: &'static str, source: std::io::Error) -> Self {
        Self::Host { action, source }
    }

    /// Map a runner failure for an action-side subprocess (extractor,
    /// checkout). A missing binary is reported with its spawn diagnostic
    /// since there is no fallback left to try.
    pub fn from_run(err: RunError) -> Self {
        match err {
            RunError::Timeout { program, after } => Self::ToolTimeout { program, after },
            RunError::Spawn { program, source } => Self::ProcessFailure {
                diagnostic: format!("{program}: {source}"),
                program,
            },
            RunError::Io(e) => Self::Io(e),
        }
    }

    /// Map a runner failure for the selector pipeline, where a missing
    /// binary means neither the preferred tool nor its fallback was found.
    pub fn from_pipeline(err: RunError) -> Self {
        match err {
            RunError::Spawn { program, source } if source.kind() == std::io::ErrorKind::NotFound => {
                Self::ToolNotFound(program)
            }
            other => Self::from_run(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spawn_failure_keeps_diagnostic() {
        let err = CommandError::from_run(RunError::Spawn {
            program: "unrar".into(),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        });
        match err {
            CommandError::ProcessFailure { program, diagnostic } => {
                assert_eq!(program, "unrar");
                assert!(diagnostic.starts_with("unrar: "));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_missing_selector_is_tool_not_found() {
        let err = CommandError::from_pipeline(RunError::Spawn {
            program: "fzf".into(),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        });
        assert!(matches!(err, CommandError::ToolNotFound(p) if p == "fzf"));
    }

    #[test]
    fn test_count_mismatch_message() {
        let err = CommandError::CountMismatch { lines: 2, files: 3 };
        assert_eq!(
            err.to_string(),
            "Number of lines (2) doesn't match selected files (3)"
        );
    }
}
