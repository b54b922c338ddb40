//! Errors surfaced by project operations.

use std::path::PathBuf;

use crate::sanitize::ValidationError;
use crate::validator::ValidationIssue;

/// Failure of an operation exposed to MCP clients.
///
/// Every variant renders to a message a caller can act on without
/// further context.
#[derive(Debug, thiserror::Error)]
pub enum FastlaneError {
    /// Bad lane name, project path, or platform.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// No Fastfile at any of the checked locations.
    #[error("Fastfile not found at {}", join_paths(.0))]
    ConfigNotFound(Vec<PathBuf>),

    /// Pre-flight found at least one error-level issue.
    #[error("Pre-flight checks failed:\n\n{report}")]
    Preflight {
        report: String,
        issues: Vec<ValidationIssue>,
    },

    /// The external command exited non-zero; `message` carries the diagnosis.
    #[error("{message}")]
    CommandFailed { message: String, exit_code: i32 },

    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

fn join_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(" or ")
}

impl FastlaneError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
