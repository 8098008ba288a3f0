use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// The primary error type for the media-probe crate.
///
/// Every stage of [`crate::probe`] fails with the most specific variant it can:
/// the process invoker, the structured decoder and the entity mapper each own a
/// distinct set of variants, so callers can branch on [`ProbeError::kind`].
#[derive(Error, Debug)]
pub enum ProbeError {
    // --- Process Invoker ---
    #[error("Probe executable `{program}` was not found in PATH")]
    ToolNotFound { program: String },

    #[error("Probe executable override does not exist or is not a file: {}", path.display())]
    InvalidOverride { path: PathBuf },

    #[error("Invalid value for `{name}`: {reason}")]
    InvalidArgument { name: &'static str, reason: String },

    #[error("Failed to start `{program}`")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Local media file does not exist: {}", path.display())]
    LocalFileNotFound { path: PathBuf },

    #[error("Probe timed out after {elapsed:?} (limit {limit:?})")]
    Timeout { limit: Duration, elapsed: Duration },

    #[error(
        "Probe exited with status {}: {stderr}",
        exit_code.map_or_else(|| "<signal>".to_string(), |c| c.to_string())
    )]
    Execution {
        command_line: Vec<String>,
        exit_code: Option<i32>,
        stderr: String,
    },

    // --- Structured Decoder ---
    #[error("Probe output is not valid JSON at line {line}, column {column} (byte {offset}): {excerpt:?}")]
    MalformedOutput {
        line: usize,
        column: usize,
        offset: usize,
        excerpt: String,
        #[source]
        source: serde_json::Error,
    },

    // --- Entity Mapper ---
    #[error("Probe output has no usable `{key}` section (expected {expected})")]
    Schema {
        key: &'static str,
        expected: &'static str,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Fieldless discriminant of [`ProbeError`], for callers that only need to branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProbeErrorKind {
    ToolNotFound,
    InvalidOverride,
    InvalidArgument,
    Spawn,
    LocalFileNotFound,
    Timeout,
    Execution,
    MalformedOutput,
    Schema,
    Io,
}

impl ProbeError {
    pub const fn kind(&self) -> ProbeErrorKind {
        match self {
            Self::ToolNotFound { .. } => ProbeErrorKind::ToolNotFound,
            Self::InvalidOverride { .. } => ProbeErrorKind::InvalidOverride,
            Self::InvalidArgument { .. } => ProbeErrorKind::InvalidArgument,
            Self::Spawn { .. } => ProbeErrorKind::Spawn,
            Self::LocalFileNotFound { .. } => ProbeErrorKind::LocalFileNotFound,
            Self::Timeout { .. } => ProbeErrorKind::Timeout,
            Self::Execution { .. } => ProbeErrorKind::Execution,
            Self::MalformedOutput { .. } => ProbeErrorKind::MalformedOutput,
            Self::Schema { .. } => ProbeErrorKind::Schema,
            Self::Io(_) => ProbeErrorKind::Io,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_execution_message_includes_stderr_and_code() {
        let err = ProbeError::Execution {
            command_line: vec!["ffprobe".into(), "missing.mp4".into()],
            exit_code: Some(1),
            stderr: "missing.mp4: No such file or directory".into(),
        };
        let message = err.to_string();
        assert!(message.contains("status 1"));
        assert!(message.contains("No such file or directory"));
        assert_eq!(err.kind(), ProbeErrorKind::Execution);
    }

    #[test]
    fn test_execution_message_for_signal_termination() {
        let err = ProbeError::Execution {
            command_line: vec![],
            exit_code: None,
            stderr: String::new(),
        };
        assert!(err.to_string().contains("<signal>"));
    }

    #[test]
    fn test_schema_message_names_missing_key() {
        let err = ProbeError::Schema {
            key: "streams",
            expected: "a sequence",
        };
        assert_eq!(
            err.to_string(),
            "Probe output has no usable `streams` section (expected a sequence)"
        );
    }
}
