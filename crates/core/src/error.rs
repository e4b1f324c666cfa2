use std::path::PathBuf;

/// Errors that can cross the conversion job boundary.
///
/// Pre-existing output and transient filesystem conditions are never
/// reported here; they are absorbed and surfaced through the job logger.
#[derive(Debug, thiserror::Error)]
pub enum ConversionError {
    #[error("invalid converter options {options:?}: {source}")]
    InvalidOptions {
        options: String,
        #[source]
        source: shell_words::ParseError,
    },

    #[error("failed to launch converter `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("converter failed on {} (exit code {exit_code:?}): {output}", source_dir.display())]
    ExecutionFailed {
        source_dir: PathBuf,
        exit_code: Option<i32>,
        output: String,
    },

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
