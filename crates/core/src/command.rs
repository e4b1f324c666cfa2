//! Converter process execution.
//!
//! [`CommandRunner`] is the seam between the conversion job and the
//! operating system: the job builds an argv, the runner executes it to
//! completion and hands back the exit status with the captured output.

use std::ffi::OsString;
use std::future::Future;
use std::process::Stdio;
use std::time::Instant;

use tokio::process::Command;

use crate::error::ConversionError;

/// Result of one converter invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    /// Process exit code (`None` if killed by signal).
    pub exit_code: Option<i32>,
    /// Captured stdout followed by captured stderr.
    pub output: Vec<u8>,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Runs an argv to completion and captures its combined output.
///
/// Implementations return `Err` only when the process could not be run at
/// all; a non-zero exit is reported through [`CommandOutput::exit_code`].
pub trait CommandRunner: Send + Sync {
    fn run(
        &self,
        argv: &[OsString],
    ) -> impl Future<Output = Result<CommandOutput, ConversionError>> + Send;
}

impl<R: CommandRunner> CommandRunner for &R {
    fn run(
        &self,
        argv: &[OsString],
    ) -> impl Future<Output = Result<CommandOutput, ConversionError>> + Send {
        (**self).run(argv)
    }
}

/// Runs commands as real child processes via `tokio::process`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner;

impl CommandRunner for ProcessRunner {
    async fn run(&self, argv: &[OsString]) -> Result<CommandOutput, ConversionError> {
        let Some((program, args)) = argv.split_first() else {
            return Err(ConversionError::Spawn {
                program: String::new(),
                source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "empty argv"),
            });
        };

        let start = Instant::now();
        let output = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|source| ConversionError::Spawn {
                program: program.to_string_lossy().into_owned(),
                source,
            })?;

        tracing::trace!(
            program = %program.to_string_lossy(),
            exit_code = ?output.status.code(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Converter process exited",
        );

        let mut combined = output.stdout;
        combined.extend_from_slice(&output.stderr);
        Ok(CommandOutput {
            exit_code: output.status.code(),
            output: combined,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
