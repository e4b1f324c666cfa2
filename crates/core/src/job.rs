//! The `dcm2niix` conversion job.
//!
//! A [`ConversionJob`] is built once per participant (or once for the
//! helper location), decides whether conversion needs to run, runs the
//! converter once per DICOM directory, and records the JSON sidecars found
//! in its output directory afterwards.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::command::{CommandRunner, ProcessRunner};
use crate::error::ConversionError;
use crate::identity::SubjectIdentity;
use crate::locator::locate;
use crate::logger::{JobLogger, TracingLogger};
use crate::options::ConverterOptions;
use crate::output_dir::{self, OutputState};

/// Executable invoked when no other converter is configured.
pub const DEFAULT_CONVERTER: &str = "dcm2niix";

/// Which branch a call to [`ConversionJob::run`] took.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunOutcome {
    /// Output already existed and `force` was off; nothing was run.
    Skipped,
    /// Output already existed, was removed, and the converter ran again.
    Rebuilt,
    /// No previous output; the converter ran into a fresh directory.
    Converted,
}

/// Converts a set of DICOM directories into one output directory.
#[derive(Debug)]
pub struct ConversionJob<R = ProcessRunner, L = TracingLogger> {
    source_dirs: Vec<PathBuf>,
    target_root: PathBuf,
    subject: Option<String>,
    options: ConverterOptions,
    helper_mode: bool,
    converter: String,
    runner: R,
    logger: L,
    sidecars: Option<Vec<PathBuf>>,
}

impl ConversionJob {
    /// A job with default options, no subject and helper mode off.
    pub fn new<I, P>(source_dirs: I, target_root: impl Into<PathBuf>) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            source_dirs: source_dirs.into_iter().map(Into::into).collect(),
            target_root: target_root.into(),
            subject: None,
            options: ConverterOptions::default(),
            helper_mode: false,
            converter: DEFAULT_CONVERTER.to_string(),
            runner: ProcessRunner,
            logger: TracingLogger,
            sidecars: None,
        }
    }
}

impl<R, L> ConversionJob<R, L> {
    pub fn with_subject<S>(mut self, subject: &S) -> Self
    where
        S: SubjectIdentity + ?Sized,
    {
        self.subject = Some(subject.prefix());
        self
    }

    /// Tokenize and set the converter options.
    pub fn with_options(mut self, options: &str) -> Result<Self, ConversionError> {
        self.options = ConverterOptions::parse(options)?;
        Ok(self)
    }

    pub fn with_parsed_options(mut self, options: ConverterOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_helper_mode(mut self, helper_mode: bool) -> Self {
        self.helper_mode = helper_mode;
        self
    }

    pub fn with_converter(mut self, converter: impl Into<String>) -> Self {
        self.converter = converter.into();
        self
    }

    pub fn with_runner<R2>(self, runner: R2) -> ConversionJob<R2, L> {
        ConversionJob {
            source_dirs: self.source_dirs,
            target_root: self.target_root,
            subject: self.subject,
            options: self.options,
            helper_mode: self.helper_mode,
            converter: self.converter,
            runner,
            logger: self.logger,
            sidecars: self.sidecars,
        }
    }

    pub fn with_logger<L2>(self, logger: L2) -> ConversionJob<R, L2> {
        ConversionJob {
            source_dirs: self.source_dirs,
            target_root: self.target_root,
            subject: self.subject,
            options: self.options,
            helper_mode: self.helper_mode,
            converter: self.converter,
            runner: self.runner,
            logger,
            sidecars: self.sidecars,
        }
    }

    pub fn source_dirs(&self) -> &[PathBuf] {
        &self.source_dirs
    }

    pub fn options(&self) -> &ConverterOptions {
        &self.options
    }

    /// Directory the converter writes into for this job.
    pub fn output_dir(&self) -> PathBuf {
        locate(&self.target_root, self.subject.as_deref(), self.helper_mode)
    }

    /// Sidecars found by the last completed [`run`](Self::run).
    ///
    /// Empty until `run` has returned successfully, and reset at the start
    /// of every `run` so a failed call never reports stale paths.
    pub fn sidecars(&self) -> &[PathBuf] {
        self.sidecars.as_deref().unwrap_or_default()
    }

    /// Full argv for converting `source_dir`:
    /// `converter <options...> -o <output_dir> <source_dir>`.
    pub fn command_for(&self, source_dir: &Path) -> Vec<OsString> {
        let mut argv = Vec::with_capacity(self.options.tokens().len() + 4);
        argv.push(OsString::from(&self.converter));
        argv.extend(self.options.tokens().iter().map(OsString::from));
        argv.push(OsString::from("-o"));
        argv.push(self.output_dir().into_os_string());
        argv.push(source_dir.as_os_str().to_owned());
        argv
    }
}

impl<R: CommandRunner, L: JobLogger> ConversionJob<R, L> {
    /// Run the converter if needed and record the resulting sidecars.
    ///
    /// Existing output is left alone unless `force` is set, in which case it
    /// is removed and rebuilt. The sidecar list is refreshed from disk on
    /// every successful call, including when conversion is skipped.
    pub async fn run(&mut self, force: bool) -> Result<RunOutcome, ConversionError> {
        self.sidecars = None;
        let out_dir = self.output_dir();
        let has_output = output_dir::probe(&out_dir).await == OutputState::Populated;

        let outcome = match (has_output, force) {
            (true, true) => {
                self.warn_previous_output(&out_dir);
                self.logger.warn(&format!(
                    "Force is set: cleaning the previous output and running {} again",
                    self.converter
                ));
                if let Some(err) = output_dir::remove_best_effort(&out_dir).await {
                    self.logger.debug(&format!(
                        "Could not fully remove {}: {err}",
                        out_dir.display()
                    ));
                }
                output_dir::ensure(&out_dir).await?;
                self.execute().await?;
                RunOutcome::Rebuilt
            }
            (true, false) => {
                self.warn_previous_output(&out_dir);
                self.logger.warn(&format!(
                    "Enable force to rerun {} into this directory",
                    self.converter
                ));
                RunOutcome::Skipped
            }
            (false, _) => {
                output_dir::ensure(&out_dir).await?;
                self.execute().await?;
                RunOutcome::Converted
            }
        };

        self.sidecars = Some(output_dir::find_sidecars(&out_dir).await);
        Ok(outcome)
    }

    /// Invoke the converter once per source directory, in order.
    ///
    /// Stops at the first invocation that fails to launch or exits non-zero.
    pub async fn execute(&self) -> Result<(), ConversionError> {
        for source_dir in &self.source_dirs {
            let argv = self.command_for(source_dir);
            self.logger.debug(&format!(
                "Running {}",
                shell_words::join(argv.iter().map(|a| a.to_string_lossy()))
            ));

            let result = self.runner.run(&argv).await?;
            let success = result.success();
            let output = self.log_output(result.output);
            if !success {
                return Err(ConversionError::ExecutionFailed {
                    source_dir: source_dir.clone(),
                    exit_code: result.exit_code,
                    output,
                });
            }
        }
        Ok(())
    }

    /// Log captured converter output, falling back to raw bytes when it is
    /// not valid UTF-8. Returns a lossy text rendering for error reports.
    fn log_output(&self, bytes: Vec<u8>) -> String {
        let text = match String::from_utf8(bytes) {
            Ok(text) => {
                self.logger.debug(&format!("\n{text}"));
                text
            }
            Err(e) => {
                let bytes = e.into_bytes();
                self.logger.debug(&format!("\n{bytes:?}"));
                String::from_utf8_lossy(&bytes).into_owned()
            }
        };
        self.logger
            .info(&format!("Check log file for {} output", self.converter));
        text
    }

    fn warn_previous_output(&self, output_dir: &Path) {
        self.logger
            .warn(&format!("Previous {} output found:", self.converter));
        self.logger.warn(&output_dir.display().to_string());
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
