//! Orchestration of the `dcm2niix` step of a DICOM to BIDS conversion.
//!
//! The converter itself is treated as an opaque executable. This crate
//! decides where its output goes, whether it needs to run at all, runs it
//! once per DICOM directory, and reports the JSON sidecars it left behind.

pub mod command;
pub mod error;
pub mod identity;
pub mod job;
pub mod locator;
pub mod logger;
pub mod options;
pub mod output_dir;

pub use command::{CommandOutput, CommandRunner, ProcessRunner};
pub use error::ConversionError;
pub use identity::{Participant, SubjectIdentity};
pub use job::{ConversionJob, RunOutcome, DEFAULT_CONVERTER};
pub use locator::{locate, HELPER_DIR, TMP_DIR_NAME};
pub use logger::{JobLogger, TracingLogger};
pub use options::{ConverterOptions, DEFAULT_OPTIONS};
pub use output_dir::OutputState;
