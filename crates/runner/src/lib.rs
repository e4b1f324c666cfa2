//! `dcm2bids-runner` library crate.
//!
//! Builds a conversion job from [`config::RunnerConfig`], runs it and
//! summarises the result. The binary entrypoint lives in `main.rs`.

pub mod config;

use std::path::PathBuf;

use dcm2bids_core::{CommandRunner, ConversionError, ConversionJob, JobLogger, RunOutcome};
use serde::Serialize;

use crate::config::RunnerConfig;

/// Summary printed after a run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub output_dir: PathBuf,
    pub outcome: RunOutcome,
    pub sidecars: Vec<PathBuf>,
}

/// Build the job described by `config` without running it.
pub fn build_job(config: &RunnerConfig) -> ConversionJob {
    let job = ConversionJob::new(config.dicom_dirs.iter().cloned(), &config.bids_dir)
        .with_parsed_options(config.options.clone())
        .with_converter(config.converter.clone())
        .with_helper_mode(config.helper_mode);
    match &config.participant {
        Some(participant) => job.with_subject(participant),
        None => job,
    }
}

/// Run a prepared job and collect its report.
pub async fn run_job<R, L>(
    mut job: ConversionJob<R, L>,
    force: bool,
) -> Result<RunReport, ConversionError>
where
    R: CommandRunner,
    L: JobLogger,
{
    let outcome = job.run(force).await?;
    tracing::info!(
        output_dir = %job.output_dir().display(),
        ?outcome,
        sidecars = job.sidecars().len(),
        "Conversion step finished",
    );
    Ok(RunReport {
        output_dir: job.output_dir(),
        outcome,
        sidecars: job.sidecars().to_vec(),
    })
}

/// Build and run the job described by `config`.
pub async fn run(config: &RunnerConfig) -> Result<RunReport, ConversionError> {
    run_job(build_job(config), config.force).await
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::path::Path;

    use dcm2bids_core::{ConverterOptions, Participant};

    use super::*;

    fn config(bids: &Path) -> RunnerConfig {
        RunnerConfig {
            dicom_dirs: vec![PathBuf::from("/dicom/ses1")],
            bids_dir: bids.to_path_buf(),
            participant: Some(Participant::new("01", None)),
            options: ConverterOptions::parse("-z y").expect("options"),
            converter: "dcm2niix".to_string(),
            force: false,
            helper_mode: false,
        }
    }

    #[test]
    fn build_job_applies_config() {
        let job = build_job(&config(Path::new("/bids")));
        assert_eq!(job.output_dir(), PathBuf::from("/bids/tmp_dcm2bids/sub-01"));
        assert_eq!(job.options().tokens(), ["-z", "y"]);
        assert_eq!(job.source_dirs(), [PathBuf::from("/dicom/ses1")]);
    }

    #[test]
    fn build_job_without_participant_uses_helper_dir() {
        let mut cfg = config(Path::new("/bids"));
        cfg.participant = None;
        assert_eq!(
            build_job(&cfg).output_dir(),
            PathBuf::from("/bids/tmp_dcm2bids/helper")
        );
        cfg.helper_mode = true;
        assert_eq!(build_job(&cfg).output_dir(), PathBuf::from("/bids"));
    }

    #[tokio::test]
    async fn skipped_run_reports_existing_sidecars() {
        let tmp = tempfile::tempdir().expect("create temp dir");
        let cfg = config(tmp.path());
        let out = tmp.path().join("tmp_dcm2bids").join("sub-01");
        std::fs::create_dir_all(&out).expect("create output dir");
        std::fs::write(out.join("sub-01_T1w.json"), b"{}").expect("write sidecar");

        let report = run(&cfg).await.expect("run");

        assert_eq!(report.outcome, RunOutcome::Skipped);
        assert_eq!(report.output_dir, out);
        assert_eq!(report.sidecars, [out.join("sub-01_T1w.json")]);
    }

    #[test]
    fn report_serializes_outcome_as_snake_case() {
        let report = RunReport {
            output_dir: PathBuf::from("/bids/tmp_dcm2bids/sub-01"),
            outcome: RunOutcome::Converted,
            sidecars: vec![PathBuf::from("/bids/tmp_dcm2bids/sub-01/a.json")],
        };
        let json = serde_json::to_value(&report).expect("serialize");
        assert_eq!(json["outcome"], "converted");
        assert_eq!(json["sidecars"][0], "/bids/tmp_dcm2bids/sub-01/a.json");
    }
}
