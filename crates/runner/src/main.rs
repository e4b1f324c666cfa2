//! `dcm2bids-runner` -- runs the dcm2niix step for one participant.
//!
//! Reads its configuration from the environment (see
//! [`RunnerConfig::from_env`]), converts every DICOM directory into the
//! participant's staging directory, and prints a JSON report listing the
//! sidecars found there.
//!
//! # Environment variables
//!
//! | Variable           | Required | Default    | Description                          |
//! |--------------------|----------|------------|--------------------------------------|
//! | `DICOM_DIRS`       | yes      | --         | Comma-separated DICOM directories    |
//! | `BIDS_DIR`         | yes      | --         | BIDS root directory                  |
//! | `PARTICIPANT`      | no       | --         | Participant label                    |
//! | `SESSION`          | no       | --         | Session label                        |
//! | `DCM2NIIX_OPTIONS` | no       | see core   | Options forwarded to the converter   |
//! | `DCM2NIIX_BIN`     | no       | `dcm2niix` | Converter executable                 |
//! | `FORCE_DCM2NIIX`   | no       | `false`    | Clean and rerun over previous output |
//! | `HELPER_MODE`      | no       | `false`    | Write output straight into `BIDS_DIR`|

use dcm2bids_runner::config::RunnerConfig;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "dcm2bids_runner=info,dcm2bids_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = RunnerConfig::from_env().unwrap_or_else(|e| {
        tracing::error!(error = %e, "Invalid configuration");
        std::process::exit(1);
    });

    tracing::info!(
        dicom_dirs = config.dicom_dirs.len(),
        bids_dir = %config.bids_dir.display(),
        converter = %config.converter,
        options = %config.options,
        force = config.force,
        helper_mode = config.helper_mode,
        "Starting dcm2bids-runner",
    );

    let report = match dcm2bids_runner::run(&config).await {
        Ok(report) => report,
        Err(e) => {
            tracing::error!(error = %e, "Conversion failed");
            std::process::exit(1);
        }
    };

    match serde_json::to_string_pretty(&report) {
        Ok(json) => println!("{json}"),
        Err(e) => {
            tracing::error!(error = %e, "Failed to serialize run report");
            std::process::exit(1);
        }
    }
}
