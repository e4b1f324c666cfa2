use std::path::PathBuf;

use dcm2bids_core::{ConverterOptions, Participant, DEFAULT_CONVERTER};

/// Errors raised while reading the runner configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} environment variable is required")]
    Missing(&'static str),

    #[error("{var} must be a boolean (true/false/1/0/yes/no), got {value:?}")]
    InvalidBool { var: &'static str, value: String },

    #[error("{var} is invalid: {source}")]
    InvalidOptions {
        var: &'static str,
        #[source]
        source: dcm2bids_core::ConversionError,
    },
}

/// Runner configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// DICOM directories, converted in this order.
    pub dicom_dirs: Vec<PathBuf>,
    /// Root of the BIDS tree.
    pub bids_dir: PathBuf,
    /// Participant the DICOMs belong to, if known.
    pub participant: Option<Participant>,
    pub options: ConverterOptions,
    /// Converter executable (default: `dcm2niix`).
    pub converter: String,
    /// Clean and rerun when previous output exists.
    pub force: bool,
    /// Write output straight into `bids_dir`.
    pub helper_mode: bool,
}

impl RunnerConfig {
    /// Load configuration from the process environment.
    ///
    /// | Env Var            | Default                            |
    /// |--------------------|------------------------------------|
    /// | `DICOM_DIRS`       | required, comma-separated          |
    /// | `BIDS_DIR`         | required                           |
    /// | `PARTICIPANT`      | none                               |
    /// | `SESSION`          | none                               |
    /// | `DCM2NIIX_OPTIONS` | `-b y -ba y -z y -f '%3s_%f_%p_%t'`|
    /// | `DCM2NIIX_BIN`     | `dcm2niix`                         |
    /// | `FORCE_DCM2NIIX`   | `false`                            |
    /// | `HELPER_MODE`      | `false`                            |
    ///
    /// An empty `DCM2NIIX_OPTIONS` runs the converter with no options.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let dicom_dirs: Vec<PathBuf> = var("DICOM_DIRS")
            .ok_or(ConfigError::Missing("DICOM_DIRS"))?
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(PathBuf::from)
            .collect();
        if dicom_dirs.is_empty() {
            return Err(ConfigError::Missing("DICOM_DIRS"));
        }

        let bids_dir = var("BIDS_DIR")
            .map(PathBuf::from)
            .ok_or(ConfigError::Missing("BIDS_DIR"))?;

        let participant = var("PARTICIPANT")
            .map(|name| Participant::new(&name, var("SESSION").as_deref()));

        // Set-but-empty means "no options", not "use the defaults".
        let options = match lookup("DCM2NIIX_OPTIONS") {
            Some(raw) => ConverterOptions::parse(&raw).map_err(|source| {
                ConfigError::InvalidOptions {
                    var: "DCM2NIIX_OPTIONS",
                    source,
                }
            })?,
            None => ConverterOptions::default(),
        };

        let converter = var("DCM2NIIX_BIN").unwrap_or_else(|| DEFAULT_CONVERTER.to_string());
        let force = parse_bool("FORCE_DCM2NIIX", var("FORCE_DCM2NIIX"))?;
        let helper_mode = parse_bool("HELPER_MODE", var("HELPER_MODE"))?;

        Ok(Self {
            dicom_dirs,
            bids_dir,
            participant,
            options,
            converter,
            force,
            helper_mode,
        })
    }
}

fn parse_bool(var: &'static str, value: Option<String>) -> Result<bool, ConfigError> {
    let Some(value) = value else {
        return Ok(false);
    };
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Ok(true),
        "0" | "false" | "no" => Ok(false),
        _ => Err(ConfigError::InvalidBool { var, value }),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
