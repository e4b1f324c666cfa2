//! Output directory derivation.

use std::path::{Path, PathBuf};

use crate::identity::SubjectIdentity;

/// Staging directory, relative to the BIDS root, that holds raw converter
/// output until it is sorted into the BIDS tree.
pub const TMP_DIR_NAME: &str = "tmp_dcm2bids";

/// Staging subdirectory used when no subject identity is known.
pub const HELPER_DIR: &str = "helper";

/// Where converter output lands for a given root, subject and mode.
///
/// In helper mode the output goes straight into `target_root`. Otherwise it
/// goes into `target_root/tmp_dcm2bids/<prefix>`, or
/// `target_root/tmp_dcm2bids/helper` when there is no subject.
pub fn locate<S>(target_root: &Path, subject: Option<&S>, helper_mode: bool) -> PathBuf
where
    S: SubjectIdentity + ?Sized,
{
    if helper_mode {
        return target_root.to_path_buf();
    }
    let name = subject.map_or_else(|| HELPER_DIR.to_string(), |s| s.prefix());
    target_root.join(TMP_DIR_NAME).join(name)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::Participant;

    #[test]
    fn helper_mode_returns_root_regardless_of_subject() {
        let root = Path::new("/bids");
        assert_eq!(locate(root, Some("sub-01"), true), root);
        assert_eq!(locate::<str>(root, None, true), root);
    }

    #[test]
    fn subject_prefix_names_staging_dir() {
        let p = Participant::new("01", Some("1"));
        assert_eq!(
            locate(Path::new("/bids"), Some(&p), false),
            PathBuf::from("/bids/tmp_dcm2bids/sub-01_ses-1")
        );
    }

    #[test]
    fn missing_subject_uses_helper_dir() {
        assert_eq!(
            locate::<str>(Path::new("/bids"), None, false),
            PathBuf::from("/bids/tmp_dcm2bids/helper")
        );
    }

    #[test]
    fn same_inputs_same_path() {
        let root = Path::new("relative/bids");
        assert_eq!(
            locate(root, Some("sub-07"), false),
            locate(root, Some("sub-07"), false)
        );
    }
}
