//! Filesystem operations on a job's output directory.
//!
//! Everything here is best-effort except [`ensure`], whose failure means
//! the converter would have nowhere to write.

use std::io;
use std::path::{Path, PathBuf};

use tokio::fs;

use crate::error::ConversionError;

/// Extension of the metadata sidecars written next to each NIfTI file.
pub const SIDECAR_EXTENSION: &str = "json";

/// What is currently at the output path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputState {
    /// Nothing there, or the path could not be listed.
    Missing,
    Empty,
    /// At least one entry exists.
    Populated,
}

/// Classify `path` without raising: listing errors map to `Missing`.
pub async fn probe(path: &Path) -> OutputState {
    let mut entries = match fs::read_dir(path).await {
        Ok(entries) => entries,
        Err(_) => return OutputState::Missing,
    };
    match entries.next_entry().await {
        Ok(Some(_)) => OutputState::Populated,
        Ok(None) => OutputState::Empty,
        Err(_) => OutputState::Missing,
    }
}

/// Create `path` and its parents. Already existing is not an error.
pub async fn ensure(path: &Path) -> Result<(), ConversionError> {
    fs::create_dir_all(path)
        .await
        .map_err(|source| ConversionError::Io {
            path: path.to_path_buf(),
            source,
        })
}

/// Recursively remove `path`, ignoring failures.
///
/// Returns the error that was swallowed, if any, so the caller can log it.
/// A directory that is already gone is not reported.
pub async fn remove_best_effort(path: &Path) -> Option<io::Error> {
    match fs::remove_dir_all(path).await {
        Ok(()) => None,
        Err(e) if e.kind() == io::ErrorKind::NotFound => None,
        Err(e) => Some(e),
    }
}

/// Non-recursive listing of `*.json` files directly under `path`, sorted.
///
/// An unreadable or missing directory yields an empty list.
pub async fn find_sidecars(path: &Path) -> Vec<PathBuf> {
    let mut sidecars = Vec::new();
    let Ok(mut entries) = fs::read_dir(path).await else {
        return sidecars;
    };
    while let Ok(Some(entry)) = entries.next_entry().await {
        let candidate = entry.path();
        // Shell globs skip dotfiles.
        let hidden = entry.file_name().to_string_lossy().starts_with('.');
        let is_sidecar = !hidden
            && candidate
                .extension()
                .is_some_and(|ext| ext == SIDECAR_EXTENSION);
        if !is_sidecar {
            continue;
        }
        let is_file = match entry.file_type().await {
            Ok(ft) if ft.is_symlink() => fs::metadata(&candidate)
                .await
                .map(|m| m.is_file())
                .unwrap_or(false),
            Ok(ft) => ft.is_file(),
            Err(_) => false,
        };
        if is_file {
            sidecars.push(candidate);
        }
    }
    sidecars.sort();
    sidecars
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn probe_reports_three_states() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let missing = dir.path().join("absent");
        assert_eq!(probe(&missing).await, OutputState::Missing);
        assert_eq!(probe(dir.path()).await, OutputState::Empty);

        std::fs::write(dir.path().join("x.nii.gz"), b"").expect("write file");
        assert_eq!(probe(dir.path()).await, OutputState::Populated);
    }

    #[tokio::test]
    async fn probe_on_regular_file_is_missing() {
        let file = tempfile::NamedTempFile::new().expect("create temp file");
        assert_eq!(probe(file.path()).await, OutputState::Missing);
    }

    #[tokio::test]
    async fn ensure_is_idempotent() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let nested = dir.path().join("tmp_dcm2bids").join("sub-01");
        ensure(&nested).await.expect("first create");
        ensure(&nested).await.expect("second create");
        assert!(nested.is_dir());
    }

    #[tokio::test]
    async fn remove_missing_dir_reports_nothing() {
        let dir = tempfile::tempdir().expect("create temp dir");
        assert!(remove_best_effort(&dir.path().join("gone")).await.is_none());
    }

    #[tokio::test]
    async fn remove_clears_populated_dir() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let out = dir.path().join("out");
        std::fs::create_dir_all(out.join("nested")).expect("create dirs");
        std::fs::write(out.join("nested").join("a.json"), b"{}").expect("write file");
        assert!(remove_best_effort(&out).await.is_none());
        assert!(!out.exists());
    }

    #[tokio::test]
    async fn find_sidecars_lists_top_level_json_only() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let root = dir.path();
        std::fs::write(root.join("b_T2w.json"), b"{}").expect("write");
        std::fs::write(root.join("a_T1w.json"), b"{}").expect("write");
        std::fs::write(root.join("a_T1w.nii.gz"), b"").expect("write");
        std::fs::write(root.join(".partial.json"), b"{}").expect("write");
        std::fs::create_dir(root.join("dir.json")).expect("mkdir");
        std::fs::create_dir(root.join("nested")).expect("mkdir");
        std::fs::write(root.join("nested").join("c.json"), b"{}").expect("write");

        let found = find_sidecars(root).await;
        assert_eq!(found, vec![root.join("a_T1w.json"), root.join("b_T2w.json")]);
    }

    #[tokio::test]
    async fn find_sidecars_on_missing_dir_is_empty() {
        let dir = tempfile::tempdir().expect("create temp dir");
        assert!(find_sidecars(&dir.path().join("absent")).await.is_empty());
    }
}
