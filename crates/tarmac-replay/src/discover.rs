//! Recording discovery: find every recording under a directory.
//!
//! Batch runs drop one recording per scenario execution into a result
//! directory, sometimes one level of subdirectory deep. [`discover_recordings`]
//! collects every recording file whose name contains a filter string,
//! scanning the directory itself plus one nested level, and returns the
//! matches sorted by path so merge group assignment is reproducible.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ReplayError;

/// File extension of recording files.
pub const RECORDING_EXTENSION: &str = "dat";

fn is_recording(path: &Path, filter: &str) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    name.contains(filter)
        && path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e == RECORDING_EXTENSION)
}

/// Find every recording under `dir` whose filename contains `filter`.
///
/// Scans `dir` and, for subdirectories whose name also contains `filter`,
/// one nested level. Zero matches is a usage error naming the directory
/// and filter rather than an empty result, so a mistyped filter fails
/// loudly instead of producing an empty merge.
pub fn discover_recordings(
    dir: impl AsRef<Path>,
    filter: &str,
) -> Result<Vec<PathBuf>, ReplayError> {
    let dir = dir.as_ref();
    let mut found = Vec::new();

    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            let dir_matches = path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.contains(filter));
            if !dir_matches {
                continue;
            }
            for nested in fs::read_dir(&path)? {
                let nested = nested?.path();
                if nested.is_file() && is_recording(&nested, filter) {
                    found.push(nested);
                }
            }
        } else if is_recording(&path, filter) {
            found.push(path);
        }
    }

    found.sort();

    if found.is_empty() {
        return Err(ReplayError::NoRecordings {
            dir: dir.display().to_string(),
            filter: filter.to_string(),
        });
    }
    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;

    fn touch(path: &Path) {
        File::create(path).unwrap();
    }

    #[test]
    fn finds_flat_and_nested_recordings() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("cutin_0.dat"));
        touch(&dir.path().join("cutin_1.dat"));
        touch(&dir.path().join("other.dat"));
        touch(&dir.path().join("cutin_notes.txt"));
        fs::create_dir(dir.path().join("cutin_batch")).unwrap();
        touch(&dir.path().join("cutin_batch/cutin_2.dat"));
        fs::create_dir(dir.path().join("unrelated")).unwrap();
        touch(&dir.path().join("unrelated/cutin_3.dat"));

        let found = discover_recordings(dir.path(), "cutin").unwrap();
        let names: Vec<_> = found
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap().to_string())
            .collect();
        // "unrelated" directory is not descended into; "other.dat" and the
        // .txt file do not match.
        assert_eq!(names, vec!["cutin_0.dat", "cutin_1.dat", "cutin_2.dat"]);
    }

    #[test]
    fn zero_matches_is_a_usage_error() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("other.dat"));
        let err = discover_recordings(dir.path(), "cutin").unwrap_err();
        assert!(matches!(err, ReplayError::NoRecordings { .. }));
    }

    #[test]
    fn missing_directory_is_io_error() {
        let err = discover_recordings("/nonexistent/results", "cutin").unwrap_err();
        assert!(matches!(err, ReplayError::Io(_)));
    }
}
