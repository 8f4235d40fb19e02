use std::path::Path;

use serde::{Deserialize, Serialize};
use walkdir::WalkDir;

use crate::{descriptor, AcquireError, CountFilter, DatasetName, COUNT_TOLERANCE};

/// Outcome of the file-count check for one extracted dataset.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionCheck {
    pub dataset: DatasetName,
    pub expected: usize,
    pub actual: usize,
    pub tolerance: usize,
    pub success: bool,
}

impl ExtractionCheck {
    pub fn into_result(self) -> Result<usize, AcquireError> {
        if self.success {
            Ok(self.actual)
        } else {
            Err(AcquireError::CountMismatch {
                dataset: self.dataset,
                expected: self.expected,
                actual: self.actual,
                tolerance: self.tolerance,
            })
        }
    }
}

/// Regular files under `dir` (any depth) accepted by `filter`.
/// A missing directory counts as empty; unreadable entries are skipped.
pub fn count_files(dir: &Path, filter: CountFilter) -> usize {
    if !dir.exists() {
        return 0;
    }
    WalkDir::new(dir)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(e) => Some(e),
            Err(err) => {
                tracing::debug!("skipping unreadable entry: {err}");
                None
            }
        })
        .filter(|e| e.file_type().is_file() && filter.matches(e.path()))
        .count()
}

pub fn verify_extraction(dir: &Path, dataset: DatasetName) -> ExtractionCheck {
    let desc = descriptor(dataset);
    let actual = count_files(dir, desc.filter);
    let (lo, hi) = desc.count_range();
    let success = (lo..=hi).contains(&actual);

    if success {
        tracing::info!(
            dataset = %dataset,
            expected = desc.expected_files,
            actual,
            "extraction verified"
        );
    } else {
        tracing::warn!(
            dataset = %dataset,
            expected = desc.expected_files,
            tolerance = COUNT_TOLERANCE,
            actual,
            "extraction count outside tolerance"
        );
    }

    ExtractionCheck {
        dataset,
        expected: desc.expected_files,
        actual,
        tolerance: COUNT_TOLERANCE,
        success,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn touch_n(dir: &Path, n: usize, ext: &str) {
        for i in 0..n {
            fs::write(dir.join(format!("file_{i}{ext}")), b"").unwrap();
        }
    }

    #[test]
    fn test_missing_dir_counts_zero() {
        assert_eq!(count_files(Path::new("/no/such/dir"), CountFilter::All), 0);
    }

    #[test]
    fn test_counts_nested_files() {
        let tmp = tempfile::tempdir().unwrap();
        let sub = tmp.path().join("a/b");
        fs::create_dir_all(&sub).unwrap();
        touch_n(tmp.path(), 2, ".npy");
        touch_n(&sub, 3, ".mat");

        assert_eq!(count_files(tmp.path(), CountFilter::All), 5);
        assert_eq!(count_files(tmp.path(), CountFilter::Extension(".mat")), 3);
    }

    #[test]
    fn test_eeg_count_within_tolerance() {
        let tmp = tempfile::tempdir().unwrap();
        touch_n(tmp.path(), 4514, ".mat");
        // non-.mat files do not count for EEG
        touch_n(tmp.path(), 7, ".txt");

        let check = verify_extraction(tmp.path(), DatasetName::Eeg);
        assert!(check.success);
        assert_eq!(check.actual, 4514);
        assert_eq!(check.into_result().unwrap(), 4514);
    }

    #[test]
    fn test_eeg_count_outside_tolerance() {
        let tmp = tempfile::tempdir().unwrap();
        touch_n(tmp.path(), 4510, ".mat");

        let check = verify_extraction(tmp.path(), DatasetName::Eeg);
        assert!(!check.success);
        assert_eq!(check.actual, 4510);
        assert!(matches!(
            check.into_result(),
            Err(AcquireError::CountMismatch { actual: 4510, expected: 4514, .. })
        ));
    }

    #[test]
    fn test_tolerance_edges() {
        let tmp = tempfile::tempdir().unwrap();
        touch_n(tmp.path(), 3399, ".any");
        assert!(verify_extraction(tmp.path(), DatasetName::Eog).success);

        fs::write(tmp.path().join("extra_1"), b"").unwrap();
        fs::write(tmp.path().join("extra_2"), b"").unwrap();
        // 3401
        assert!(verify_extraction(tmp.path(), DatasetName::Eog).success);

        fs::write(tmp.path().join("extra_3"), b"").unwrap();
        assert!(!verify_extraction(tmp.path(), DatasetName::Eog).success);
    }
}
