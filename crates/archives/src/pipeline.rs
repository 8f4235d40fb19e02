use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::{extract, verify_extraction, DatasetName, ExtractionCheck, Result, DESCRIPTORS};

/// Per-dataset outcome of extraction + count verification. Datasets whose
/// archive was absent have no entry.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct AcquisitionReport {
    pub results: BTreeMap<DatasetName, ExtractionCheck>,
}

impl AcquisitionReport {
    /// Conjunction over present datasets; vacuously true when none were present.
    pub fn all_succeeded(&self) -> bool {
        self.results.values().all(|c| c.success)
    }

    pub fn failed(&self) -> Vec<DatasetName> {
        self.results
            .values()
            .filter(|c| !c.success)
            .map(|c| c.dataset)
            .collect()
    }

    /// Configured datasets that produced no result.
    pub fn missing(&self) -> Vec<DatasetName> {
        DatasetName::ALL
            .into_iter()
            .filter(|n| !self.results.contains_key(n))
            .collect()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Extract each archive present in `raw_dir` into `processed_dir/<NAME>` and
/// check its file count. Extraction errors abort; count failures are
/// collected into the report.
pub fn acquire_and_verify_all(raw_dir: &Path, processed_dir: &Path) -> Result<AcquisitionReport> {
    let mut report = AcquisitionReport::default();

    for desc in DESCRIPTORS.iter() {
        let archive = raw_dir.join(desc.file_name());
        if !archive.exists() {
            info!(dataset = %desc.name, archive = %archive.display(), "archive absent, skipping");
            continue;
        }

        let dest = processed_dir.join(desc.name.as_str());
        extract(&archive, &dest)?;
        let check = verify_extraction(&dest, desc.name);
        report.results.insert(desc.name, check);
    }

    if report.all_succeeded() {
        info!(datasets = report.results.len(), "all present datasets verified");
    } else {
        let failed: Vec<&str> = report.failed().into_iter().map(|n| n.as_str()).collect();
        warn!(failed = %failed.join(", "), "some datasets failed verification");
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(dataset: DatasetName, success: bool) -> ExtractionCheck {
        ExtractionCheck { dataset, expected: 10, actual: 10, tolerance: 1, success }
    }

    #[test]
    fn test_empty_report_is_vacuously_ok() {
        let report = AcquisitionReport::default();
        assert!(report.all_succeeded());
        assert_eq!(report.missing(), DatasetName::ALL.to_vec());
    }

    #[test]
    fn test_failed_and_missing() {
        let mut report = AcquisitionReport::default();
        report.results.insert(DatasetName::Eeg, check(DatasetName::Eeg, true));
        report.results.insert(DatasetName::Emg, check(DatasetName::Emg, false));

        assert!(!report.all_succeeded());
        assert_eq!(report.failed(), vec![DatasetName::Emg]);
        assert_eq!(report.missing(), vec![DatasetName::Eog]);
    }

    #[test]
    fn test_report_json_uses_dataset_names() {
        let mut report = AcquisitionReport::default();
        report.results.insert(DatasetName::Eog, check(DatasetName::Eog, true));
        let json = report.to_json().unwrap();
        assert!(json.contains("\"EOG\""));
        let back: AcquisitionReport = serde_json::from_str(&json).unwrap();
        assert_eq!(back.results[&DatasetName::Eog], report.results[&DatasetName::Eog]);
    }
}
