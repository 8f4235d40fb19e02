use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Allowed deviation between expected and extracted file counts.
pub const COUNT_TOLERANCE: usize = 1;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DatasetName {
    #[serde(rename = "EEG")]
    Eeg,
    #[serde(rename = "EOG")]
    Eog,
    #[serde(rename = "EMG")]
    Emg,
}

impl DatasetName {
    pub const ALL: [DatasetName; 3] = [DatasetName::Eeg, DatasetName::Eog, DatasetName::Emg];

    pub fn as_str(self) -> &'static str {
        match self {
            DatasetName::Eeg => "EEG",
            DatasetName::Eog => "EOG",
            DatasetName::Emg => "EMG",
        }
    }
}

impl fmt::Display for DatasetName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DatasetName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "EEG" => Ok(DatasetName::Eeg),
            "EOG" => Ok(DatasetName::Eog),
            "EMG" => Ok(DatasetName::Emg),
            other => Err(format!("unknown dataset: {other}")),
        }
    }
}

/// Which extracted files take part in the count check.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CountFilter {
    /// Only files whose name ends with this suffix, e.g. `.mat`.
    Extension(&'static str),
    All,
}

impl CountFilter {
    pub fn matches(&self, path: &Path) -> bool {
        match self {
            CountFilter::All => true,
            CountFilter::Extension(ext) => path
                .file_name()
                .map(|n| n.to_string_lossy().ends_with(ext))
                .unwrap_or(false),
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct ArchiveDescriptor {
    pub name: DatasetName,
    pub url: &'static str,
    /// Lowercase hex SHA-256 of the archive bytes.
    pub sha256: &'static str,
    pub expected_files: usize,
    pub filter: CountFilter,
}

impl ArchiveDescriptor {
    /// Local file name: last path segment of the URL.
    pub fn file_name(&self) -> &'static str {
        self.url.rsplit('/').next().unwrap_or(self.url)
    }

    pub fn count_range(&self) -> (usize, usize) {
        (
            self.expected_files.saturating_sub(COUNT_TOLERANCE),
            self.expected_files + COUNT_TOLERANCE,
        )
    }
}

/// Download order matters only for logs: EEG, EMG, EOG.
pub const DESCRIPTORS: [ArchiveDescriptor; 3] = [
    ArchiveDescriptor {
        name: DatasetName::Eeg,
        url: "https://cis.temple.edu/~yun/data/QR10/EEGEOGDenoisingData.zip",
        sha256: "6bb7ced2fe7dfa2c9dd4ee38f778c7d3eae7e8adf429c5deaa4a8fa7b7d30da5",
        expected_files: 4514,
        filter: CountFilter::Extension(".mat"),
    },
    ArchiveDescriptor {
        name: DatasetName::Emg,
        url: "https://cis.temple.edu/~yun/data/EEGdenoiseNet/EEGDenoiseNet_EMG.tar.gz",
        sha256: "34d9ea56e5e2b70cbf98f9feae1d5b0d9ccc9c71d2b1b9bdcf7f9aa0a8b68d2e",
        expected_files: 5598,
        filter: CountFilter::All,
    },
    ArchiveDescriptor {
        name: DatasetName::Eog,
        url: "https://cis.temple.edu/~yun/data/EEGdenoiseNet/EEGDenoiseNet_EOG.tar.gz",
        sha256: "e9a3e12ea1a3cf1a6b4c0a8f57cb3d70d8b77d8606aa5a96ff6d51f6548a2e0f",
        expected_files: 3400,
        filter: CountFilter::All,
    },
];

pub fn descriptor(name: DatasetName) -> &'static ArchiveDescriptor {
    match name {
        DatasetName::Eeg => &DESCRIPTORS[0],
        DatasetName::Emg => &DESCRIPTORS[1],
        DatasetName::Eog => &DESCRIPTORS[2],
    }
}
