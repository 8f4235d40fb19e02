use std::fmt;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use ndarray::{Array2, ArrayD, ArrayView1, Ix2};
use ndarray_npy::{ReadNpyError, ReadNpyExt};
use tracing::{debug, info};

use crate::error::{Result, SignalError};
use crate::filter::LowpassFilter;

/// Default epoch length, in samples.
pub const DEFAULT_SEGMENT_LENGTH: usize = 512;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SignalClass {
    Eeg,
    Eog,
    Emg,
}

impl SignalClass {
    pub fn as_str(self) -> &'static str {
        match self {
            SignalClass::Eeg => "EEG",
            SignalClass::Eog => "EOG",
            SignalClass::Emg => "EMG",
        }
    }

    /// Name of the epoch array under the data directory.
    pub fn file_name(self) -> &'static str {
        match self {
            SignalClass::Eeg => "EEG_all_epochs.npy",
            SignalClass::Eog => "EOG_all_epochs.npy",
            SignalClass::Emg => "EMG_all_epochs.npy",
        }
    }

    pub fn path_in(self, root: &Path) -> PathBuf {
        root.join(self.file_name())
    }
}

impl fmt::Display for SignalClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Contaminant mixed into clean EEG.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ArtifactKind {
    Eog,
    Emg,
}

impl ArtifactKind {
    pub fn class(self) -> SignalClass {
        match self {
            ArtifactKind::Eog => SignalClass::Eog,
            ArtifactKind::Emg => SignalClass::Emg,
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.class(), f)
    }
}

impl FromStr for ArtifactKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "EOG" => Ok(ArtifactKind::Eog),
            "EMG" => Ok(ArtifactKind::Emg),
            other => Err(format!("unknown artifact type: {other} (expected EOG or EMG)")),
        }
    }
}

/// Read-only `(epochs, segment_length)` matrix for one signal class.
///
/// Cloning is cheap: the samples sit behind an `Arc`, so train/val/test
/// datasets built from the same corpus share one allocation.
#[derive(Clone, Debug)]
pub struct Corpus {
    class: SignalClass,
    data: Arc<Array2<f64>>,
}

impl Corpus {
    pub fn new(class: SignalClass, data: Array2<f64>, segment_length: usize) -> Result<Self> {
        let (rows, cols) = data.dim();
        if rows == 0 {
            return Err(SignalError::InvalidCorpus {
                class,
                reason: "no epochs".into(),
            });
        }
        if cols != segment_length {
            return Err(SignalError::SegmentLength {
                class,
                expected: segment_length,
                found: cols,
            });
        }
        Ok(Self {
            class,
            data: Arc::new(data),
        })
    }

    pub fn class(&self) -> SignalClass {
        self.class
    }

    pub fn len(&self) -> usize {
        self.data.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.data.nrows() == 0
    }

    pub fn segment_length(&self) -> usize {
        self.data.ncols()
    }

    /// Panics if `index >= len()`.
    pub fn segment(&self, index: usize) -> ArrayView1<'_, f64> {
        self.data.row(index)
    }

    pub fn data(&self) -> &Array2<f64> {
        &self.data
    }

    /// New corpus with every epoch passed through `filter`.
    pub fn lowpassed(&self, filter: &LowpassFilter) -> Result<Corpus> {
        let data = filter.apply(self.data())?;
        info!(
            class = %self.class,
            cutoff_hz = filter.cutoff_hz(),
            order = filter.order(),
            epochs = self.len(),
            "low-pass filtered corpus"
        );
        Corpus::new(self.class, data, self.segment_length())
    }
}

/// Load `<root>/<CLASS>_all_epochs.npy`.
///
/// Arrays stored as `float32` are widened to `f64`; anything else is rejected.
pub fn load_corpus(root: &Path, class: SignalClass, segment_length: usize) -> Result<Corpus> {
    let path = class.path_in(root);
    if !path.is_file() {
        return Err(SignalError::NotFound { path });
    }

    let raw = match read_array::<f64>(&path) {
        Ok(arr) => arr,
        Err(ReadNpyError::WrongDescriptor(_)) => {
            debug!(path = %path.display(), "not float64, retrying as float32");
            read_array::<f32>(&path)
                .map_err(|e| npy_error(&path, e))?
                .mapv(f64::from)
        }
        Err(e) => return Err(npy_error(&path, e)),
    };

    let shape = raw.shape().to_vec();
    let data = raw
        .into_dimensionality::<Ix2>()
        .map_err(|_| SignalError::InvalidCorpus {
            class,
            reason: format!("expected a 2-D array, found shape {shape:?}"),
        })?;

    let corpus = Corpus::new(class, data, segment_length)?;
    info!(
        class = %class,
        epochs = corpus.len(),
        segment_length,
        path = %path.display(),
        "loaded corpus"
    );
    Ok(corpus)
}

fn read_array<T>(path: &Path) -> std::result::Result<ArrayD<T>, ReadNpyError>
where
    ArrayD<T>: ReadNpyExt,
{
    let file = File::open(path)?;
    ArrayD::<T>::read_npy(file)
}

fn npy_error(path: &Path, e: ReadNpyError) -> SignalError {
    match e {
        ReadNpyError::Io(source) => SignalError::Io {
            path: path.to_path_buf(),
            source,
        },
        other => SignalError::Npy {
            path: path.to_path_buf(),
            message: other.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array;
    use ndarray_npy::write_npy;

    #[test]
    fn test_file_names() {
        assert_eq!(SignalClass::Eeg.file_name(), "EEG_all_epochs.npy");
        assert_eq!(ArtifactKind::Emg.class().file_name(), "EMG_all_epochs.npy");
    }

    #[test]
    fn test_parse_artifact() {
        assert_eq!("EOG".parse::<ArtifactKind>().unwrap(), ArtifactKind::Eog);
        assert_eq!("emg".parse::<ArtifactKind>().unwrap(), ArtifactKind::Emg);
        assert!("ECG".parse::<ArtifactKind>().is_err());
    }

    #[test]
    fn test_new_rejects_empty_and_wrong_width() {
        let empty = Array2::<f64>::zeros((0, 8));
        assert!(matches!(
            Corpus::new(SignalClass::Eeg, empty, 8),
            Err(SignalError::InvalidCorpus { .. })
        ));

        let narrow = Array2::<f64>::zeros((3, 4));
        assert!(matches!(
            Corpus::new(SignalClass::Eog, narrow, 8),
            Err(SignalError::SegmentLength { expected: 8, found: 4, .. })
        ));
    }

    #[test]
    fn test_load_rejects_3d() {
        let dir = tempfile::tempdir().unwrap();
        let cube = Array::<f64, _>::zeros((2, 2, 8));
        write_npy(SignalClass::Emg.path_in(dir.path()), &cube).unwrap();

        let err = load_corpus(dir.path(), SignalClass::Emg, 8).unwrap_err();
        assert!(matches!(err, SignalError::InvalidCorpus { class: SignalClass::Emg, .. }));
    }

    #[test]
    fn test_load_rejects_integer_arrays() {
        let dir = tempfile::tempdir().unwrap();
        let ints = Array2::<i32>::zeros((2, 8));
        write_npy(SignalClass::Eeg.path_in(dir.path()), &ints).unwrap();

        let err = load_corpus(dir.path(), SignalClass::Eeg, 8).unwrap_err();
        assert!(matches!(err, SignalError::Npy { .. }));
    }

    #[test]
    fn test_lowpassed_keeps_shape_and_source() {
        let c = Corpus::new(SignalClass::Eog, Array2::from_elem((3, 64), 2.0), 64).unwrap();
        let f = c.lowpassed(&LowpassFilter::eeg_default()).unwrap();
        assert_eq!(f.class(), SignalClass::Eog);
        assert_eq!(f.data().dim(), (3, 64));
        assert!(!std::ptr::eq(c.data(), f.data()));
        assert_eq!(c.segment(0)[0], 2.0);
    }

    #[test]
    fn test_clone_shares_samples() {
        let c = Corpus::new(SignalClass::Eeg, Array2::from_elem((2, 4), 1.5), 4).unwrap();
        let d = c.clone();
        assert!(std::ptr::eq(c.data(), d.data()));
        assert_eq!(d.segment(1)[3], 1.5);
    }
}
