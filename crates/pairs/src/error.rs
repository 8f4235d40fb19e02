use std::path::PathBuf;

use thiserror::Error;

use crate::corpus::SignalClass;

#[derive(Debug, Error)]
pub enum SignalError {
    #[error("shape mismatch: clean {clean:?} vs other {other:?}")]
    ShapeMismatch { clean: Vec<usize>, other: Vec<usize> },

    #[error("input has no samples")]
    EmptyInput,

    #[error("input must have at least one axis")]
    ZeroDimensional,

    /// The artifact carries no power, so no finite gain reaches the target SNR.
    #[error("cannot scale artifact: clean power {clean_power}, artifact power {artifact_power}")]
    NonFiniteGain { clean_power: f64, artifact_power: f64 },

    #[error("corpus file not found: {path}")]
    NotFound { path: PathBuf },

    #[error("cannot read NumPy array {path}: {message}")]
    Npy { path: PathBuf, message: String },

    #[error("invalid {class} corpus: {reason}")]
    InvalidCorpus { class: SignalClass, reason: String },

    #[error("{class} segments have length {found}, expected {expected}")]
    SegmentLength {
        class: SignalClass,
        expected: usize,
        found: usize,
    },

    #[error("invalid low-pass filter: {reason}")]
    InvalidFilter { reason: String },

    #[error("index {index} out of bounds (dataset has {len} samples)")]
    IndexOutOfBounds { index: usize, len: usize },

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, SignalError>;
