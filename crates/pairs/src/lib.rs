//! Noisy/clean EEG training pairs.
//!
//! Clean epochs are partitioned 80/10/10 by a fixed seed, z-scored per
//! segment, and mixed with a standardized EOG or EMG epoch at a target SNR.
//! Corpora can optionally be low-passed first.

pub mod corpus;
pub mod dataset;
pub mod error;
pub mod filter;
pub mod mix;
pub mod repro;
pub mod split;
pub mod standardize;

pub use corpus::{load_corpus, ArtifactKind, Corpus, SignalClass, DEFAULT_SEGMENT_LENGTH};
pub use dataset::{DatasetConfig, DenoiseDataset, MixMode, PairDataset, PairedSample};
pub use error::{Result, SignalError};
pub use filter::LowpassFilter;
pub use mix::{artifact_gain, compute_snr, mean_square, mix};
pub use repro::{ReproContext, SPLIT_SEED};
pub use split::{Split, SplitIndices};
pub use standardize::standardize;
