use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use pairs::{ArtifactKind, MixMode, DEFAULT_SEGMENT_LENGTH};

/// Download, verify and unpack the EEG denoising corpora, and inspect the
/// paired samples built from them.
#[derive(Parser, Debug)]
#[command(name = "preparer", version, about)]
pub struct Cli {
    /// Seed for artifact sampling. Split membership does not depend on it.
    #[arg(long, global = true, default_value_t = 0)]
    pub seed: u64,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Fetch, checksum, extract and count every dataset
    PrepareData(PrepareArgs),
    /// Fetch and checksum the archives only
    Fetch(FetchArgs),
    /// Extract archives already in the raw directory and count files
    Extract(ExtractArgs),
    /// Load the corpora and report split sizes and achieved SNR
    Inspect(InspectArgs),
}

#[derive(Args, Debug)]
pub struct PrepareArgs {
    /// Archive directory [env: EEG_RAW_DIR]
    #[arg(long)]
    pub raw_dir: Option<PathBuf>,

    /// Extraction root [env: EEG_PROCESSED_DIR]
    #[arg(long)]
    pub processed_dir: Option<PathBuf>,

    #[arg(long)]
    pub skip_download: bool,

    #[arg(long)]
    pub skip_extract: bool,

    /// Accept archives already on disk without re-hashing them
    #[arg(long)]
    pub trust_cached: bool,

    /// Write the per-dataset verification report here as JSON
    #[arg(long)]
    pub report: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct FetchArgs {
    #[arg(long)]
    pub raw_dir: Option<PathBuf>,

    #[arg(long)]
    pub trust_cached: bool,
}

#[derive(Args, Debug)]
pub struct ExtractArgs {
    #[arg(long)]
    pub raw_dir: Option<PathBuf>,

    #[arg(long)]
    pub processed_dir: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Directory holding the *_all_epochs.npy files [env: EEG_DATA_DIR]
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    /// EOG or EMG
    #[arg(long, default_value = "EOG")]
    pub artifact: ArtifactKind,

    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub snr_db: f64,

    /// on-the-fly or precomputed
    #[arg(long, default_value = "on-the-fly")]
    pub mode: MixMode,

    #[arg(long, default_value_t = DEFAULT_SEGMENT_LENGTH)]
    pub segment_length: usize,

    /// Training samples to measure
    #[arg(long, default_value_t = 3)]
    pub samples: usize,

    /// Zero-phase Butterworth low-pass (order 5, 256 Hz sampling) applied to
    /// both corpora before mixing, e.g. 72
    #[arg(long)]
    pub lowpass_hz: Option<f64>,
}
