//! Paired (noisy, clean) samples over one split of a clean EEG corpus.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::{Mutex, PoisonError};

use ndarray::{Array1, Array2, ArrayView1};
use rand::rngs::StdRng;
use rand::Rng;
use tracing::info;

use crate::corpus::{load_corpus, ArtifactKind, Corpus, SignalClass, DEFAULT_SEGMENT_LENGTH};
use crate::error::{Result, SignalError};
use crate::filter::LowpassFilter;
use crate::mix::mix;
use crate::repro::ReproContext;
use crate::split::{Split, SplitIndices};
use crate::standardize::standardize;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MixMode {
    /// Fresh artifact draw on every access.
    OnTheFly,
    /// One artifact draw per index, frozen at construction.
    Precomputed,
}

impl MixMode {
    pub fn as_str(self) -> &'static str {
        match self {
            MixMode::OnTheFly => "on-the-fly",
            MixMode::Precomputed => "precomputed",
        }
    }
}

impl fmt::Display for MixMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MixMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "on-the-fly" | "otf" => Ok(MixMode::OnTheFly),
            "precomputed" => Ok(MixMode::Precomputed),
            other => Err(format!("unknown mix mode: {other}")),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct DatasetConfig {
    pub split: Split,
    pub artifact: ArtifactKind,
    pub mode: MixMode,
    pub snr_db: f64,
    pub segment_length: usize,
    pub root_dir: PathBuf,
    /// Zero-phase low-pass cutoff applied to both corpora before mixing.
    /// `None` leaves the epochs untouched.
    pub lowpass_hz: Option<f64>,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            split: Split::Train,
            artifact: ArtifactKind::Eog,
            mode: MixMode::OnTheFly,
            snr_db: 0.0,
            segment_length: DEFAULT_SEGMENT_LENGTH,
            root_dir: PathBuf::from("./data"),
            lowpass_hz: None,
        }
    }
}

/// Both sides are `(1, segment_length)`.
#[derive(Clone, Debug, PartialEq)]
pub struct PairedSample {
    pub noisy: Array2<f32>,
    pub clean: Array2<f32>,
}

/// Random-access source of paired samples.
pub trait PairDataset: Send + Sync {
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn get(&self, index: usize) -> Result<PairedSample>;

    fn name(&self) -> &str;
}

enum NoisySource {
    OnTheFly(Mutex<StdRng>),
    /// Row `i` is the noisy side for split position `i`.
    Precomputed(Array2<f64>),
}

pub struct DenoiseDataset {
    clean: Corpus,
    artifact: Corpus,
    indices: Vec<usize>,
    config: DatasetConfig,
    noisy: NoisySource,
    name: String,
}

impl DenoiseDataset {
    /// Load both corpora from `config.root_dir` and build the dataset.
    pub fn open(config: DatasetConfig, ctx: &ReproContext) -> Result<Self> {
        let clean = load_corpus(&config.root_dir, SignalClass::Eeg, config.segment_length)?;
        let artifact = load_corpus(&config.root_dir, config.artifact.class(), config.segment_length)?;
        Self::from_corpora(clean, artifact, config, ctx)
    }

    /// Build over corpora already in memory. `config.root_dir` is ignored.
    pub fn from_corpora(
        clean: Corpus,
        artifact: Corpus,
        config: DatasetConfig,
        ctx: &ReproContext,
    ) -> Result<Self> {
        if clean.class() != SignalClass::Eeg {
            return Err(SignalError::InvalidCorpus {
                class: clean.class(),
                reason: "clean side must be EEG".into(),
            });
        }
        if artifact.class() != config.artifact.class() {
            return Err(SignalError::InvalidCorpus {
                class: artifact.class(),
                reason: format!("configured artifact is {}", config.artifact),
            });
        }
        for corpus in [&clean, &artifact] {
            if corpus.segment_length() != config.segment_length {
                return Err(SignalError::SegmentLength {
                    class: corpus.class(),
                    expected: config.segment_length,
                    found: corpus.segment_length(),
                });
            }
        }

        let (clean, artifact) = match config.lowpass_hz {
            Some(hz) => {
                let filter = LowpassFilter::with_cutoff(hz)?;
                (clean.lowpassed(&filter)?, artifact.lowpassed(&filter)?)
            }
            None => (clean, artifact),
        };

        let split = SplitIndices::derive_with(clean.len(), &mut ctx.split_rng());
        let indices = split.indices(config.split).to_vec();

        let mut rng = ctx.sampler_rng();
        let noisy = match config.mode {
            MixMode::OnTheFly => NoisySource::OnTheFly(Mutex::new(rng)),
            MixMode::Precomputed => {
                let mut cache = Array2::<f64>::zeros((indices.len(), config.segment_length));
                for (mut row, &idx) in cache.rows_mut().into_iter().zip(&indices) {
                    let draw = rng.gen_range(0..artifact.len());
                    let noisy = mix_pair(
                        clean.segment(idx),
                        artifact.segment(draw),
                        config.snr_db,
                    )?;
                    row.assign(&noisy);
                }
                NoisySource::Precomputed(cache)
            }
        };

        let name = format!("denoise-{}-{}", config.split, config.artifact);
        info!(
            dataset = %name,
            samples = indices.len(),
            clean_epochs = clean.len(),
            artifact_epochs = artifact.len(),
            mode = %config.mode,
            snr_db = config.snr_db,
            "dataset ready"
        );

        Ok(Self {
            clean,
            artifact,
            indices,
            config,
            noisy,
            name,
        })
    }

    pub fn split(&self) -> Split {
        self.config.split
    }

    pub fn artifact(&self) -> ArtifactKind {
        self.config.artifact
    }

    pub fn mode(&self) -> MixMode {
        self.config.mode
    }

    pub fn snr_db(&self) -> f64 {
        self.config.snr_db
    }

    pub fn segment_length(&self) -> usize {
        self.config.segment_length
    }

    /// Clean-corpus rows in this split, in sample order.
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    fn draw_artifact(&self, rng: &Mutex<StdRng>) -> usize {
        // A panic elsewhere cannot leave the generator in a torn state.
        let mut rng = rng.lock().unwrap_or_else(PoisonError::into_inner);
        rng.gen_range(0..self.artifact.len())
    }
}

impl PairDataset for DenoiseDataset {
    fn len(&self) -> usize {
        self.indices.len()
    }

    fn get(&self, index: usize) -> Result<PairedSample> {
        let &row = self
            .indices
            .get(index)
            .ok_or(SignalError::IndexOutOfBounds {
                index,
                len: self.indices.len(),
            })?;

        let clean = standardize(&self.clean.segment(row))?;
        let noisy = match &self.noisy {
            NoisySource::OnTheFly(rng) => {
                let draw = self.draw_artifact(rng);
                let artifact = standardize(&self.artifact.segment(draw))?;
                mix(&clean, &artifact, self.config.snr_db)?
            }
            NoisySource::Precomputed(cache) => cache.row(index).to_owned(),
        };

        Ok(PairedSample {
            noisy: to_channel(noisy),
            clean: to_channel(clean),
        })
    }

    fn name(&self) -> &str {
        &self.name
    }
}

fn mix_pair(clean: ArrayView1<'_, f64>, artifact: ArrayView1<'_, f64>, snr_db: f64) -> Result<Array1<f64>> {
    let clean = standardize(&clean)?;
    let artifact = standardize(&artifact)?;
    mix(&clean, &artifact, snr_db)
}

fn to_channel(x: Array1<f64>) -> Array2<f32> {
    x.mapv(|v| v as f32).insert_axis(ndarray::Axis(0))
}
