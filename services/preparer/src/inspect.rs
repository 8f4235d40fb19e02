use std::process::ExitCode;

use anyhow::{Context, Result};
use pairs::{
    compute_snr, load_corpus, DatasetConfig, DenoiseDataset, LowpassFilter, PairDataset,
    ReproContext, SignalClass, Split,
};
use tracing::info;

use crate::blocking::run_blocking;
use crate::cli::InspectArgs;
use crate::config::AppConfig;

/// Achieved SNR for one training sample.
#[derive(Debug)]
pub struct SnrProbe {
    pub index: usize,
    pub achieved_db: f64,
}

pub async fn inspect(cfg: &AppConfig, args: InspectArgs, seed: u64) -> Result<ExitCode> {
    let data_dir = args.data_dir.clone().unwrap_or_else(|| cfg.data_dir.clone());
    let ctx = ReproContext::new(seed);

    let filter = args
        .lowpass_hz
        .map(LowpassFilter::with_cutoff)
        .transpose()
        .context("Invalid --lowpass-hz")?;

    // Filtered once here so the three splits share the result.
    let (clean, artifact) = {
        let artifact_class = args.artifact.class();
        let segment_length = args.segment_length;
        run_blocking("load corpora", move || {
            let mut clean = load_corpus(&data_dir, SignalClass::Eeg, segment_length)?;
            let mut artifact = load_corpus(&data_dir, artifact_class, segment_length)?;
            if let Some(filter) = &filter {
                clean = clean.lowpassed(filter)?;
                artifact = artifact.lowpassed(filter)?;
            }
            Ok::<_, pairs::SignalError>((clean, artifact))
        })
        .await?
    };
    info!(
        clean = ?clean.data().dim(),
        artifact = ?artifact.data().dim(),
        lowpass_hz = ?args.lowpass_hz,
        "corpus shapes"
    );

    let mut train = None;
    for split in Split::ALL {
        let config = DatasetConfig {
            split,
            artifact: args.artifact,
            mode: args.mode,
            snr_db: args.snr_db,
            segment_length: args.segment_length,
            ..DatasetConfig::default()
        };
        let ds = DenoiseDataset::from_corpora(clean.clone(), artifact.clone(), config, &ctx)
            .with_context(|| format!("Failed to build {split} dataset"))?;
        info!(split = %split, samples = ds.len(), "split size");
        if split == Split::Train {
            train = Some(ds);
        }
    }

    if let Some(train) = train {
        for probe in probe_snr(&train, args.samples)? {
            info!(
                index = probe.index,
                target_db = args.snr_db,
                achieved_db = probe.achieved_db,
                "achieved SNR"
            );
        }
    }
    Ok(ExitCode::SUCCESS)
}

pub fn probe_snr(ds: &dyn PairDataset, samples: usize) -> Result<Vec<SnrProbe>> {
    (0..samples.min(ds.len()))
        .map(|index| {
            let pair = ds
                .get(index)
                .with_context(|| format!("Failed to read sample {index} of {}", ds.name()))?;
            if index == 0 {
                info!(noisy = ?pair.noisy.dim(), clean = ?pair.clean.dim(), "sample shape");
            }
            let achieved_db = compute_snr(&pair.clean.mapv(f64::from), &pair.noisy.mapv(f64::from))?;
            Ok(SnrProbe { index, achieved_db })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;
    use pairs::{ArtifactKind, Corpus, MixMode};

    fn corpus(class: SignalClass, rows: usize) -> Corpus {
        let data = Array2::from_shape_fn((rows, 64), |(r, c)| ((r + 1) * (c % 9)) as f64);
        Corpus::new(class, data, 64).unwrap()
    }

    #[test]
    fn probes_hit_target_and_stop_at_len() {
        let cfg = DatasetConfig {
            split: Split::Val,
            artifact: ArtifactKind::Emg,
            mode: MixMode::OnTheFly,
            snr_db: -3.0,
            segment_length: 64,
            ..DatasetConfig::default()
        };
        let ds = DenoiseDataset::from_corpora(
            corpus(SignalClass::Eeg, 30),
            corpus(SignalClass::Emg, 6),
            cfg,
            &ReproContext::new(4),
        )
        .unwrap();

        let probes = probe_snr(&ds, 10).unwrap();
        assert_eq!(probes.len(), 3);
        for p in probes {
            assert!((p.achieved_db + 3.0).abs() < 0.01, "{p:?}");
        }
    }
}
