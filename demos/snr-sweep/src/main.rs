use ndarray::Array2;
use pairs::{
    artifact_gain, compute_snr, mean_square, ArtifactKind, Corpus, DatasetConfig, DenoiseDataset,
    MixMode, PairDataset, ReproContext, SignalClass, Split,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const SEG: usize = 512;

/// Alpha-band-ish oscillation with per-epoch phase and amplitude jitter.
fn synthetic_eeg(rows: usize, rng: &mut StdRng) -> Array2<f64> {
    let mut out = Array2::zeros((rows, SEG));
    for mut row in out.rows_mut() {
        let phase: f64 = rng.gen_range(0.0..std::f64::consts::TAU);
        let amp: f64 = rng.gen_range(20.0..60.0);
        for (t, v) in row.iter_mut().enumerate() {
            let x = t as f64 / 256.0;
            *v = amp * (std::f64::consts::TAU * 10.0 * x + phase).sin() + rng.gen_range(-5.0..5.0);
        }
    }
    out
}

/// Slow, large blink-like bumps.
fn synthetic_eog(rows: usize, rng: &mut StdRng) -> Array2<f64> {
    let mut out = Array2::zeros((rows, SEG));
    for mut row in out.rows_mut() {
        let centre = rng.gen_range(64.0..448.0);
        let width = rng.gen_range(20.0..60.0);
        for (t, v) in row.iter_mut().enumerate() {
            let d = (t as f64 - centre) / width;
            *v = 300.0 * (-d * d).exp();
        }
    }
    out
}

fn main() {
    println!("=== SNR Sweep: synthetic EEG + EOG ===\n");

    let mut rng = StdRng::seed_from_u64(2024);
    let clean = Corpus::new(SignalClass::Eeg, synthetic_eeg(200, &mut rng), SEG).unwrap();
    let artifact = Corpus::new(SignalClass::Eog, synthetic_eog(60, &mut rng), SEG).unwrap();
    println!("clean corpus:    {:?}", clean.data().dim());
    println!("artifact corpus: {:?}", artifact.data().dim());

    let ctx = ReproContext::new(1);

    // 1. Split sizes
    println!("\n--- Splits ---");
    for split in Split::ALL {
        let cfg = DatasetConfig {
            split,
            artifact: ArtifactKind::Eog,
            ..DatasetConfig::default()
        };
        let ds = DenoiseDataset::from_corpora(clean.clone(), artifact.clone(), cfg, &ctx).unwrap();
        println!("{:<5} {:>4} samples  first rows {:?}", split, ds.len(), &ds.indices()[..3]);
    }

    // 2. Target vs achieved SNR
    println!("\n--- Sweep (train, precomputed) ---");
    println!("{:>8} {:>10} {:>10}", "target", "achieved", "gain k");
    for target in [-10.0, -5.0, 0.0, 5.0, 10.0, 20.0] {
        let cfg = DatasetConfig {
            split: Split::Train,
            artifact: ArtifactKind::Eog,
            mode: MixMode::Precomputed,
            snr_db: target,
            ..DatasetConfig::default()
        };
        let ds = DenoiseDataset::from_corpora(clean.clone(), artifact.clone(), cfg, &ctx).unwrap();

        let mut achieved = 0.0;
        let n = 16;
        for i in 0..n {
            let pair = ds.get(i).unwrap();
            achieved += compute_snr(&pair.clean.mapv(f64::from), &pair.noisy.mapv(f64::from)).unwrap();
        }
        // Both sides are unit-power after standardization.
        let k = artifact_gain(1.0, 1.0, target);
        println!("{:>8.1} {:>10.3} {:>10.4}", target, achieved / n as f64, k);
    }

    // 3. On-the-fly draws differ per access
    println!("\n--- On-the-fly ---");
    let ds = DenoiseDataset::from_corpora(
        clean,
        artifact,
        DatasetConfig { snr_db: 0.0, ..DatasetConfig::default() },
        &ctx,
    )
    .unwrap();
    let a = ds.get(0).unwrap();
    let b = ds.get(0).unwrap();
    println!("clean identical:  {}", a.clean == b.clean);
    println!("noisy identical:  {}", a.noisy == b.noisy);
    println!("noisy power:      {:.3}", mean_square(&a.noisy.mapv(f64::from)));
}
