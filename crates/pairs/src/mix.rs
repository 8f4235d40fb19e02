use ndarray::{Array, ArrayBase, Data, Dimension};

use crate::{Result, SignalError};

/// Noise power below this is treated as no noise at all.
pub const NOISE_FLOOR: f64 = 1e-10;

/// Mean of squares over every element.
pub fn mean_square<S, D>(x: &ArrayBase<S, D>) -> f64
where
    S: Data<Elem = f64>,
    D: Dimension,
{
    if x.is_empty() {
        return 0.0;
    }
    x.iter().map(|v| v * v).sum::<f64>() / x.len() as f64
}

/// Scalar `k` such that `clean_power / (k² · artifact_power)` equals
/// `10^(target_snr_db / 10)`.
pub fn artifact_gain(clean_power: f64, artifact_power: f64, target_snr_db: f64) -> f64 {
    (clean_power / (artifact_power * 10f64.powf(target_snr_db / 10.0))).sqrt()
}

/// `clean + k · artifact` at the requested SNR. Power is pooled over all
/// elements, so a batch of segments shares one gain.
pub fn mix<S1, S2, D>(
    clean: &ArrayBase<S1, D>,
    artifact: &ArrayBase<S2, D>,
    target_snr_db: f64,
) -> Result<Array<f64, D>>
where
    S1: Data<Elem = f64>,
    S2: Data<Elem = f64>,
    D: Dimension,
{
    check_pair(clean, artifact)?;

    let clean_power = mean_square(clean);
    let artifact_power = mean_square(artifact);
    let k = artifact_gain(clean_power, artifact_power, target_snr_db);
    if !k.is_finite() {
        return Err(SignalError::NonFiniteGain { clean_power, artifact_power });
    }

    let mut out = artifact.mapv(|a| a * k);
    ndarray::Zip::from(&mut out)
        .and(clean)
        .for_each(|o, &c| *o += c);
    Ok(out)
}

/// Achieved SNR in dB of `noisy` against `clean`; `+inf` when the residual
/// is below [`NOISE_FLOOR`].
pub fn compute_snr<S1, S2, D>(clean: &ArrayBase<S1, D>, noisy: &ArrayBase<S2, D>) -> Result<f64>
where
    S1: Data<Elem = f64>,
    S2: Data<Elem = f64>,
    D: Dimension,
{
    check_pair(clean, noisy)?;

    let signal_power = mean_square(clean);
    let noise_power = clean
        .iter()
        .zip(noisy.iter())
        .map(|(c, n)| (n - c).powi(2))
        .sum::<f64>()
        / clean.len() as f64;

    if noise_power < NOISE_FLOOR {
        return Ok(f64::INFINITY);
    }
    Ok(10.0 * (signal_power / noise_power).log10())
}

fn check_pair<S1, S2, D>(a: &ArrayBase<S1, D>, b: &ArrayBase<S2, D>) -> Result<()>
where
    S1: Data<Elem = f64>,
    S2: Data<Elem = f64>,
    D: Dimension,
{
    if a.shape() != b.shape() {
        return Err(SignalError::ShapeMismatch {
            clean: a.shape().to_vec(),
            other: b.shape().to_vec(),
        });
    }
    if a.is_empty() {
        return Err(SignalError::EmptyInput);
    }
    Ok(())
}
