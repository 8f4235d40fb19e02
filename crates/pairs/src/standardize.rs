use ndarray::{Array, ArrayBase, Axis, Data, Dimension};

use crate::{Result, SignalError};

/// Added to the standard deviation so constant segments map to zeros.
pub const EPSILON: f64 = 1e-8;

/// Z-score every lane along the last axis against its own mean and
/// population standard deviation. Shape is preserved; lanes never share
/// statistics.
pub fn standardize<S, D>(x: &ArrayBase<S, D>) -> Result<Array<f64, D>>
where
    S: Data<Elem = f64>,
    D: Dimension,
{
    if x.ndim() == 0 {
        return Err(SignalError::ZeroDimensional);
    }

    let axis = Axis(x.ndim() - 1);
    let mut out = x.to_owned();
    for mut lane in out.lanes_mut(axis) {
        let n = lane.len();
        if n == 0 {
            continue;
        }
        let mean = lane.sum() / n as f64;
        let var = lane.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n as f64;
        let denom = var.sqrt() + EPSILON;
        lane.mapv_inplace(|v| (v - mean) / denom);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{arr1, Array2};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn mean_std(xs: &[f64]) -> (f64, f64) {
        let n = xs.len() as f64;
        let mean = xs.iter().sum::<f64>() / n;
        let var = xs.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        (mean, var.sqrt())
    }

    #[test]
    fn test_each_row_is_standardized_independently() {
        let mut rng = StdRng::seed_from_u64(0);
        let x = Array2::from_shape_fn((1000, 512), |(r, _)| {
            // rows differ wildly in offset and scale
            (r as f64) * 3.0 + rng.gen_range(-10.0..10.0) * (1.0 + r as f64 / 100.0)
        });

        let z = standardize(&x).unwrap();

        assert_eq!(z.shape(), x.shape());
        for row in z.rows() {
            let (mean, std) = mean_std(row.as_slice().unwrap());
            assert!(mean.abs() < 1e-6, "mean {mean}");
            assert!((std - 1.0).abs() < 1e-6, "std {std}");
        }
    }

    #[test]
    fn test_one_dimensional_segment() {
        let z = standardize(&arr1(&[1.0, 2.0, 3.0, 4.0])).unwrap();
        let (mean, std) = mean_std(z.as_slice().unwrap());
        assert!(mean.abs() < 1e-12);
        assert!((std - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_constant_segment_maps_to_zero() {
        let z = standardize(&arr1(&[5.0; 16])).unwrap();
        assert!(z.iter().all(|v| *v == 0.0));
    }

    #[test]
    fn test_zero_dimensional_rejected() {
        let scalar = ndarray::arr0(1.0);
        assert!(matches!(standardize(&scalar), Err(SignalError::ZeroDimensional)));
    }
}
