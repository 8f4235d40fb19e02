//! Zero-phase Butterworth low-pass, applied forward then backward along the
//! last axis.

use std::f64::consts::PI;

use ndarray::{Array, ArrayBase, Axis, Data, Dimension};

use crate::error::{Result, SignalError};

/// Sampling rate of the EEGdenoiseNet epochs.
pub const SAMPLE_RATE_HZ: f64 = 256.0;
pub const DEFAULT_CUTOFF_HZ: f64 = 72.0;
pub const DEFAULT_ORDER: usize = 5;

/// One first- or second-order stage, transposed direct form II.
/// First-order stages keep `b2 = a2 = 0`.
#[derive(Clone, Copy, Debug, PartialEq)]
struct Section {
    b0: f64,
    b1: f64,
    b2: f64,
    a1: f64,
    a2: f64,
}

impl Section {
    fn second_order(k: f64, q: f64) -> Self {
        let k2 = k * k;
        let norm = 1.0 / (1.0 + k / q + k2);
        let b0 = k2 * norm;
        Self {
            b0,
            b1: 2.0 * b0,
            b2: b0,
            a1: 2.0 * (k2 - 1.0) * norm,
            a2: (1.0 - k / q + k2) * norm,
        }
    }

    fn first_order(k: f64) -> Self {
        let norm = 1.0 / (1.0 + k);
        Self {
            b0: k * norm,
            b1: k * norm,
            b2: 0.0,
            a1: (k - 1.0) * norm,
            a2: 0.0,
        }
    }

    /// Run over `x` in place, starting from the steady state for a constant
    /// input equal to `x[0]` (DC gain is 1).
    fn run(&self, x: &mut [f64]) {
        let Some(&x0) = x.first() else { return };
        let mut z2 = (self.b2 - self.a2) * x0;
        let mut z1 = (self.b1 - self.a1) * x0 + z2;
        for v in x.iter_mut() {
            let input = *v;
            let y = self.b0 * input + z1;
            z1 = self.b1 * input - self.a1 * y + z2;
            z2 = self.b2 * input - self.a2 * y;
            *v = y;
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct LowpassFilter {
    order: usize,
    cutoff_hz: f64,
    sample_rate_hz: f64,
    sections: Vec<Section>,
}

impl LowpassFilter {
    pub fn new(order: usize, cutoff_hz: f64, sample_rate_hz: f64) -> Result<Self> {
        if order == 0 {
            return Err(SignalError::InvalidFilter { reason: "order must be at least 1".into() });
        }
        if !(sample_rate_hz.is_finite() && sample_rate_hz > 0.0) {
            return Err(SignalError::InvalidFilter {
                reason: format!("sample rate {sample_rate_hz} Hz"),
            });
        }
        let nyquist = sample_rate_hz / 2.0;
        if !(cutoff_hz > 0.0 && cutoff_hz < nyquist) {
            return Err(SignalError::InvalidFilter {
                reason: format!("cutoff {cutoff_hz} Hz outside (0, {nyquist}) Hz"),
            });
        }

        Ok(Self::design(order, cutoff_hz, sample_rate_hz))
    }

    fn design(order: usize, cutoff_hz: f64, sample_rate_hz: f64) -> Self {
        // Bilinear transform with the cutoff pre-warped.
        let k = (PI * cutoff_hz / sample_rate_hz).tan();
        let odd = order % 2;
        let mut sections: Vec<Section> = (1..=order / 2)
            .map(|i| {
                let angle = (2 * i - 1 + odd) as f64 * PI / (2 * order) as f64;
                Section::second_order(k, 1.0 / (2.0 * angle.cos()))
            })
            .collect();
        if odd == 1 {
            sections.push(Section::first_order(k));
        }
        Self { order, cutoff_hz, sample_rate_hz, sections }
    }

    /// Order 5, 72 Hz at 256 Hz.
    pub fn eeg_default() -> Self {
        Self::design(DEFAULT_ORDER, DEFAULT_CUTOFF_HZ, SAMPLE_RATE_HZ)
    }

    pub fn with_cutoff(cutoff_hz: f64) -> Result<Self> {
        Self::new(DEFAULT_ORDER, cutoff_hz, SAMPLE_RATE_HZ)
    }

    pub fn order(&self) -> usize {
        self.order
    }

    pub fn cutoff_hz(&self) -> f64 {
        self.cutoff_hz
    }

    pub fn sample_rate_hz(&self) -> f64 {
        self.sample_rate_hz
    }

    /// Samples of odd reflection added on each side before filtering.
    fn pad_len(&self, n: usize) -> usize {
        (3 * (self.order + 1)).min(n.saturating_sub(1))
    }

    /// Forward-backward pass over one signal. The edges are padded with an
    /// odd reflection to keep start-up transients out of the result.
    pub fn filtfilt(&self, signal: &[f64]) -> Vec<f64> {
        let n = signal.len();
        if n < 2 {
            return signal.to_vec();
        }
        let pad = self.pad_len(n);
        let (first, last) = (signal[0], signal[n - 1]);

        let mut ext = Vec::with_capacity(n + 2 * pad);
        ext.extend((1..=pad).rev().map(|i| 2.0 * first - signal[i]));
        ext.extend_from_slice(signal);
        ext.extend((1..=pad).map(|i| 2.0 * last - signal[n - 1 - i]));

        for s in &self.sections {
            s.run(&mut ext);
        }
        ext.reverse();
        for s in &self.sections {
            s.run(&mut ext);
        }
        ext.reverse();

        ext[pad..pad + n].to_vec()
    }

    /// Filter every lane along the last axis.
    pub fn apply<S, D>(&self, x: &ArrayBase<S, D>) -> Result<Array<f64, D>>
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
            let filtered = self.filtfilt(&lane.to_vec());
            lane.iter_mut().zip(filtered).for_each(|(o, v)| *o = v);
        }
        Ok(out)
    }
}
