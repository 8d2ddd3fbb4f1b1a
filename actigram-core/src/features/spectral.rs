//! Frequency-domain analysis of window series
//!
//! ## Overview
//!
//! Computes a one-sided discrete Fourier transform magnitude spectrum and
//! derives the two spectral features: dominant frequency and spectral
//! energy. The transform is evaluated directly:
//!
//! ```text
//! X[k] = Σₙ x[n]·e^(-i·2π·k·n/N),  k = 0 .. N/2
//! ```
//!
//! A direct evaluation is O(N²) but N is the window length (200 samples),
//! so one spectrum costs about 20k multiply-adds. That stays cheap, works
//! for lengths that are not powers of two, and needs nothing beyond libm,
//! which keeps the module `no_std`.
//!
//! ## DC handling
//!
//! Bin 0 carries the window mean (for the acceleration magnitude that is
//! mostly gravity). Both derived features skip it: dominant frequency scans
//! bins 1..=N/2 and energy sums the same band, normalized by the window
//! length. The mean features already cover the offset.

extern crate alloc;

use alloc::vec::Vec;

use core::f64::consts::TAU;

/// One-sided DFT magnitude spectrum of a single window series
#[derive(Debug, Clone, PartialEq)]
pub struct Spectrum {
    magnitudes: Vec<f64>,
    resolution_hz: f64,
    window_len: usize,
}

impl Spectrum {
    /// Compute the spectrum of one series sampled at `sample_rate_hz`
    pub fn compute(series: &[f64], sample_rate_hz: f64) -> Self {
        let n = series.len();
        if n == 0 || sample_rate_hz <= 0.0 {
            return Self {
                magnitudes: Vec::new(),
                resolution_hz: 0.0,
                window_len: 0,
            };
        }

        let bins = n / 2 + 1;
        let mut magnitudes = Vec::with_capacity(bins);
        for k in 0..bins {
            let mut re = 0.0;
            let mut im = 0.0;
            for (i, x) in series.iter().enumerate() {
                let angle = -TAU * (k as f64) * (i as f64) / (n as f64);
                re += x * libm::cos(angle);
                im += x * libm::sin(angle);
            }
            magnitudes.push(libm::sqrt(re * re + im * im));
        }

        Self {
            magnitudes,
            resolution_hz: sample_rate_hz / n as f64,
            window_len: n,
        }
    }

    /// Magnitudes for bins 0..=N/2
    pub fn magnitudes(&self) -> &[f64] {
        &self.magnitudes
    }

    /// Frequency spacing between adjacent bins (Hz)
    pub fn resolution_hz(&self) -> f64 {
        self.resolution_hz
    }

    /// Frequency (Hz) of the strongest non-DC bin
    ///
    /// Ties resolve to the lower bin. Returns 0 when the spectrum has no
    /// non-DC bins.
    pub fn dominant_frequency(&self) -> f64 {
        if self.magnitudes.len() < 2 {
            return 0.0;
        }
        let mut best = 1;
        for k in 2..self.magnitudes.len() {
            if self.magnitudes[k] > self.magnitudes[best] {
                best = k;
            }
        }
        best as f64 * self.resolution_hz
    }

    /// Sum of squared non-DC magnitudes, normalized by window length
    pub fn energy(&self) -> f64 {
        if self.window_len == 0 {
            return 0.0;
        }
        let sum: f64 = self.magnitudes.iter().skip(1).map(|m| m * m).sum();
        sum / self.window_len as f64
    }
}
