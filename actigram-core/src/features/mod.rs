//! Feature Extraction with a Fixed, Ordered Schema
//!
//! ## Overview
//!
//! A feature vector is produced by evaluating an ordered list of
//! [`FeatureKind`]s against one window. The list *is* the schema: its
//! order fixes the meaning of every vector position, and training and
//! decoding must agree on it exactly. Each kind maps to a pure extraction
//! function, so the whole pass is deterministic and side-effect free.
//!
//! ```text
//! window ──┬─ mean(acc_x) ──────────┐
//!          ├─ std(acc_x) ───────────┤
//!          ├─ ...                   ├──▶ [f64; D]  (fixed order)
//!          ├─ corr(acc_x, acc_y) ───┤
//!          └─ dom_freq(acc_mag) ────┘
//! ```
//!
//! ## Schema identity
//!
//! Two schemas are interchangeable only when their kind lists and sample
//! rates match. [`FeatureSchema::fingerprint`] condenses that identity into
//! a u64 (FNV-1a over the encoded kinds and rate), which the model stores
//! and verifies at decode time. A fingerprint mismatch means the caller
//! wired up a different feature pipeline than the model was trained with,
//! which is fatal.
//!
//! ## Usage Example
//!
//! ```rust
//! use actigram_core::features::FeatureSchema;
//! use actigram_core::sample::ImuSample;
//!
//! let schema = FeatureSchema::standard();
//! let window: Vec<ImuSample> = (0..200)
//!     .map(|i| ImuSample::new(i as i64 * 10_000_000, [0.0, 0.0, 9.81], [0.0; 3]))
//!     .collect();
//!
//! let vector = schema.extract(&window).unwrap();
//! assert_eq!(vector.len(), schema.len());
//! ```

pub mod spectral;
pub mod stats;

extern crate alloc;

use alloc::vec::Vec;

use core::fmt;

use crate::{
    constants::DEFAULT_SAMPLE_RATE_HZ,
    errors::{ModelError, ModelResult},
    sample::{Axis, ImuSample, Sensor},
};

pub use spectral::Spectrum;

/// A feature vector in schema order
pub type FeatureVector = Vec<f64>;

/// Series a spectral feature is computed over
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpectralSource {
    /// Euclidean norm of the three accelerometer axes
    AccMagnitude,
    /// A single raw axis
    Axis(Axis),
}

impl SpectralSource {
    fn encode(self) -> [u8; 2] {
        match self {
            SpectralSource::AccMagnitude => [0, 0xFF],
            SpectralSource::Axis(axis) => [1, axis as u8],
        }
    }
}

impl fmt::Display for SpectralSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpectralSource::AccMagnitude => f.write_str("acc_mag"),
            SpectralSource::Axis(axis) => f.write_str(axis.name()),
        }
    }
}

/// One position in the feature schema
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureKind {
    /// Arithmetic mean of one axis
    Mean(Axis),
    /// Sample standard deviation of one axis
    StdDev(Axis),
    /// Unbiased sample variance of one axis
    Variance(Axis),
    /// Signal Magnitude Area over one sensor's three axes
    SignalMagnitudeArea(Sensor),
    /// Pearson correlation between two axes
    Correlation(Axis, Axis),
    /// Frequency of the strongest non-DC spectral bin (Hz)
    DominantFrequency(SpectralSource),
    /// Non-DC spectral energy, normalized by window length
    SpectralEnergy(SpectralSource),
}

impl FeatureKind {
    fn encode(self) -> [u8; 3] {
        match self {
            FeatureKind::Mean(a) => [0, a as u8, 0xFF],
            FeatureKind::StdDev(a) => [1, a as u8, 0xFF],
            FeatureKind::Variance(a) => [2, a as u8, 0xFF],
            FeatureKind::SignalMagnitudeArea(Sensor::Accelerometer) => [3, 0, 0xFF],
            FeatureKind::SignalMagnitudeArea(Sensor::Gyroscope) => [3, 1, 0xFF],
            FeatureKind::Correlation(a, b) => [4, a as u8, b as u8],
            FeatureKind::DominantFrequency(src) => {
                let [s0, s1] = src.encode();
                [5, s0, s1]
            }
            FeatureKind::SpectralEnergy(src) => {
                let [s0, s1] = src.encode();
                [6, s0, s1]
            }
        }
    }
}

impl fmt::Display for FeatureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeatureKind::Mean(a) => write!(f, "mean({})", a.name()),
            FeatureKind::StdDev(a) => write!(f, "std({})", a.name()),
            FeatureKind::Variance(a) => write!(f, "var({})", a.name()),
            FeatureKind::SignalMagnitudeArea(s) => write!(f, "sma({})", s.name()),
            FeatureKind::Correlation(a, b) => write!(f, "corr({},{})", a.name(), b.name()),
            FeatureKind::DominantFrequency(src) => write!(f, "dom_freq({})", src),
            FeatureKind::SpectralEnergy(src) => write!(f, "energy({})", src),
        }
    }
}

/// Ordered feature schema shared by training and decoding
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureSchema {
    kinds: Vec<FeatureKind>,
    sample_rate_hz: f64,
}

impl Default for FeatureSchema {
    fn default() -> Self {
        Self::standard()
    }
}

impl FeatureSchema {
    /// Build a schema from an explicit ordered kind list
    pub fn new(kinds: Vec<FeatureKind>, sample_rate_hz: f64) -> ModelResult<Self> {
        if kinds.is_empty() {
            return Err(ModelError::InvalidConfig { reason: "feature schema is empty" });
        }
        if !(sample_rate_hz > 0.0) {
            return Err(ModelError::InvalidConfig { reason: "sample rate must be positive" });
        }
        Ok(Self { kinds, sample_rate_hz })
    }

    /// The standard 25-dimension schema
    ///
    /// Per-axis mean, standard deviation and variance (6 axes each), SMA
    /// for both sensors, the three accelerometer correlation pairs, and
    /// dominant frequency plus spectral energy of the acceleration
    /// magnitude, at the nominal 100 Hz rate.
    pub fn standard() -> Self {
        let mut kinds = Vec::with_capacity(25);
        for axis in Axis::ALL {
            kinds.push(FeatureKind::Mean(axis));
        }
        for axis in Axis::ALL {
            kinds.push(FeatureKind::StdDev(axis));
        }
        for axis in Axis::ALL {
            kinds.push(FeatureKind::Variance(axis));
        }
        kinds.push(FeatureKind::SignalMagnitudeArea(Sensor::Accelerometer));
        kinds.push(FeatureKind::SignalMagnitudeArea(Sensor::Gyroscope));
        kinds.push(FeatureKind::Correlation(Axis::AccX, Axis::AccY));
        kinds.push(FeatureKind::Correlation(Axis::AccX, Axis::AccZ));
        kinds.push(FeatureKind::Correlation(Axis::AccY, Axis::AccZ));
        kinds.push(FeatureKind::DominantFrequency(SpectralSource::AccMagnitude));
        kinds.push(FeatureKind::SpectralEnergy(SpectralSource::AccMagnitude));

        Self {
            kinds,
            sample_rate_hz: DEFAULT_SAMPLE_RATE_HZ,
        }
    }

    /// Number of dimensions the schema produces
    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    /// True when the schema has no kinds (unreachable via constructors)
    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }

    /// Ordered kind list
    pub fn kinds(&self) -> &[FeatureKind] {
        &self.kinds
    }

    /// Sample rate the spectral bins are mapped with
    pub fn sample_rate_hz(&self) -> f64 {
        self.sample_rate_hz
    }

    /// FNV-1a fingerprint of the kind list and sample rate
    pub fn fingerprint(&self) -> u64 {
        let mut hash = Fnv64::new();
        for kind in &self.kinds {
            for byte in kind.encode() {
                hash.write_u8(byte);
            }
        }
        for byte in self.sample_rate_hz.to_bits().to_le_bytes() {
            hash.write_u8(byte);
        }
        hash.finish()
    }

    /// Verify another schema is interchangeable with this one
    pub fn ensure_matches(&self, other: &FeatureSchema) -> ModelResult<()> {
        if self.len() != other.len() {
            return Err(ModelError::SchemaMismatch {
                expected: self.len(),
                actual: other.len(),
            });
        }
        if self.fingerprint() != other.fingerprint() {
            return Err(ModelError::SchemaFingerprint {
                expected: self.fingerprint(),
                actual: other.fingerprint(),
            });
        }
        Ok(())
    }

    /// Extract the feature vector of one window
    ///
    /// Pure function of the window contents: same samples, same vector.
    /// The window is used as given; length and timestamp validation is the
    /// segmentation caller's job (see [`crate::window::validate_window`]).
    pub fn extract(&self, window: &[ImuSample]) -> ModelResult<FeatureVector> {
        if window.is_empty() {
            return Err(ModelError::EmptySequence);
        }

        let series: [Vec<f64>; Axis::COUNT] = core::array::from_fn(|i| {
            let axis = Axis::ALL[i];
            window.iter().map(|s| s.axis(axis)).collect()
        });

        let spectra = self.compute_spectra(window, &series);

        let mut out = Vec::with_capacity(self.kinds.len());
        for kind in &self.kinds {
            let value = match *kind {
                FeatureKind::Mean(a) => stats::mean(&series[a as usize]),
                FeatureKind::StdDev(a) => stats::std_dev(&series[a as usize]),
                FeatureKind::Variance(a) => stats::variance(&series[a as usize]),
                FeatureKind::SignalMagnitudeArea(sensor) => {
                    let [a, b, c] = sensor.axes();
                    stats::signal_magnitude_area(
                        &series[a as usize],
                        &series[b as usize],
                        &series[c as usize],
                    )
                }
                FeatureKind::Correlation(a, b) => {
                    stats::correlation(&series[a as usize], &series[b as usize])
                }
                FeatureKind::DominantFrequency(src) => {
                    lookup_spectrum(&spectra, src).dominant_frequency()
                }
                FeatureKind::SpectralEnergy(src) => lookup_spectrum(&spectra, src).energy(),
            };
            out.push(value);
        }
        Ok(out)
    }

    /// Compute each distinct spectral source once
    fn compute_spectra(
        &self,
        window: &[ImuSample],
        series: &[Vec<f64>; Axis::COUNT],
    ) -> Vec<(SpectralSource, Spectrum)> {
        let mut spectra: Vec<(SpectralSource, Spectrum)> = Vec::new();
        for kind in &self.kinds {
            let source = match *kind {
                FeatureKind::DominantFrequency(src) | FeatureKind::SpectralEnergy(src) => src,
                _ => continue,
            };
            if spectra.iter().any(|(s, _)| *s == source) {
                continue;
            }
            let spectrum = match source {
                SpectralSource::AccMagnitude => {
                    let magnitude: Vec<f64> = window.iter().map(|s| s.acc_magnitude()).collect();
                    Spectrum::compute(&magnitude, self.sample_rate_hz)
                }
                SpectralSource::Axis(axis) => {
                    Spectrum::compute(&series[axis as usize], self.sample_rate_hz)
                }
            };
            spectra.push((source, spectrum));
        }
        spectra
    }
}

fn lookup_spectrum<'a>(
    spectra: &'a [(SpectralSource, Spectrum)],
    source: SpectralSource,
) -> &'a Spectrum {
    // compute_spectra covered every source referenced by the kind list.
    spectra
        .iter()
        .find(|(s, _)| *s == source)
        .map(|(_, spectrum)| spectrum)
        .unwrap_or_else(|| unreachable!())
}

/// FNV-1a, 64 bit
struct Fnv64 {
    state: u64,
}

impl Fnv64 {
    const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;

    fn new() -> Self {
        Self { state: Self::OFFSET }
    }

    fn write_u8(&mut self, byte: u8) {
        self.state ^= byte as u64;
        self.state = self.state.wrapping_mul(Self::PRIME);
    }

    fn finish(&self) -> u64 {
        self.state
    }
}
