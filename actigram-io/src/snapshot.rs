//! Versioned JSON Model Snapshots
//!
//! A snapshot captures everything a trained [`ActivityHmm`] needs to be
//! rebuilt: the feature schema (with its fingerprint), the window
//! configuration, the initial distribution, the transition matrix, and
//! per-state Gaussian moments. The format is self-describing JSON so a
//! snapshot can be inspected and diffed by hand:
//!
//! ```text
//! {
//!   "version": 1,
//!   "schema": { "sample_rate_hz": 100.0, "fingerprint": ..., "kinds": [...] },
//!   "window": { "len": 200, "stride": 100, "tie_break": "enum_order" },
//!   "initial": [...],
//!   "transitions": [[...], ...],
//!   "states": [ { "activity": "standing", "mean": [...], ... }, ... ]
//! }
//! ```
//!
//! Loading never trusts the file: the schema fingerprint is recomputed
//! and compared against the stored one, state entries must appear in
//! canonical index order, and every covariance goes back through the
//! model's own factorization before it can be decoded against. The
//! per-state `regularized` flag records whether the training fit needed
//! diagonal jitter; it is informational on load, since the stored
//! covariance already includes any jitter that was applied.
//!
//! Floats are written with enough digits to reparse to the same bits, so
//! a save/load cycle changes no decoded output.

use std::path::Path;

use serde::{Deserialize, Serialize};

use actigram_core::{
    constants::DEFAULT_REGULARIZATION,
    linalg::SquareMatrix,
    Activity, ActivityHmm, Axis, EmissionModel, FeatureKind, FeatureSchema, GaussianParams,
    Sensor, SpectralSource, StateMatrix, StateVector, TieBreak, WindowConfig,
};

use crate::{StorageError, StorageResult};

/// Format version written into every snapshot
pub const SNAPSHOT_VERSION: u32 = 1;

/// Serialized form of a trained model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelSnapshot {
    /// Format version, checked before anything else
    pub version: u32,
    /// Feature schema the model was trained with
    pub schema: SchemaSnapshot,
    /// Window segmentation parameters
    pub window: WindowSnapshot,
    /// Initial state distribution, in activity index order
    pub initial: Vec<f64>,
    /// Row-stochastic transition matrix, `[actual][next]`
    pub transitions: Vec<Vec<f64>>,
    /// Per-state Gaussian moments, in activity index order
    pub states: Vec<StateSnapshot>,
}

/// Serialized feature schema
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaSnapshot {
    /// Sample rate the spectral bins are mapped with (Hz)
    pub sample_rate_hz: f64,
    /// Fingerprint the schema had when the snapshot was written
    pub fingerprint: u64,
    /// Ordered kind list
    pub kinds: Vec<KindSnapshot>,
}

/// Serialized window configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WindowSnapshot {
    /// Samples per window
    pub len: usize,
    /// Samples between consecutive window starts
    pub stride: usize,
    /// Majority-vote tie policy: `"enum_order"` or `"first_observed"`
    pub tie_break: String,
}

/// Serialized Gaussian moments of one state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateSnapshot {
    /// Canonical activity name; entries must follow index order
    pub activity: String,
    /// Mean vector in schema order
    pub mean: Vec<f64>,
    /// Covariance in row-major order, `mean.len()²` values
    pub covariance: Vec<f64>,
    /// Whether the training fit needed diagonal jitter
    pub regularized: bool,
}

/// Serialized feature kind, tagged by variant
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum KindSnapshot {
    /// Arithmetic mean of one axis
    Mean {
        /// Axis column name
        axis: String,
    },
    /// Sample standard deviation of one axis
    StdDev {
        /// Axis column name
        axis: String,
    },
    /// Unbiased sample variance of one axis
    Variance {
        /// Axis column name
        axis: String,
    },
    /// Signal Magnitude Area over one sensor
    SignalMagnitudeArea {
        /// Sensor short name, `"acc"` or `"gyr"`
        sensor: String,
    },
    /// Pearson correlation between two axes
    Correlation {
        /// First axis column name
        first: String,
        /// Second axis column name
        second: String,
    },
    /// Dominant non-DC frequency of one series
    DominantFrequency {
        /// `"acc_mag"` or an axis column name
        source: String,
    },
    /// Non-DC spectral energy of one series
    SpectralEnergy {
        /// `"acc_mag"` or an axis column name
        source: String,
    },
}

impl KindSnapshot {
    fn from_kind(kind: FeatureKind) -> Self {
        match kind {
            FeatureKind::Mean(a) => KindSnapshot::Mean { axis: a.name().to_string() },
            FeatureKind::StdDev(a) => KindSnapshot::StdDev { axis: a.name().to_string() },
            FeatureKind::Variance(a) => KindSnapshot::Variance { axis: a.name().to_string() },
            FeatureKind::SignalMagnitudeArea(s) => {
                KindSnapshot::SignalMagnitudeArea { sensor: s.name().to_string() }
            }
            FeatureKind::Correlation(a, b) => KindSnapshot::Correlation {
                first: a.name().to_string(),
                second: b.name().to_string(),
            },
            FeatureKind::DominantFrequency(src) => {
                KindSnapshot::DominantFrequency { source: source_name(src) }
            }
            FeatureKind::SpectralEnergy(src) => {
                KindSnapshot::SpectralEnergy { source: source_name(src) }
            }
        }
    }

    fn to_kind(&self) -> StorageResult<FeatureKind> {
        Ok(match self {
            KindSnapshot::Mean { axis } => FeatureKind::Mean(axis_by_name(axis)?),
            KindSnapshot::StdDev { axis } => FeatureKind::StdDev(axis_by_name(axis)?),
            KindSnapshot::Variance { axis } => FeatureKind::Variance(axis_by_name(axis)?),
            KindSnapshot::SignalMagnitudeArea { sensor } => {
                FeatureKind::SignalMagnitudeArea(sensor_by_name(sensor)?)
            }
            KindSnapshot::Correlation { first, second } => {
                FeatureKind::Correlation(axis_by_name(first)?, axis_by_name(second)?)
            }
            KindSnapshot::DominantFrequency { source } => {
                FeatureKind::DominantFrequency(source_by_name(source)?)
            }
            KindSnapshot::SpectralEnergy { source } => {
                FeatureKind::SpectralEnergy(source_by_name(source)?)
            }
        })
    }
}

fn source_name(source: SpectralSource) -> String {
    match source {
        SpectralSource::AccMagnitude => "acc_mag".to_string(),
        SpectralSource::Axis(axis) => axis.name().to_string(),
    }
}

fn axis_by_name(name: &str) -> StorageResult<Axis> {
    Axis::ALL
        .iter()
        .copied()
        .find(|a| a.name() == name)
        .ok_or_else(|| StorageError::SnapshotField(format!("unknown axis name: {name}")))
}

fn sensor_by_name(name: &str) -> StorageResult<Sensor> {
    match name {
        "acc" => Ok(Sensor::Accelerometer),
        "gyr" => Ok(Sensor::Gyroscope),
        other => Err(StorageError::SnapshotField(format!("unknown sensor name: {other}"))),
    }
}

fn source_by_name(name: &str) -> StorageResult<SpectralSource> {
    if name == "acc_mag" {
        return Ok(SpectralSource::AccMagnitude);
    }
    Ok(SpectralSource::Axis(axis_by_name(name)?))
}

fn tie_break_name(tie_break: TieBreak) -> &'static str {
    match tie_break {
        TieBreak::EnumOrder => "enum_order",
        TieBreak::FirstObserved => "first_observed",
    }
}

fn tie_break_by_name(name: &str) -> StorageResult<TieBreak> {
    match name {
        "enum_order" => Ok(TieBreak::EnumOrder),
        "first_observed" => Ok(TieBreak::FirstObserved),
        other => Err(StorageError::SnapshotField(format!("unknown tie-break policy: {other}"))),
    }
}

impl ModelSnapshot {
    /// Capture a trained model
    pub fn from_model(model: &ActivityHmm) -> Self {
        let schema = model.schema();
        let window = model.window();
        let states = Activity::ALL
            .iter()
            .map(|&activity| {
                let params = model.emissions().params(activity);
                StateSnapshot {
                    activity: activity.name().to_string(),
                    mean: params.mean().to_vec(),
                    covariance: params.covariance().as_slice().to_vec(),
                    regularized: params.regularized(),
                }
            })
            .collect();

        Self {
            version: SNAPSHOT_VERSION,
            schema: SchemaSnapshot {
                sample_rate_hz: schema.sample_rate_hz(),
                fingerprint: schema.fingerprint(),
                kinds: schema.kinds().iter().copied().map(KindSnapshot::from_kind).collect(),
            },
            window: WindowSnapshot {
                len: window.len,
                stride: window.stride,
                tie_break: tie_break_name(window.tie_break).to_string(),
            },
            initial: model.initial().to_vec(),
            transitions: model.transitions().iter().map(|row| row.to_vec()).collect(),
            states,
        }
    }

    /// Rebuild the model, re-validating every component
    pub fn into_model(self) -> StorageResult<ActivityHmm> {
        if self.version != SNAPSHOT_VERSION {
            return Err(StorageError::SnapshotVersion {
                expected: SNAPSHOT_VERSION,
                actual: self.version,
            });
        }

        let kinds = self
            .schema
            .kinds
            .iter()
            .map(KindSnapshot::to_kind)
            .collect::<StorageResult<Vec<_>>>()?;
        let schema = FeatureSchema::new(kinds, self.schema.sample_rate_hz)?;
        if schema.fingerprint() != self.schema.fingerprint {
            return Err(StorageError::SnapshotField(format!(
                "schema fingerprint mismatch: stored {:#018x}, rebuilt {:#018x}",
                self.schema.fingerprint,
                schema.fingerprint()
            )));
        }

        let window = WindowConfig::default()
            .with_len(self.window.len)
            .with_stride(self.window.stride)
            .with_tie_break(tie_break_by_name(&self.window.tie_break)?);

        if self.initial.len() != Activity::COUNT {
            return Err(StorageError::SnapshotField(format!(
                "initial distribution must have {} entries, found {}",
                Activity::COUNT,
                self.initial.len()
            )));
        }
        let mut initial: StateVector = [0.0; Activity::COUNT];
        initial.copy_from_slice(&self.initial);

        if self.transitions.len() != Activity::COUNT {
            return Err(StorageError::SnapshotField(format!(
                "transition matrix must have {} rows, found {}",
                Activity::COUNT,
                self.transitions.len()
            )));
        }
        let mut transitions: StateMatrix = [[0.0; Activity::COUNT]; Activity::COUNT];
        for (i, row) in self.transitions.iter().enumerate() {
            if row.len() != Activity::COUNT {
                return Err(StorageError::SnapshotField(format!(
                    "transition row {} must have {} entries, found {}",
                    i,
                    Activity::COUNT,
                    row.len()
                )));
            }
            transitions[i].copy_from_slice(row);
        }

        if self.states.len() != Activity::COUNT {
            return Err(StorageError::SnapshotField(format!(
                "snapshot must hold {} states, found {}",
                Activity::COUNT,
                self.states.len()
            )));
        }
        let mut params = Vec::with_capacity(Activity::COUNT);
        for (i, state) in self.states.into_iter().enumerate() {
            let expected = Activity::ALL[i];
            match Activity::from_label(&state.activity) {
                Some(found) if found == expected => {}
                Some(found) => {
                    return Err(StorageError::SnapshotField(format!(
                        "state {} out of order: expected {}, found {}",
                        i,
                        expected.name(),
                        found.name()
                    )))
                }
                None => {
                    return Err(StorageError::SnapshotField(format!(
                        "unknown activity name: {}",
                        state.activity
                    )))
                }
            }
            let dim = state.mean.len();
            let covariance = SquareMatrix::from_row_major(dim, &state.covariance).ok_or_else(
                || {
                    StorageError::SnapshotField(format!(
                        "state {} covariance must hold {} values, found {}",
                        expected.name(),
                        dim * dim,
                        state.covariance.len()
                    ))
                },
            )?;
            params.push(GaussianParams::from_moments(
                state.mean,
                covariance,
                DEFAULT_REGULARIZATION,
            )?);
        }
        let emissions = EmissionModel::from_states(params)?;

        Ok(ActivityHmm::from_parts(initial, transitions, emissions, schema, window)?)
    }
}

/// Write a model snapshot as pretty-printed JSON
pub fn save_model<P: AsRef<Path>>(path: P, model: &ActivityHmm) -> StorageResult<()> {
    let snapshot = ModelSnapshot::from_model(model);
    let mut text = serde_json::to_string_pretty(&snapshot)?;
    text.push('\n');
    std::fs::write(path, text)?;
    Ok(())
}

/// Load and re-validate a model snapshot
///
/// The version field is checked before the rest of the document is
/// decoded, so an old reader confronted with a newer snapshot reports a
/// version mismatch rather than a shape error.
pub fn load_model<P: AsRef<Path>>(path: P) -> StorageResult<ActivityHmm> {
    let text = std::fs::read_to_string(path)?;
    let value: serde_json::Value = serde_json::from_str(&text)?;
    match value.get("version").and_then(|v| v.as_u64()) {
        Some(v) if v == SNAPSHOT_VERSION as u64 => {}
        Some(v) => {
            return Err(StorageError::SnapshotVersion {
                expected: SNAPSHOT_VERSION,
                actual: u32::try_from(v).unwrap_or(u32::MAX),
            })
        }
        None => {
            return Err(StorageError::SnapshotField("missing version field".to_string()))
        }
    }
    let snapshot: ModelSnapshot = serde_json::from_value(value)?;
    snapshot.into_model()
}
