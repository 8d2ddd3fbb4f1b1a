//! Trained Activity Model
//!
//! ## Overview
//!
//! [`ActivityHmm`] bundles everything decoding needs: the initial state
//! distribution, the row-stochastic transition matrix, the per-state
//! Gaussian emissions, and the feature schema plus window configuration
//! they were trained with. The bundle is immutable once built: `decode`
//! takes `&self`, never mutates parameters, and is safe to call from any
//! number of threads against one shared model.
//!
//! ## Construction paths
//!
//! - [`ActivityHmm::fit`]: the full path, from raw labeled recordings
//!   through windowing and feature extraction.
//! - [`ActivityHmm::fit_features`]: from already-extracted labeled
//!   feature sequences, when windowing happened elsewhere.
//! - [`ActivityHmm::from_parts`]: from explicit parameters, re-validating
//!   everything. This is the only way external parameter storage gets
//!   back into a usable model, so nothing unverified can be decoded
//!   against.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use actigram_core::model::{ActivityHmm, TrainingConfig};
//! use actigram_core::sample::ImuSample;
//!
//! fn run(sessions: &[&[ImuSample]], fresh: &[ImuSample]) {
//!     let config = TrainingConfig::default();
//!     let model = ActivityHmm::fit(&config, sessions).unwrap();
//!     let decoding = actigram_core::pipeline::classify(&model, fresh).unwrap();
//!     for state in &decoding.states {
//!         // One predicted activity per surviving window
//!         let _ = state;
//!     }
//! }
//! ```

extern crate alloc;

use alloc::vec::Vec;

use crate::{
    activity::Activity,
    constants::DEFAULT_REGULARIZATION,
    errors::{ModelError, ModelResult},
    features::{FeatureSchema, FeatureVector},
    gaussian::EmissionModel,
    pipeline::FeaturePipeline,
    sample::ImuSample,
    transition::{self, InitialEstimate, StateMatrix, StateVector, UnseenStatePolicy},
    viterbi::{self, Decoding},
    window::WindowConfig,
};

/// Everything training needs to know, with explicit defaults
///
/// No parameter here is baked into the algorithms: window geometry,
/// feature schema, regularization strength, and both estimation policies
/// are all visible and overridable at the call site.
#[derive(Debug, Clone)]
pub struct TrainingConfig {
    /// Window geometry and label tie-break policy
    pub window: WindowConfig,
    /// Feature schema shared by training and decoding
    pub schema: FeatureSchema,
    /// Base jitter scale for singular-covariance recovery
    pub regularization: f64,
    /// Fallback for states never observed as a transition source
    pub unseen: UnseenStatePolicy,
    /// Initial-distribution estimation policy
    pub initial: InitialEstimate,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            window: WindowConfig::default(),
            schema: FeatureSchema::standard(),
            regularization: DEFAULT_REGULARIZATION,
            unseen: UnseenStatePolicy::default(),
            initial: InitialEstimate::default(),
        }
    }
}

impl TrainingConfig {
    /// Set the window configuration
    pub fn with_window(mut self, window: WindowConfig) -> Self {
        self.window = window;
        self
    }

    /// Set the feature schema
    pub fn with_schema(mut self, schema: FeatureSchema) -> Self {
        self.schema = schema;
        self
    }

    /// Set the covariance regularization scale
    pub fn with_regularization(mut self, regularization: f64) -> Self {
        self.regularization = regularization;
        self
    }

    /// Set the unseen-source-state policy
    pub fn with_unseen_policy(mut self, unseen: UnseenStatePolicy) -> Self {
        self.unseen = unseen;
        self
    }

    /// Set the initial-distribution estimation policy
    pub fn with_initial_estimate(mut self, initial: InitialEstimate) -> Self {
        self.initial = initial;
        self
    }

    /// Check the configuration is usable for training
    pub fn validate(&self) -> ModelResult<()> {
        self.window.validate()?;
        if self.schema.is_empty() {
            return Err(ModelError::InvalidConfig {
                reason: "feature schema is empty",
            });
        }
        if !(self.regularization > 0.0) || !self.regularization.is_finite() {
            return Err(ModelError::InvalidConfig {
                reason: "regularization must be positive and finite",
            });
        }
        Ok(())
    }
}

/// Immutable trained model: HMM parameters plus their feature schema
#[derive(Debug, Clone)]
pub struct ActivityHmm {
    initial: StateVector,
    transitions: StateMatrix,
    emissions: EmissionModel,
    schema: FeatureSchema,
    window: WindowConfig,
}

impl ActivityHmm {
    /// Train from raw labeled recordings
    ///
    /// Each session is windowed and extracted independently; transition
    /// counting never crosses a session boundary. Dropped windows are
    /// warned about in aggregate.
    pub fn fit(config: &TrainingConfig, sessions: &[&[ImuSample]]) -> ModelResult<Self> {
        config.validate()?;
        let mut pipeline = FeaturePipeline::new(config.window, config.schema.clone())?;
        let mut sequences = Vec::new();
        for session in sessions {
            sequences.extend(pipeline.extract_labeled(session)?);
        }
        let stats = pipeline.stats();
        if stats.dropped() > 0 {
            log_warn!(
                "training dropped {} of {} windows ({} invalid, {} unlabeled)",
                stats.dropped(),
                stats.windows_seen,
                stats.dropped_invalid,
                stats.dropped_unlabeled
            );
        }
        Self::fit_features(config, &sequences)
    }

    /// Train from already-extracted labeled feature sequences
    ///
    /// Each inner sequence is one contiguous run of windows; transitions
    /// are counted within sequences only. Every vector must match the
    /// configured schema dimension.
    pub fn fit_features(
        config: &TrainingConfig,
        sequences: &[Vec<(FeatureVector, Activity)>],
    ) -> ModelResult<Self> {
        config.validate()?;
        let dim = config.schema.len();

        let mut by_state: [Vec<FeatureVector>; Activity::COUNT] = Default::default();
        let mut labels: Vec<Vec<Activity>> = Vec::with_capacity(sequences.len());
        for sequence in sequences {
            let mut sequence_labels = Vec::with_capacity(sequence.len());
            for (vector, activity) in sequence {
                if vector.len() != dim {
                    return Err(ModelError::SchemaMismatch {
                        expected: dim,
                        actual: vector.len(),
                    });
                }
                by_state[activity.index()].push(vector.clone());
                sequence_labels.push(*activity);
            }
            labels.push(sequence_labels);
        }

        let label_refs: Vec<&[Activity]> = labels.iter().map(|s| s.as_slice()).collect();
        let estimate = transition::fit(&label_refs, config.unseen, config.initial)?;
        let emissions = EmissionModel::fit(&by_state, config.regularization)?;

        Self::from_parts(
            estimate.initial,
            estimate.matrix,
            emissions,
            config.schema.clone(),
            config.window,
        )
    }

    /// Assemble a model from explicit parts, validating all of them
    pub fn from_parts(
        initial: StateVector,
        transitions: StateMatrix,
        emissions: EmissionModel,
        schema: FeatureSchema,
        window: WindowConfig,
    ) -> ModelResult<Self> {
        window.validate()?;
        transition::ensure_distribution(&initial)?;
        transition::ensure_row_stochastic(&transitions)?;
        if emissions.dim() != schema.len() {
            return Err(ModelError::SchemaMismatch {
                expected: schema.len(),
                actual: emissions.dim(),
            });
        }
        Ok(Self {
            initial,
            transitions,
            emissions,
            schema,
            window,
        })
    }

    /// Decode the most likely activity per observation
    ///
    /// Every observation must match the trained feature dimension; a
    /// mismatch aborts the whole call before any decoding happens.
    pub fn decode(&self, observations: &[FeatureVector]) -> ModelResult<Decoding> {
        let dim = self.schema.len();
        for obs in observations {
            if obs.len() != dim {
                return Err(ModelError::SchemaMismatch {
                    expected: dim,
                    actual: obs.len(),
                });
            }
        }
        viterbi::decode(&self.initial, &self.transitions, &self.emissions, observations)
    }

    /// Initial state distribution
    pub fn initial(&self) -> &StateVector {
        &self.initial
    }

    /// Row-stochastic transition matrix
    pub fn transitions(&self) -> &StateMatrix {
        &self.transitions
    }

    /// Per-state Gaussian emissions
    pub fn emissions(&self) -> &EmissionModel {
        &self.emissions
    }

    /// Feature schema the model was trained with
    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    /// Window configuration the model was trained with
    pub fn window(&self) -> WindowConfig {
        self.window
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::*;
    use crate::features::FeatureKind;
    use crate::sample::Axis;
    use Activity::{Jumping, Standing, Still, Walking};

    fn config_1d() -> TrainingConfig {
        TrainingConfig::default()
            .with_schema(FeatureSchema::new(vec![FeatureKind::Mean(Axis::AccX)], 100.0).unwrap())
            .with_window(WindowConfig::default().with_len(4).with_stride(4))
    }

    fn vector_for(activity: Activity) -> FeatureVector {
        vec![activity.index() as f64 + 1.0]
    }

    #[test]
    fn model_recovers_its_training_sequence() {
        let labels = [
            Standing, Standing, Walking, Walking, Walking,
            Jumping, Jumping, Still, Still, Standing,
        ];
        let sequence: Vec<(FeatureVector, Activity)> =
            labels.iter().map(|&a| (vector_for(a), a)).collect();

        let model = ActivityHmm::fit_features(&config_1d(), &[sequence.clone()]).unwrap();

        let observations: Vec<FeatureVector> =
            sequence.iter().map(|(v, _)| v.clone()).collect();
        let decoding = model.decode(&observations).unwrap();
        assert_eq!(decoding.states, labels);
        assert!(!decoding.log_likelihood.is_nan());

        // Single sequence: the initial distribution is the label frequency.
        assert!((model.initial()[Standing.index()] - 0.3).abs() < 1e-12);
        assert!((model.initial()[Jumping.index()] - 0.2).abs() < 1e-12);
    }

    #[test]
    fn fit_from_raw_sessions_roundtrips() {
        let mut samples = Vec::new();
        let blocks = [Standing, Walking, Jumping, Still];
        for (b, &activity) in blocks.iter().enumerate() {
            for i in 0..8 {
                let t = (b * 8 + i) as i64 * 10_000_000;
                let value = activity.index() as f64 + 1.0;
                samples.push(
                    ImuSample::new(t, [value, 0.0, 0.0], [0.0; 3]).with_label(activity),
                );
            }
        }

        let config = config_1d();
        let model = ActivityHmm::fit(&config, &[&samples]).unwrap();
        let decoding = crate::pipeline::classify(&model, &samples).unwrap();

        // Two windows per block, in block order.
        assert_eq!(
            decoding.states,
            vec![
                Standing, Standing, Walking, Walking,
                Jumping, Jumping, Still, Still,
            ]
        );
    }

    #[test]
    fn decode_rejects_wrong_dimension() {
        let sequence: Vec<(FeatureVector, Activity)> = [Standing, Walking, Jumping, Still]
            .iter()
            .flat_map(|&a| [(vector_for(a), a), (vector_for(a), a)])
            .collect();
        let model = ActivityHmm::fit_features(&config_1d(), &[sequence]).unwrap();

        let err = model.decode(&[vec![1.0, 2.0]]).unwrap_err();
        assert_eq!(err, ModelError::SchemaMismatch { expected: 1, actual: 2 });
    }

    #[test]
    fn fit_features_rejects_wrong_dimension() {
        let sequence = vec![(vec![1.0, 2.0], Standing)];
        let err = ActivityHmm::fit_features(&config_1d(), &[sequence]).unwrap_err();
        assert_eq!(err, ModelError::SchemaMismatch { expected: 1, actual: 2 });
    }

    #[test]
    fn from_parts_validates_everything() {
        let sequence: Vec<(FeatureVector, Activity)> = [Standing, Walking, Jumping, Still]
            .iter()
            .flat_map(|&a| [(vector_for(a), a), (vector_for(a), a)])
            .collect();
        let model = ActivityHmm::fit_features(&config_1d(), &[sequence]).unwrap();
        let emissions = model.emissions().clone();
        let schema = model.schema().clone();
        let window = model.window();

        let bad_initial = [0.5, 0.5, 0.5, 0.5];
        assert_eq!(
            ActivityHmm::from_parts(
                bad_initial,
                *model.transitions(),
                emissions.clone(),
                schema.clone(),
                window,
            )
            .unwrap_err(),
            ModelError::InvalidInitialDistribution
        );

        let mut bad_rows = *model.transitions();
        bad_rows[1][0] += 0.25;
        assert_eq!(
            ActivityHmm::from_parts(
                *model.initial(),
                bad_rows,
                emissions.clone(),
                schema.clone(),
                window,
            )
            .unwrap_err(),
            ModelError::NotRowStochastic { row: 1 }
        );

        let wide_schema = FeatureSchema::new(
            vec![FeatureKind::Mean(Axis::AccX), FeatureKind::Mean(Axis::AccY)],
            100.0,
        )
        .unwrap();
        assert_eq!(
            ActivityHmm::from_parts(
                *model.initial(),
                *model.transitions(),
                emissions,
                wide_schema,
                window,
            )
            .unwrap_err(),
            ModelError::SchemaMismatch { expected: 2, actual: 1 }
        );
    }

    #[test]
    fn config_defaults_and_validation() {
        let config = TrainingConfig::default();
        assert_eq!(config.window.len, 200);
        assert_eq!(config.window.stride, 100);
        assert_eq!(config.schema.len(), 25);
        assert!(config.validate().is_ok());

        assert!(TrainingConfig::default()
            .with_regularization(0.0)
            .validate()
            .is_err());
        assert!(TrainingConfig::default()
            .with_window(WindowConfig::default().with_stride(0))
            .validate()
            .is_err());
    }

    #[test]
    fn model_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ActivityHmm>();
    }
}
