//! Seeded data generators for synthetic recordings and models

use core::f64::consts::TAU;

use actigram_core::{
    features::{FeatureKind, FeatureSchema, FeatureVector},
    gaussian::{EmissionModel, GaussianParams},
    linalg::SquareMatrix,
    model::ActivityHmm,
    sample::{Axis, ImuSample},
    transition::{StateMatrix, StateVector},
    window::WindowConfig,
    Activity,
};

/// Deterministic random number generator for tests
pub struct TestRng {
    state: u32,
}

impl TestRng {
    pub fn new(seed: u32) -> Self {
        Self { state: seed }
    }

    pub fn next_u32(&mut self) -> u32 {
        // Xorshift algorithm
        self.state ^= self.state << 13;
        self.state ^= self.state >> 17;
        self.state ^= self.state << 5;
        self.state
    }

    pub fn next_f64(&mut self) -> f64 {
        (self.next_u32() >> 8) as f64 / 16777216.0
    }

    pub fn gen_range(&mut self, min: f64, max: f64) -> f64 {
        min + self.next_f64() * (max - min)
    }

    /// Standard Box-Muller normal sample
    pub fn normal(&mut self, mean: f64, std: f64) -> f64 {
        let mut u1 = self.next_f64();
        if u1 < f64::EPSILON {
            u1 = f64::EPSILON;
        }
        let u2 = self.next_f64();
        let radius = (-2.0 * u1.ln()).sqrt();
        mean + std * radius * (TAU * u2).cos()
    }
}

/// Per-activity signal signature at the nominal 100 Hz rate
struct SignalSpec {
    /// Oscillation amplitude on the acceleration axes (m/s²)
    amp: f64,
    /// Oscillation frequency (Hz)
    freq_hz: f64,
    /// Acceleration noise sigma (m/s²)
    noise: f64,
    /// Gyroscope oscillation amplitude (rad/s)
    gyro_amp: f64,
}

fn spec_for(activity: Activity) -> SignalSpec {
    match activity {
        // Postural sway only
        Activity::Standing => SignalSpec { amp: 0.0, freq_hz: 0.0, noise: 0.08, gyro_amp: 0.02 },
        // Gait cycle around 2 Hz
        Activity::Walking => SignalSpec { amp: 2.0, freq_hz: 2.0, noise: 0.3, gyro_amp: 1.0 },
        // Large vertical excursions near 3.3 Hz
        Activity::Jumping => SignalSpec { amp: 8.0, freq_hz: 3.3, noise: 0.8, gyro_amp: 2.5 },
        // Device at rest off the body
        Activity::Still => SignalSpec { amp: 0.0, freq_hz: 0.0, noise: 0.005, gyro_amp: 0.001 },
    }
}

/// Generate one labeled recording from consecutive activity blocks
///
/// `blocks` gives (activity, sample count) pairs; samples are spaced
/// 10 ms apart with strictly increasing timestamps. Gravity sits on the
/// z axis and each activity adds its oscillation plus Gaussian noise.
pub fn labeled_session(rng: &mut TestRng, blocks: &[(Activity, usize)]) -> Vec<ImuSample> {
    let mut samples = Vec::new();
    let mut index = 0usize;
    for &(activity, count) in blocks {
        let spec = spec_for(activity);
        for _ in 0..count {
            let time_s = index as f64 / 100.0;
            let phase = TAU * spec.freq_hz * time_s;
            let osc = spec.amp * phase.sin();

            let acc = [
                0.5 * osc + rng.normal(0.0, spec.noise),
                0.3 * spec.amp * (phase + 0.8).sin() + rng.normal(0.0, spec.noise),
                9.81 + osc + rng.normal(0.0, spec.noise),
            ];
            let gyr = [
                spec.gyro_amp * (phase + 0.3).sin() + rng.normal(0.0, spec.noise * 0.1),
                spec.gyro_amp * (phase + 1.1).sin() + rng.normal(0.0, spec.noise * 0.1),
                rng.normal(0.0, spec.noise * 0.1),
            ];

            samples.push(
                ImuSample::new(index as i64 * 10_000_000, acc, gyr).with_label(activity),
            );
            index += 1;
        }
    }
    samples
}

/// Sample one state from a categorical distribution by inverse CDF
pub fn sample_categorical(rng: &mut TestRng, p: &StateVector) -> Activity {
    let u = rng.next_f64();
    let mut cumulative = 0.0;
    for (i, &pi) in p.iter().enumerate() {
        cumulative += pi;
        if u < cumulative {
            return Activity::ALL[i];
        }
    }
    // Rounding residue: the draw falls on the last state.
    Activity::ALL[Activity::COUNT - 1]
}

/// Simulate a hidden-state path from explicit HMM parameters
pub fn simulate_path(
    rng: &mut TestRng,
    initial: &StateVector,
    transitions: &StateMatrix,
    len: usize,
) -> Vec<Activity> {
    let mut states = Vec::with_capacity(len);
    if len == 0 {
        return states;
    }
    let mut current = sample_categorical(rng, initial);
    states.push(current);
    for _ in 1..len {
        current = sample_categorical(rng, &transitions[current.index()]);
        states.push(current);
    }
    states
}

/// Emit one 1-D noisy observation per state in the path
pub fn emit(
    rng: &mut TestRng,
    path: &[Activity],
    means: &[f64; Activity::COUNT],
    std: f64,
) -> Vec<FeatureVector> {
    path.iter()
        .map(|s| vec![rng.normal(means[s.index()], std)])
        .collect()
}

/// Build a 1-D model with given state means, shared variance, and a
/// self-transition bias; off-diagonal mass is spread evenly
pub fn synthetic_model(
    initial: StateVector,
    means: [f64; Activity::COUNT],
    var: f64,
    self_bias: f64,
) -> ActivityHmm {
    let schema = FeatureSchema::new(vec![FeatureKind::Mean(Axis::AccX)], 100.0).unwrap();

    let states: Vec<GaussianParams> = means
        .iter()
        .map(|&m| {
            GaussianParams::from_moments(
                vec![m],
                SquareMatrix::from_row_major(1, &[var]).unwrap(),
                1e-6,
            )
            .unwrap()
        })
        .collect();
    let emissions = EmissionModel::from_states(states).unwrap();

    let off = (1.0 - self_bias) / (Activity::COUNT - 1) as f64;
    let mut transitions = [[off; Activity::COUNT]; Activity::COUNT];
    for (i, row) in transitions.iter_mut().enumerate() {
        row[i] = self_bias;
    }

    ActivityHmm::from_parts(initial, transitions, emissions, schema, WindowConfig::default())
        .unwrap()
}
