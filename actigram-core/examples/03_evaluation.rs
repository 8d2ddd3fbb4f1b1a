//! Evaluation Example
//!
//! This example demonstrates how to score a trained model against a
//! held-out labeled recording: build the confusion matrix, then read
//! accuracy, per-activity sensitivity, and per-activity specificity
//! from it.
//!
//! ## What You'll Learn
//!
//! - Deriving window-level ground truth from a labeled recording
//! - Accumulating a confusion matrix from (actual, predicted) pairs
//! - What sensitivity and specificity say that accuracy does not
//!
//! ## Running the Example
//!
//! ```bash
//! cargo run --example 03_evaluation
//! ```

use actigram_core::{
    classify, window::labeled_windows, Activity, ActivityHmm, ConfusionMatrix, ImuSample,
    InitialEstimate, TrainingConfig,
};

/// Tiny deterministic generator so the output is identical on every run.
struct Noise(u32);

impl Noise {
    fn next(&mut self, scale: f64) -> f64 {
        self.0 ^= self.0 << 13;
        self.0 ^= self.0 >> 17;
        self.0 ^= self.0 << 5;
        ((self.0 >> 8) as f64 / 16777216.0 - 0.5) * scale
    }
}

/// Amplitude, frequency, and noise level for one activity.
fn signature(activity: Activity) -> (f64, f64, f64) {
    match activity {
        Activity::Standing => (0.0, 0.0, 0.15),
        Activity::Walking => (2.0, 2.0, 0.5),
        Activity::Jumping => (8.0, 3.3, 1.4),
        Activity::Still => (0.0, 0.0, 0.01),
    }
}

/// One labeled 100 Hz recording built from consecutive activity blocks.
fn session(noise: &mut Noise, blocks: &[(Activity, usize)]) -> Vec<ImuSample> {
    let mut samples = Vec::new();
    let mut index = 0usize;
    for &(activity, count) in blocks {
        let (amp, freq, sigma) = signature(activity);
        for _ in 0..count {
            let phase = core::f64::consts::TAU * freq * index as f64 / 100.0;
            let osc = amp * phase.sin();
            let sample = ImuSample::new(
                index as i64 * 10_000_000,
                [
                    0.5 * osc + noise.next(sigma),
                    0.3 * amp * (phase + 0.8).sin() + noise.next(sigma),
                    9.81 + osc + noise.next(sigma),
                ],
                [
                    0.4 * osc + noise.next(sigma * 0.2),
                    0.3 * osc + noise.next(sigma * 0.2),
                    noise.next(sigma * 0.2),
                ],
            );
            samples.push(sample.with_label(activity));
            index += 1;
        }
    }
    samples
}

fn metric(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.3}", v),
        None => "n/a".to_string(),
    }
}

fn main() {
    println!("Actigram Evaluation Example");
    println!("===========================\n");

    let cycle = [
        (Activity::Standing, 2000),
        (Activity::Walking, 2000),
        (Activity::Jumping, 2000),
        (Activity::Still, 2000),
    ];
    let mut noise = Noise(0xCAFE);
    let sessions: Vec<Vec<ImuSample>> = (0..3).map(|_| session(&mut noise, &cycle)).collect();
    let borrowed: Vec<&[ImuSample]> = sessions.iter().map(|s| s.as_slice()).collect();

    let config = TrainingConfig::default().with_initial_estimate(InitialEstimate::Uniform);
    let model = ActivityHmm::fit(&config, &borrowed).unwrap();

    // Held-out recording with a different activity mix. Ground truth is
    // the majority label of each window, taken through the same
    // segmentation the classifier uses so the sequences stay aligned.
    let held_out = session(
        &mut noise,
        &[
            (Activity::Still, 1800),
            (Activity::Walking, 2400),
            (Activity::Standing, 1200),
            (Activity::Jumping, 600),
        ],
    );
    let window = model.window();
    let truth: Vec<Activity> = labeled_windows(&held_out, &window)
        .filter_map(|(_, label)| label)
        .collect();

    let decoding = classify(&model, &held_out).unwrap();
    let matrix = ConfusionMatrix::from_pairs(&truth, &decoding.states).unwrap();

    println!("Confusion matrix ({} windows, rows = actual):", matrix.total());
    print!("{:<10}", "");
    for predicted in Activity::ALL {
        print!(" {:>9}", predicted);
    }
    println!();
    for actual in Activity::ALL {
        print!("{:<10}", actual);
        for predicted in Activity::ALL {
            print!(" {:>9}", matrix.count(actual, predicted));
        }
        println!();
    }

    println!("\nOverall accuracy: {:.3}\n", matrix.accuracy());

    println!(
        "{:<10} {:>8} {:>12} {:>12}",
        "Activity", "Support", "Sensitivity", "Specificity"
    );
    println!("{}", "-".repeat(46));
    for activity in Activity::ALL {
        println!(
            "{:<10} {:>8} {:>12} {:>12}",
            activity,
            matrix.support(activity),
            metric(matrix.sensitivity(activity)),
            metric(matrix.specificity(activity)),
        );
    }

    println!("\n{}", "=".repeat(60));
    println!("Key Insights:");
    println!("- Sensitivity is per-activity recall over its true windows");
    println!("- Specificity measures how rarely other activities alias into it");
    println!("- An activity absent from the recording reports n/a, not 0");
}
