//! JSON Evaluation Reports
//!
//! A report is a flattened, serializable view of one [`ConfusionMatrix`]:
//! overall accuracy, the raw counts, and per-activity sensitivity and
//! specificity. Undefined metrics stay `None` and serialize as `null`,
//! so a downstream consumer can tell "never occurred" apart from 0.0.
//!
//! Every activity appears in the report in index order whether or not it
//! occurred, which keeps the document shape identical across runs and
//! easy to diff.

use std::path::Path;

use serde::{Deserialize, Serialize};

use actigram_core::{Activity, ConfusionMatrix};

use crate::StorageResult;

/// Per-activity slice of an evaluation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityReport {
    /// Canonical activity name
    pub activity: String,
    /// Ground-truth windows for this activity
    pub support: u32,
    /// Windows decoded as this activity, regardless of truth
    pub predicted: u32,
    /// TP / (TP + FN); `None` when the activity never occurs
    pub sensitivity: Option<f64>,
    /// TN / (TN + FP); `None` when no negatives exist
    pub specificity: Option<f64>,
}

/// Serializable summary of one evaluation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationReport {
    /// Overall fraction of correctly decoded windows; 0.0 when empty
    pub accuracy: f64,
    /// Windows evaluated in total
    pub windows_evaluated: u64,
    /// Correctly decoded windows
    pub windows_correct: u64,
    /// Joint log-likelihood of the decoded path, when the caller has one
    pub log_likelihood: Option<f64>,
    /// Per-activity metrics, in activity index order
    pub activities: Vec<ActivityReport>,
    /// Raw confusion counts, `[actual][predicted]`
    pub confusion: Vec<Vec<u32>>,
}

impl EvaluationReport {
    /// Summarize a confusion matrix
    pub fn from_matrix(matrix: &ConfusionMatrix) -> Self {
        let activities = Activity::ALL
            .iter()
            .map(|&activity| ActivityReport {
                activity: activity.name().to_string(),
                support: matrix.support(activity),
                predicted: matrix.predicted_total(activity),
                sensitivity: matrix.sensitivity(activity),
                specificity: matrix.specificity(activity),
            })
            .collect();
        let confusion = matrix.counts().iter().map(|row| row.to_vec()).collect();

        Self {
            accuracy: matrix.accuracy(),
            windows_evaluated: matrix.total(),
            windows_correct: matrix.correct(),
            log_likelihood: None,
            activities,
            confusion,
        }
    }

    /// Attach the joint log-likelihood of the decoded path
    pub fn with_log_likelihood(mut self, log_likelihood: f64) -> Self {
        self.log_likelihood = Some(log_likelihood);
        self
    }

    /// Render as pretty-printed JSON
    pub fn to_json(&self) -> StorageResult<String> {
        let mut text = serde_json::to_string_pretty(self)?;
        text.push('\n');
        Ok(text)
    }

    /// Write the report as pretty-printed JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> StorageResult<()> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }
}
