//! Overlapping Window Segmentation
//!
//! Slices one continuous recording into fixed-length windows with a
//! configurable stride:
//!
//! ```text
//! samples:  |0...............................................|
//! window 0: [===== 200 =====]
//! window 1:          [===== 200 =====]        stride = 100
//! window 2:                   [===== 200 =====]
//! ```
//!
//! The iterator is a pure view over the input slice: no copying, finite,
//! restartable by calling [`windows`] again. A trailing partial window is
//! dropped, never zero-padded, because padding would bias the spectral
//! features computed downstream.
//!
//! Windows are emitted leniently: a window that spans an activity boundary
//! or contains out-of-order timestamps still comes out with its majority
//! label. Callers that are about to decode invoke [`validate_window`] and
//! drop what it rejects.

use crate::{
    activity::Activity,
    constants::{DEFAULT_WINDOW_LEN, DEFAULT_WINDOW_STRIDE},
    errors::{ModelError, ModelResult},
    sample::ImuSample,
};

/// Policy for breaking majority-vote ties between equally frequent labels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TieBreak {
    /// Lowest state index among the tied labels
    #[default]
    EnumOrder,
    /// Tied label whose first sample appears earliest in the window
    FirstObserved,
}

/// Window segmentation parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowConfig {
    /// Samples per window
    pub len: usize,
    /// Samples between consecutive window starts
    pub stride: usize,
    /// Majority-vote tie policy
    pub tie_break: TieBreak,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            len: DEFAULT_WINDOW_LEN,
            stride: DEFAULT_WINDOW_STRIDE,
            tie_break: TieBreak::default(),
        }
    }
}

impl WindowConfig {
    /// Set the window length in samples
    pub fn with_len(mut self, len: usize) -> Self {
        self.len = len;
        self
    }

    /// Set the stride in samples
    pub fn with_stride(mut self, stride: usize) -> Self {
        self.stride = stride;
        self
    }

    /// Set the majority-vote tie policy
    pub fn with_tie_break(mut self, tie_break: TieBreak) -> Self {
        self.tie_break = tie_break;
        self
    }

    /// Reject zero-length windows and zero strides
    pub fn validate(&self) -> ModelResult<()> {
        if self.len == 0 {
            return Err(ModelError::InvalidConfig { reason: "window length is zero" });
        }
        if self.stride == 0 {
            return Err(ModelError::InvalidConfig { reason: "window stride is zero" });
        }
        Ok(())
    }
}

/// Iterator over fixed-length overlapping windows of one recording
pub struct Windows<'a> {
    samples: &'a [ImuSample],
    len: usize,
    stride: usize,
    start: usize,
}

impl<'a> Iterator for Windows<'a> {
    type Item = &'a [ImuSample];

    fn next(&mut self) -> Option<Self::Item> {
        if self.len == 0 || self.stride == 0 {
            return None;
        }
        let end = self.start.checked_add(self.len)?;
        if end > self.samples.len() {
            return None;
        }
        let window = &self.samples[self.start..end];
        self.start += self.stride;
        Some(window)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.remaining();
        (n, Some(n))
    }
}

impl<'a> ExactSizeIterator for Windows<'a> {}

impl<'a> Windows<'a> {
    fn remaining(&self) -> usize {
        if self.len == 0 || self.stride == 0 {
            return 0;
        }
        match self.samples.len().checked_sub(self.start + self.len) {
            Some(slack) => slack / self.stride + 1,
            None => 0,
        }
    }
}

/// Segment a recording into overlapping windows
///
/// A misconfigured segmentation (zero length or stride) yields an empty
/// iterator; [`WindowConfig::validate`] reports it as an error where one is
/// wanted.
pub fn windows<'a>(samples: &'a [ImuSample], config: &WindowConfig) -> Windows<'a> {
    Windows {
        samples,
        len: config.len,
        stride: config.stride,
        start: 0,
    }
}

/// Iterator pairing each window with its majority-vote label
pub struct LabeledWindows<'a> {
    inner: Windows<'a>,
    tie_break: TieBreak,
}

impl<'a> Iterator for LabeledWindows<'a> {
    type Item = (&'a [ImuSample], Option<Activity>);

    fn next(&mut self) -> Option<Self::Item> {
        let window = self.inner.next()?;
        Some((window, majority_label(window, self.tie_break)))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

/// Segment a recording into (window, majority label) pairs
pub fn labeled_windows<'a>(samples: &'a [ImuSample], config: &WindowConfig) -> LabeledWindows<'a> {
    LabeledWindows {
        inner: windows(samples, config),
        tie_break: config.tie_break,
    }
}

/// Most frequent label among the window's samples
///
/// Returns `None` when no sample carries a label. Ties resolve per the
/// configured [`TieBreak`] policy; both options are deterministic.
pub fn majority_label(window: &[ImuSample], tie_break: TieBreak) -> Option<Activity> {
    let mut counts = [0usize; Activity::COUNT];
    let mut first_seen = [usize::MAX; Activity::COUNT];

    for (pos, sample) in window.iter().enumerate() {
        if let Some(activity) = sample.activity {
            let i = activity.index();
            counts[i] += 1;
            if first_seen[i] == usize::MAX {
                first_seen[i] = pos;
            }
        }
    }

    let best_count = *counts.iter().max()?;
    if best_count == 0 {
        return None;
    }

    let winner = match tie_break {
        // Strict > keeps the lowest index on ties.
        TieBreak::EnumOrder => {
            let mut winner = 0;
            for i in 1..Activity::COUNT {
                if counts[i] > counts[winner] {
                    winner = i;
                }
            }
            winner
        }
        TieBreak::FirstObserved => {
            let mut winner = None;
            for i in 0..Activity::COUNT {
                if counts[i] == best_count {
                    match winner {
                        None => winner = Some(i),
                        Some(w) if first_seen[i] < first_seen[w] => winner = Some(i),
                        Some(_) => {}
                    }
                }
            }
            winner?
        }
    };

    Activity::from_index(winner)
}

/// Strict per-window check applied before feature extraction and decoding
///
/// Verifies the sample count and that timestamps strictly increase. The
/// segmentation iterator deliberately does not apply this; the caller
/// decides whether to drop rejected windows or re-window the recording.
pub fn validate_window(window: &[ImuSample], expected_len: usize) -> ModelResult<()> {
    if window.len() != expected_len {
        return Err(ModelError::WindowSize {
            expected: expected_len,
            actual: window.len(),
        });
    }
    for i in 1..window.len() {
        if window[i].timestamp <= window[i - 1].timestamp {
            return Err(ModelError::TimestampOrder { index: i });
        }
    }
    Ok(())
}
