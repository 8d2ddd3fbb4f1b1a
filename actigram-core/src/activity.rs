//! Activity State Enumeration
//!
//! The model recognizes a fixed set of four activities. Their declaration
//! order fixes the state indices (0..3) used by the transition matrix, the
//! initial distribution, and the per-state emission parameters, and it is
//! also the tie-break order for majority voting. Reordering the variants
//! invalidates every trained model, so treat the order as part of the wire
//! format.

use core::fmt;

/// Hidden state of the activity model
///
/// The discriminant doubles as the state index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Activity {
    /// Upright and stationary, gravity on the vertical accelerometer axis
    Standing = 0,
    /// Periodic gait, dominant frequency near 2 Hz
    Walking = 1,
    /// High-energy vertical bursts
    Jumping = 2,
    /// At rest, minimal motion on all axes
    Still = 3,
}

impl Activity {
    /// Number of states in the model
    pub const COUNT: usize = 4;

    /// All states in index order
    pub const ALL: [Activity; Activity::COUNT] = [
        Activity::Standing,
        Activity::Walking,
        Activity::Jumping,
        Activity::Still,
    ];

    /// State index in `0..COUNT`
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Canonical lowercase label, as used in recording files
    pub const fn name(self) -> &'static str {
        match self {
            Activity::Standing => "standing",
            Activity::Walking => "walking",
            Activity::Jumping => "jumping",
            Activity::Still => "still",
        }
    }

    /// Look up a state by index
    pub const fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Activity::Standing),
            1 => Some(Activity::Walking),
            2 => Some(Activity::Jumping),
            3 => Some(Activity::Still),
            _ => None,
        }
    }

    /// Parse a label case-insensitively
    ///
    /// Returns `None` for unrecognized labels so ingestion can keep the
    /// sample as unlabeled instead of failing the whole file.
    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim();
        Activity::ALL
            .iter()
            .copied()
            .find(|a| label.eq_ignore_ascii_case(a.name()))
    }
}

impl fmt::Display for Activity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
