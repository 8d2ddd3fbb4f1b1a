//! Raw Inertial Sensor Records
//!
//! A sample is one timestamped 6-axis reading (3 accelerometer + 3
//! gyroscope axes) with an optional activity label. Samples are immutable
//! inputs: the pipeline never rewrites them, it only slices them into
//! windows.
//!
//! Timestamps are nanoseconds since the Unix epoch, stored as `i64` exactly
//! as they appear in the merged recording files. The engine only compares
//! them for ordering; absolute wall-clock meaning is irrelevant here.

use crate::activity::Activity;

/// One of the six measured axes, in canonical column order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Axis {
    /// Accelerometer X (m/s²)
    AccX = 0,
    /// Accelerometer Y (m/s²)
    AccY = 1,
    /// Accelerometer Z (m/s²)
    AccZ = 2,
    /// Gyroscope X (rad/s)
    GyrX = 3,
    /// Gyroscope Y (rad/s)
    GyrY = 4,
    /// Gyroscope Z (rad/s)
    GyrZ = 5,
}

impl Axis {
    /// Number of axes
    pub const COUNT: usize = 6;

    /// All axes in column order
    pub const ALL: [Axis; Axis::COUNT] = [
        Axis::AccX,
        Axis::AccY,
        Axis::AccZ,
        Axis::GyrX,
        Axis::GyrY,
        Axis::GyrZ,
    ];

    /// Column name as written in recording files
    pub const fn name(self) -> &'static str {
        match self {
            Axis::AccX => "acc_x",
            Axis::AccY => "acc_y",
            Axis::AccZ => "acc_z",
            Axis::GyrX => "gyr_x",
            Axis::GyrY => "gyr_y",
            Axis::GyrZ => "gyr_z",
        }
    }
}

/// Sensor grouping of the six axes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sensor {
    /// The three accelerometer axes
    Accelerometer,
    /// The three gyroscope axes
    Gyroscope,
}

impl Sensor {
    /// The three axes belonging to this sensor
    pub const fn axes(self) -> [Axis; 3] {
        match self {
            Sensor::Accelerometer => [Axis::AccX, Axis::AccY, Axis::AccZ],
            Sensor::Gyroscope => [Axis::GyrX, Axis::GyrY, Axis::GyrZ],
        }
    }

    /// Short name used in feature descriptions
    pub const fn name(self) -> &'static str {
        match self {
            Sensor::Accelerometer => "acc",
            Sensor::Gyroscope => "gyr",
        }
    }
}

/// A single timestamped 6-axis reading
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImuSample {
    /// Nanoseconds since the Unix epoch
    pub timestamp: i64,
    /// Accelerometer X (m/s²)
    pub acc_x: f64,
    /// Accelerometer Y (m/s²)
    pub acc_y: f64,
    /// Accelerometer Z (m/s²)
    pub acc_z: f64,
    /// Gyroscope X (rad/s)
    pub gyr_x: f64,
    /// Gyroscope Y (rad/s)
    pub gyr_y: f64,
    /// Gyroscope Z (rad/s)
    pub gyr_z: f64,
    /// Ground-truth label, when the recording provides one
    pub activity: Option<Activity>,
}

impl ImuSample {
    /// Create an unlabeled sample
    pub const fn new(timestamp: i64, acc: [f64; 3], gyr: [f64; 3]) -> Self {
        Self {
            timestamp,
            acc_x: acc[0],
            acc_y: acc[1],
            acc_z: acc[2],
            gyr_x: gyr[0],
            gyr_y: gyr[1],
            gyr_z: gyr[2],
            activity: None,
        }
    }

    /// Attach a ground-truth label
    pub const fn with_label(mut self, activity: Activity) -> Self {
        self.activity = Some(activity);
        self
    }

    /// Reading on a single axis
    pub const fn axis(&self, axis: Axis) -> f64 {
        match axis {
            Axis::AccX => self.acc_x,
            Axis::AccY => self.acc_y,
            Axis::AccZ => self.acc_z,
            Axis::GyrX => self.gyr_x,
            Axis::GyrY => self.gyr_y,
            Axis::GyrZ => self.gyr_z,
        }
    }

    /// Euclidean norm of the acceleration vector
    pub fn acc_magnitude(&self) -> f64 {
        libm::sqrt(self.acc_x * self.acc_x + self.acc_y * self.acc_y + self.acc_z * self.acc_z)
    }

    /// True when every axis holds a finite value
    pub fn is_finite(&self) -> bool {
        self.acc_x.is_finite()
            && self.acc_y.is_finite()
            && self.acc_z.is_finite()
            && self.gyr_x.is_finite()
            && self.gyr_y.is_finite()
            && self.gyr_z.is_finite()
    }
}
