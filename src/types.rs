//! Core data types for the goniometry engine
//!
//! This module contains the fundamental data structures shared across the
//! crate: normalized 2-D points, the six fixed landmark identities, and the
//! device tilt reading.
//!
//! # Coordinate model
//!
//! All positions are normalized to `[0,1] x [0,1]` with the origin in the
//! top-left corner and `y` growing downward, matching the render surface.
//! Collaborators normalize raw pixel coordinates before they reach this
//! crate, so nothing here depends on the render-surface size.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::{GonioError, Result};

/// Hit-test tolerance radius in normalized units
///
/// A fixed fraction of normalized space, so grab behavior is identical
/// across render-surface sizes.
pub const HIT_TOLERANCE: f64 = 0.03;

/// Device tilt tolerance in degrees
///
/// Beyond this the device orientation is flagged as unreliable for
/// measurement.
pub const TILT_TOLERANCE_DEG: f64 = 5.0;

/// A point (or free vector) in normalized coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    /// Create a new point
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Copy of this point with both coordinates clamped to `[0,1]`
    pub fn clamped(&self) -> Self {
        Self {
            x: self.x.clamp(0.0, 1.0),
            y: self.y.clamp(0.0, 1.0),
        }
    }

    /// Euclidean distance to another point
    pub fn distance_to(&self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Copy of this point rounded to four decimal places (export precision)
    pub fn rounded4(&self) -> Self {
        Self {
            x: round_dp(self.x, 4),
            y: round_dp(self.y, 4),
        }
    }
}

/// Round a value to `dp` decimal places
pub(crate) fn round_dp(value: f64, dp: u32) -> f64 {
    let factor = 10f64.powi(dp as i32);
    (value * factor).round() / factor
}

/// The six fixed landmark identities
///
/// Identities are fixed for the lifetime of a session: landmarks are never
/// added or removed, only their positions move. The declaration order is the
/// hit-test priority order (shoulders, then hips, then knees).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LandmarkId {
    LeftShoulder,
    RightShoulder,
    LeftHip,
    RightHip,
    LeftKnee,
    RightKnee,
}

/// Landmark groups as toggled by the visibility flags
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LandmarkGroup {
    Shoulders,
    Hips,
    Knees,
}

impl LandmarkId {
    /// All identities in hit-test priority order
    pub const ALL: [LandmarkId; 6] = [
        LandmarkId::LeftShoulder,
        LandmarkId::RightShoulder,
        LandmarkId::LeftHip,
        LandmarkId::RightHip,
        LandmarkId::LeftKnee,
        LandmarkId::RightKnee,
    ];

    /// Dense index into per-landmark storage
    pub(crate) fn index(&self) -> usize {
        match self {
            LandmarkId::LeftShoulder => 0,
            LandmarkId::RightShoulder => 1,
            LandmarkId::LeftHip => 2,
            LandmarkId::RightHip => 3,
            LandmarkId::LeftKnee => 4,
            LandmarkId::RightKnee => 5,
        }
    }

    /// Export/config key for this identity
    pub fn key(&self) -> &'static str {
        match self {
            LandmarkId::LeftShoulder => "leftShoulder",
            LandmarkId::RightShoulder => "rightShoulder",
            LandmarkId::LeftHip => "leftHip",
            LandmarkId::RightHip => "rightHip",
            LandmarkId::LeftKnee => "leftKnee",
            LandmarkId::RightKnee => "rightKnee",
        }
    }

    /// Short on-screen label (as drawn next to the point)
    pub fn label(&self) -> &'static str {
        match self {
            LandmarkId::LeftShoulder => "LS",
            LandmarkId::RightShoulder => "RS",
            LandmarkId::LeftHip => "LH",
            LandmarkId::RightHip => "RH",
            LandmarkId::LeftKnee => "LK",
            LandmarkId::RightKnee => "RK",
        }
    }

    /// Which visibility group this identity belongs to
    pub fn group(&self) -> LandmarkGroup {
        match self {
            LandmarkId::LeftShoulder | LandmarkId::RightShoulder => LandmarkGroup::Shoulders,
            LandmarkId::LeftHip | LandmarkId::RightHip => LandmarkGroup::Hips,
            LandmarkId::LeftKnee | LandmarkId::RightKnee => LandmarkGroup::Knees,
        }
    }
}

impl std::fmt::Display for LandmarkId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key())
    }
}

impl FromStr for LandmarkId {
    type Err = GonioError;

    fn from_str(s: &str) -> Result<Self> {
        LandmarkId::ALL
            .iter()
            .find(|id| id.key() == s)
            .copied()
            .ok_or_else(|| GonioError::InvalidLandmarkId(s.to_string()))
    }
}

/// An instantaneous device tilt reading in degrees
///
/// Updated asynchronously by an external sensor feed; absent (`None` at the
/// session level) when sensor access was never granted. Tilt is advisory,
/// never required: all angle and recording logic proceeds without it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TiltReading {
    /// Tilt angle in degrees, sign follows the device axis
    pub degrees: f64,
}

impl TiltReading {
    /// Create a reading from degrees
    pub fn new(degrees: f64) -> Self {
        Self { degrees }
    }

    /// Whether the device is level enough for measurement
    pub fn is_within_tolerance(&self) -> bool {
        self.degrees.abs() <= TILT_TOLERANCE_DEG
    }
}
