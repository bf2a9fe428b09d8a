//! Safety-band classification and status derivation
//!
//! Maps abduction angles to safety bands and derives the single status
//! message shown to the operator, including the combination rules across
//! both legs and the device-tilt override.

use serde::{Deserialize, Serialize};

use crate::types::{TiltReading, TILT_TOLERANCE_DEG};

/// Red, used for both unsafe bands
pub const COLOR_UNSAFE: [u8; 4] = [234, 67, 53, 255];
/// Green, used for the good band
pub const COLOR_GOOD: [u8; 4] = [52, 168, 83, 255];
/// Amber, used for the caution band
pub const COLOR_CAUTION: [u8; 4] = [249, 171, 0, 255];

/// Safety classification of a single abduction angle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SafetyBand {
    /// Below the low bound
    UnsafeLow,
    /// Within the target band (inclusive on both ends)
    Good,
    /// Above the target band but at or below the warning bound
    Caution,
    /// Above the warning bound
    UnsafeHigh,
}

impl SafetyBand {
    /// Display color for this band (RGBA)
    pub fn color(&self) -> [u8; 4] {
        match self {
            SafetyBand::UnsafeLow | SafetyBand::UnsafeHigh => COLOR_UNSAFE,
            SafetyBand::Good => COLOR_GOOD,
            SafetyBand::Caution => COLOR_CAUTION,
        }
    }

    /// Display name for this band
    pub fn display_name(&self) -> &'static str {
        match self {
            SafetyBand::UnsafeLow => "Too low",
            SafetyBand::Good => "Good",
            SafetyBand::Caution => "Caution",
            SafetyBand::UnsafeHigh => "Too high",
        }
    }

    /// Whether this band is the target band
    pub fn is_good(&self) -> bool {
        matches!(self, SafetyBand::Good)
    }
}

impl std::fmt::Display for SafetyBand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Band thresholds in degrees
///
/// The bands partition `[0, 180]` with no gaps or overlaps. Boundary values
/// belong to the lower-priority band: an angle exactly at `target_deg` is
/// good, one exactly at `warning_deg` is caution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SafetyThresholds {
    /// Below this the abduction is unsafely low
    pub low_deg: f64,
    /// Upper bound of the target band
    pub target_deg: f64,
    /// Above this the abduction is unsafely high
    pub warning_deg: f64,
}

impl Default for SafetyThresholds {
    fn default() -> Self {
        Self {
            low_deg: 30.0,
            target_deg: 45.0,
            warning_deg: 60.0,
        }
    }
}

impl SafetyThresholds {
    /// Classify one angle into its safety band
    pub fn band_for(&self, angle_deg: f64) -> SafetyBand {
        if angle_deg < self.low_deg {
            SafetyBand::UnsafeLow
        } else if angle_deg <= self.target_deg {
            SafetyBand::Good
        } else if angle_deg <= self.warning_deg {
            SafetyBand::Caution
        } else {
            SafetyBand::UnsafeHigh
        }
    }

    /// Whether either of two angles exceeds the warning bound
    pub fn exceeds_warning(&self, left_deg: f64, right_deg: f64) -> bool {
        left_deg > self.warning_deg || right_deg > self.warning_deg
    }
}

/// The status line shown to the operator
#[derive(Debug, Clone, PartialEq)]
pub struct StatusReport {
    /// Human-readable status message
    pub message: String,
    /// Display color for the message (RGBA)
    pub color: [u8; 4],
    /// True when the tilt override replaced the posture status
    pub tilt_override: bool,
}

/// Derive the status message for both legs, applying the tilt override
///
/// Rules are evaluated in priority order, first match wins:
/// 1. either leg above `warning_deg`
/// 2. both legs good
/// 3. either leg in caution
/// 4. at least one leg unsafely low
///
/// When a tilt reading is present and out of tolerance, its warning
/// replaces whatever the rules produced. The override affects display
/// only; it never alters the angle numbers or recorded values.
pub fn status_for(
    left_deg: f64,
    right_deg: f64,
    tilt: Option<TiltReading>,
    thresholds: &SafetyThresholds,
) -> StatusReport {
    let left = thresholds.band_for(left_deg);
    let right = thresholds.band_for(right_deg);

    let (message, color) = if thresholds.exceeds_warning(left_deg, right_deg) {
        (
            format!(
                "Warning: abduction above {:.0} degrees, too high!",
                thresholds.warning_deg
            ),
            COLOR_UNSAFE,
        )
    } else if left.is_good() && right.is_good() {
        (
            format!(
                "Posture good (both legs {:.0}-{:.0} degrees).",
                thresholds.low_deg, thresholds.target_deg
            ),
            COLOR_GOOD,
        )
    } else if left == SafetyBand::Caution || right == SafetyBand::Caution {
        (
            format!(
                "Caution: {:.0}-{:.0} degrees (amber zone).",
                thresholds.target_deg, thresholds.warning_deg
            ),
            COLOR_CAUTION,
        )
    } else {
        (
            format!(
                "Abduction too low (below {:.0} degrees).",
                thresholds.low_deg
            ),
            COLOR_UNSAFE,
        )
    };

    if let Some(tilt) = tilt {
        if !tilt.is_within_tolerance() {
            return StatusReport {
                message: format!(
                    "Device tilted {:.1} degrees (above {:.0}). Level the device.",
                    tilt.degrees, TILT_TOLERANCE_DEG
                ),
                color: COLOR_UNSAFE,
                tilt_override: true,
            };
        }
    }

    StatusReport {
        message,
        color,
        tilt_override: false,
    }
}
