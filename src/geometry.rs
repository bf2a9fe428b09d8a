//! Midline and abduction-angle geometry
//!
//! Pure functions over the current landmark positions; nothing here is
//! cached or stateful. Angles are recomputed on demand from the store.
//!
//! # Midline derivation
//!
//! Two equivalent derivations of the "down the body" unit direction exist
//! and are selectable via [`MidlineStrategy`]:
//!
//! - **Pelvis basis**: the unit vector from left hip to right hip, rotated
//!   90 degrees and forced to non-negative screen-space `y`.
//! - **Shoulder-hip**: the unit vector from the shoulder midpoint to the
//!   hip midpoint, with the same downward forcing.
//!
//! The downward forcing guarantees the midline points down the screen
//! regardless of how the operator has arranged the left/right points.
//!
//! # Degenerate inputs
//!
//! Coincident source points normalize to the zero vector instead of
//! raising. The dot product is clamped to `[-1,1]` before `acos`, so every
//! angle is finite; the zero-vector case lands on `acos(0)`, i.e. 90
//! degrees.

use serde::{Deserialize, Serialize};

use crate::landmarks::LandmarkStore;
use crate::types::{LandmarkId, Point};

/// Vectors shorter than this normalize to the zero vector
pub const ZERO_LENGTH_EPSILON: f64 = 1e-6;

/// Strategy for deriving the body midline direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum MidlineStrategy {
    /// Hip-to-hip basis vector rotated 90 degrees
    PelvisBasis,
    /// Shoulder midpoint toward hip midpoint
    #[default]
    ShoulderHip,
}

impl std::fmt::Display for MidlineStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MidlineStrategy::PelvisBasis => write!(f, "pelvis-basis"),
            MidlineStrategy::ShoulderHip => write!(f, "shoulder-hip"),
        }
    }
}

/// Vector difference `a - b`
pub fn sub(a: Point, b: Point) -> Point {
    Point::new(a.x - b.x, a.y - b.y)
}

/// Midpoint of two points
pub fn midpoint(a: Point, b: Point) -> Point {
    Point::new((a.x + b.x) / 2.0, (a.y + b.y) / 2.0)
}

/// Normalize a vector, returning the zero vector for degenerate input
pub fn unit(v: Point) -> Point {
    let n = v.x.hypot(v.y);
    if n > ZERO_LENGTH_EPSILON {
        Point::new(v.x / n, v.y / n)
    } else {
        Point::new(0.0, 0.0)
    }
}

/// Dot product of two vectors
pub fn dot(a: Point, b: Point) -> f64 {
    a.x * b.x + a.y * b.y
}

/// Angle between two vectors in degrees, in `[0, 180]`
///
/// Both vectors are normalized first and the dot product is clamped to
/// `[-1,1]` before `acos`, so floating-point overshoot at near-parallel
/// vectors cannot produce NaN. A zero-length input yields 90 degrees.
pub fn angle_between_deg(a: Point, b: Point) -> f64 {
    let c = dot(unit(a), unit(b)).clamp(-1.0, 1.0);
    c.acos().to_degrees()
}

/// Force a direction to non-negative screen-space `y` ("downward")
fn force_downward(v: Point) -> Point {
    if v.y < 0.0 {
        Point::new(-v.x, -v.y)
    } else {
        v
    }
}

/// Midline anchors: (shoulder midpoint, hip midpoint)
///
/// The hip midpoint is the geometric base of the midline handle; the
/// operator's midline offset is applied on top of these by the caller.
pub fn midline_anchors(store: &LandmarkStore) -> (Point, Point) {
    let shoulder_mid = midpoint(
        store.get(LandmarkId::LeftShoulder),
        store.get(LandmarkId::RightShoulder),
    );
    let hip_mid = midpoint(store.get(LandmarkId::LeftHip), store.get(LandmarkId::RightHip));
    (shoulder_mid, hip_mid)
}

/// Unit direction "down the body" for the given strategy
///
/// Returns the zero vector when the source points coincide.
pub fn midline_direction(store: &LandmarkStore, strategy: MidlineStrategy) -> Point {
    match strategy {
        MidlineStrategy::PelvisBasis => {
            let pelvis = unit(sub(
                store.get(LandmarkId::RightHip),
                store.get(LandmarkId::LeftHip),
            ));
            // Rotate 90 degrees; downward forcing makes the hip ordering irrelevant
            force_downward(Point::new(-pelvis.y, pelvis.x))
        }
        MidlineStrategy::ShoulderHip => {
            let (shoulder_mid, hip_mid) = midline_anchors(store);
            force_downward(unit(sub(hip_mid, shoulder_mid)))
        }
    }
}

/// Abduction angle of one thigh in degrees
///
/// The angle between the hip-to-knee vector and the midline direction.
pub fn abduction_deg(hip: Point, knee: Point, mid_down: Point) -> f64 {
    angle_between_deg(sub(knee, hip), mid_down)
}

/// Both abduction angles (left, right) for the current landmark positions
pub fn abduction_angles(store: &LandmarkStore, strategy: MidlineStrategy) -> (f64, f64) {
    let mid_down = midline_direction(store, strategy);
    let left = abduction_deg(
        store.get(LandmarkId::LeftHip),
        store.get(LandmarkId::LeftKnee),
        mid_down,
    );
    let right = abduction_deg(
        store.get(LandmarkId::RightHip),
        store.get(LandmarkId::RightKnee),
        mid_down,
    );
    (left, right)
}

/// Arithmetic mean of the two abduction angles
pub fn average_deg(left: f64, right: f64) -> f64 {
    (left + right) / 2.0
}
