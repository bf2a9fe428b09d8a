//! Landmark store, midline offset and visibility flags
//!
//! The store holds the six named landmark positions in normalized
//! coordinates. Identities are fixed; only positions move, and every
//! mutation clamps both coordinates to `[0,1]`. Positions are mutated
//! exclusively by the interaction state machine (via the session
//! controller) and deep-copied into [`LandmarkSnapshot`]s at capture time
//! so that recorded samples are immune to later edits.

use serde::{Deserialize, Serialize};

use crate::types::{LandmarkGroup, LandmarkId, Point};

/// Positions of the six landmarks, indexed by [`LandmarkId`]
#[derive(Debug, Clone, PartialEq)]
pub struct LandmarkStore {
    points: [Point; 6],
}

impl Default for LandmarkStore {
    /// Defaults approximating a standing figure facing the camera
    fn default() -> Self {
        let mut points = [Point::default(); 6];
        points[LandmarkId::LeftShoulder.index()] = Point::new(0.35, 0.20);
        points[LandmarkId::RightShoulder.index()] = Point::new(0.65, 0.20);
        points[LandmarkId::LeftHip.index()] = Point::new(0.42, 0.55);
        points[LandmarkId::RightHip.index()] = Point::new(0.58, 0.55);
        points[LandmarkId::LeftKnee.index()] = Point::new(0.40, 0.80);
        points[LandmarkId::RightKnee.index()] = Point::new(0.60, 0.80);
        Self { points }
    }
}

impl LandmarkStore {
    /// Create a store with the default standing-figure positions
    pub fn new() -> Self {
        Self::default()
    }

    /// Current position of a landmark
    pub fn get(&self, id: LandmarkId) -> Point {
        self.points[id.index()]
    }

    /// Move a landmark, clamping both coordinates to `[0,1]`
    pub fn set(&mut self, id: LandmarkId, x: f64, y: f64) {
        self.points[id.index()] = Point::new(x, y).clamped();
    }

    /// Move a landmark to a point, clamping to `[0,1]`
    pub fn set_point(&mut self, id: LandmarkId, p: Point) {
        self.points[id.index()] = p.clamped();
    }

    /// Deep copy of all six positions, used for recording
    pub fn snapshot(&self) -> LandmarkSnapshot {
        LandmarkSnapshot {
            left_shoulder: self.get(LandmarkId::LeftShoulder),
            right_shoulder: self.get(LandmarkId::RightShoulder),
            left_hip: self.get(LandmarkId::LeftHip),
            right_hip: self.get(LandmarkId::RightHip),
            left_knee: self.get(LandmarkId::LeftKnee),
            right_knee: self.get(LandmarkId::RightKnee),
        }
    }
}

/// An immutable copy of all six landmark positions at capture time
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LandmarkSnapshot {
    pub left_shoulder: Point,
    pub right_shoulder: Point,
    pub left_hip: Point,
    pub right_hip: Point,
    pub left_knee: Point,
    pub right_knee: Point,
}

impl LandmarkSnapshot {
    /// Position of a landmark in this snapshot
    pub fn get(&self, id: LandmarkId) -> Point {
        match id {
            LandmarkId::LeftShoulder => self.left_shoulder,
            LandmarkId::RightShoulder => self.right_shoulder,
            LandmarkId::LeftHip => self.left_hip,
            LandmarkId::RightHip => self.right_hip,
            LandmarkId::LeftKnee => self.left_knee,
            LandmarkId::RightKnee => self.right_knee,
        }
    }

    /// Copy rounded to export precision (4 decimal places)
    pub fn rounded4(&self) -> Self {
        Self {
            left_shoulder: self.left_shoulder.rounded4(),
            right_shoulder: self.right_shoulder.rounded4(),
            left_hip: self.left_hip.rounded4(),
            right_hip: self.right_hip.rounded4(),
            left_knee: self.left_knee.rounded4(),
            right_knee: self.right_knee.rounded4(),
        }
    }
}

/// Operator-applied displacement of the automatically computed midline
///
/// Applied uniformly to both midline anchors so the whole line shifts in
/// parallel. Session-scoped: initialized to zero and persisting across
/// frames, with no reset operation exposed.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MidlineOffset {
    pub dx: f64,
    pub dy: f64,
}

impl MidlineOffset {
    /// Create an offset from components
    pub fn new(dx: f64, dy: f64) -> Self {
        Self { dx, dy }
    }

    /// Apply this offset to a point
    pub fn apply(&self, p: Point) -> Point {
        Point::new(p.x + self.dx, p.y + self.dy)
    }

    /// Copy rounded to export precision (4 decimal places)
    pub fn rounded4(&self) -> Self {
        Self {
            dx: crate::types::round_dp(self.dx, 4),
            dy: crate::types::round_dp(self.dy, 4),
        }
    }
}

/// Presentation hints for the external renderer
///
/// These flags control what the renderer is told to draw; they do not
/// affect geometry computation. The midline handle flag additionally gates
/// whether the handle can be grabbed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisibilityFlags {
    pub shoulders: bool,
    pub hips: bool,
    pub knees: bool,
    pub lines: bool,
    pub midline: bool,
    pub labels: bool,
    pub midline_handle: bool,
}

impl Default for VisibilityFlags {
    fn default() -> Self {
        Self {
            shoulders: true,
            hips: true,
            knees: true,
            lines: true,
            midline: true,
            labels: true,
            midline_handle: true,
        }
    }
}

impl VisibilityFlags {
    /// Whether a landmark group should be drawn
    pub fn group_visible(&self, group: LandmarkGroup) -> bool {
        match group {
            LandmarkGroup::Shoulders => self.shoulders,
            LandmarkGroup::Hips => self.hips,
            LandmarkGroup::Knees => self.knees,
        }
    }
}
