//! Pointer-driven interaction state machine
//!
//! Consumes pointer-down/move/up events in normalized coordinates and
//! keeps the landmark positions and the midline offset draggable. The
//! machine does not mutate the store directly: moves are returned as
//! [`InteractionEffect`]s which the session controller applies. This keeps
//! each transition a plain synchronous function, callable from any event
//! source, with no UI event loop required for testing.
//!
//! Only one drag target is active at a time. A new pointer-down while a
//! drag is in flight is not expected here; pointer capture is the
//! collaborator's concern.

use crate::landmarks::{LandmarkStore, MidlineOffset};
use crate::types::{LandmarkId, Point};

/// Current drag state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DragState {
    /// Nothing grabbed
    #[default]
    Idle,
    /// A landmark follows the pointer
    DraggingLandmark(LandmarkId),
    /// The midline handle follows the pointer
    DraggingMidlineHandle,
}

impl DragState {
    /// Whether any drag is in progress
    pub fn is_dragging(&self) -> bool {
        !matches!(self, DragState::Idle)
    }
}

/// A store/offset mutation requested by the state machine
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InteractionEffect {
    /// Move a landmark to the pointer position (the store clamps)
    MoveLandmark { id: LandmarkId, to: Point },
    /// Replace the midline offset
    SetMidlineOffset(MidlineOffset),
}

/// Hit-test the pointer against all landmarks in priority order
///
/// Shoulders are tested first, then hips, then knees; the first landmark
/// within the tolerance radius wins ties.
pub fn hit_test(store: &LandmarkStore, pointer: Point, tolerance: f64) -> Option<LandmarkId> {
    LandmarkId::ALL
        .into_iter()
        .find(|id| pointer.distance_to(store.get(*id)) < tolerance)
}

/// The pointer interaction state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InteractionStateMachine {
    state: DragState,
}

impl InteractionStateMachine {
    /// Create a machine in the idle state
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state
    pub fn state(&self) -> DragState {
        self.state
    }

    /// Handle pointer-down
    ///
    /// The midline handle is tested before the landmarks; `midline_handle`
    /// is `None` when the handle is hidden and therefore not grabbable.
    /// Returns the resulting state.
    pub fn pointer_down(
        &mut self,
        pointer: Point,
        store: &LandmarkStore,
        midline_handle: Option<Point>,
        tolerance: f64,
    ) -> DragState {
        if let Some(handle) = midline_handle {
            if pointer.distance_to(handle) < tolerance {
                self.state = DragState::DraggingMidlineHandle;
                return self.state;
            }
        }

        self.state = match hit_test(store, pointer, tolerance) {
            Some(id) => DragState::DraggingLandmark(id),
            None => DragState::Idle,
        };
        self.state
    }

    /// Handle pointer-move
    ///
    /// `midline_base` is the geometric handle base (hip midpoint) without
    /// the current offset: the new offset is the absolute displacement of
    /// the pointer from that base, not an incremental delta.
    pub fn pointer_move(&mut self, pointer: Point, midline_base: Point) -> Option<InteractionEffect> {
        match self.state {
            DragState::Idle => None,
            DragState::DraggingLandmark(id) => {
                Some(InteractionEffect::MoveLandmark { id, to: pointer })
            }
            DragState::DraggingMidlineHandle => Some(InteractionEffect::SetMidlineOffset(
                MidlineOffset::new(pointer.x - midline_base.x, pointer.y - midline_base.y),
            )),
        }
    }

    /// Handle pointer-up: unconditionally back to idle
    pub fn pointer_up(&mut self) {
        self.state = DragState::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::HIT_TOLERANCE;

    #[test]
    fn test_hit_exact_position() {
        let store = LandmarkStore::new();
        let hit = hit_test(&store, store.get(LandmarkId::LeftKnee), HIT_TOLERANCE);
        assert_eq!(hit, Some(LandmarkId::LeftKnee));
    }

    #[test]
    fn test_hit_priority_on_overlap() {
        let mut store = LandmarkStore::new();
        // Stack a shoulder on top of a knee; the shoulder must win
        store.set(LandmarkId::LeftShoulder, 0.40, 0.80);
        let hit = hit_test(&store, Point::new(0.40, 0.80), HIT_TOLERANCE);
        assert_eq!(hit, Some(LandmarkId::LeftShoulder));
    }

    #[test]
    fn test_miss_outside_tolerance() {
        let store = LandmarkStore::new();
        let hit = hit_test(&store, Point::new(0.05, 0.05), HIT_TOLERANCE);
        assert_eq!(hit, None);
    }

    #[test]
    fn test_pointer_down_grabs_landmark() {
        let store = LandmarkStore::new();
        let mut machine = InteractionStateMachine::new();
        let state = machine.pointer_down(
            store.get(LandmarkId::RightHip),
            &store,
            None,
            HIT_TOLERANCE,
        );
        assert_eq!(state, DragState::DraggingLandmark(LandmarkId::RightHip));
        assert!(machine.state().is_dragging());
    }

    #[test]
    fn test_pointer_down_misses_stays_idle() {
        let store = LandmarkStore::new();
        let mut machine = InteractionStateMachine::new();
        let state = machine.pointer_down(Point::new(0.98, 0.02), &store, None, HIT_TOLERANCE);
        assert_eq!(state, DragState::Idle);
    }

    #[test]
    fn test_midline_handle_wins_over_landmarks() {
        let mut store = LandmarkStore::new();
        // Put a landmark right on the handle position
        let handle = Point::new(0.5, 0.55);
        store.set(LandmarkId::LeftHip, handle.x, handle.y);

        let mut machine = InteractionStateMachine::new();
        let state = machine.pointer_down(handle, &store, Some(handle), HIT_TOLERANCE);
        assert_eq!(state, DragState::DraggingMidlineHandle);
    }

    #[test]
    fn test_hidden_handle_not_grabbable() {
        let store = LandmarkStore::new();
        let mut machine = InteractionStateMachine::new();
        // Handle hidden: pointer at the hip midpoint falls through to the
        // landmark hit-test and misses (hips are 0.08 away)
        let state = machine.pointer_down(Point::new(0.5, 0.55), &store, None, HIT_TOLERANCE);
        assert_eq!(state, DragState::Idle);
    }

    #[test]
    fn test_drag_landmark_move_emits_effect() {
        let store = LandmarkStore::new();
        let mut machine = InteractionStateMachine::new();
        machine.pointer_down(store.get(LandmarkId::LeftKnee), &store, None, HIT_TOLERANCE);

        let effect = machine.pointer_move(Point::new(0.2, 0.9), Point::new(0.5, 0.55));
        assert_eq!(
            effect,
            Some(InteractionEffect::MoveLandmark {
                id: LandmarkId::LeftKnee,
                to: Point::new(0.2, 0.9),
            })
        );
    }

    #[test]
    fn test_drag_handle_offset_is_absolute() {
        let store = LandmarkStore::new();
        let handle = Point::new(0.5, 0.55);
        let mut machine = InteractionStateMachine::new();
        machine.pointer_down(handle, &store, Some(handle), HIT_TOLERANCE);

        // Two moves; the second offset replaces the first instead of stacking
        let base = Point::new(0.5, 0.55);
        machine.pointer_move(Point::new(0.52, 0.60), base);
        let effect = machine.pointer_move(Point::new(0.55, 0.50), base);
        assert_eq!(
            effect,
            Some(InteractionEffect::SetMidlineOffset(MidlineOffset::new(
                0.05, -0.05
            )))
        );
    }

    #[test]
    fn test_pointer_up_always_idles() {
        let store = LandmarkStore::new();
        let mut machine = InteractionStateMachine::new();
        machine.pointer_down(store.get(LandmarkId::LeftKnee), &store, None, HIT_TOLERANCE);
        machine.pointer_up();
        assert_eq!(machine.state(), DragState::Idle);

        // Idle pointer-move is a no-op
        assert_eq!(
            machine.pointer_move(Point::new(0.5, 0.5), Point::new(0.5, 0.55)),
            None
        );
    }
}
