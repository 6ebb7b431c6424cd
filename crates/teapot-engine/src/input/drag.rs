use super::types::{MotionAction, MotionEvent};

/// Horizontal and vertical displacement of an ongoing drag.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct DragDelta {
    /// Displacement since the press.
    pub total_x: f32,
    pub total_y: f32,
    /// Displacement since the previous sample.
    pub step_x: f32,
    pub step_y: f32,
}

/// What a motion event meant for the drag gesture.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Gesture {
    Pressed { x: f32, y: f32 },
    Dragged(DragDelta),
    /// Released where it was pressed.
    Tapped { x: f32, y: f32 },
    Released { x: f32, y: f32 },
    Cancelled,
    /// Event from a secondary pointer, or a move with nothing pressed.
    Ignored,
}

/// Tracks the press position and the last sample of the primary pointer.
#[derive(Debug, Default)]
pub struct DragTracker {
    pointer: Option<u64>,
    anchor: (f32, f32),
    last: (f32, f32),
}

impl DragTracker {
    #[cfg(test)]
    fn is_pressed(&self) -> bool {
        self.pointer.is_some()
    }

    pub fn apply(&mut self, ev: &MotionEvent) -> Gesture {
        let pos = (ev.x, ev.y);

        match ev.action {
            MotionAction::Down => {
                if self.pointer.is_some() {
                    return Gesture::Ignored;
                }
                self.pointer = Some(ev.pointer);
                self.anchor = pos;
                self.last = pos;
                Gesture::Pressed { x: ev.x, y: ev.y }
            }

            MotionAction::Move => {
                if self.pointer != Some(ev.pointer) {
                    return Gesture::Ignored;
                }
                let delta = DragDelta {
                    total_x: pos.0 - self.anchor.0,
                    total_y: pos.1 - self.anchor.1,
                    step_x: pos.0 - self.last.0,
                    step_y: pos.1 - self.last.1,
                };
                self.last = pos;
                Gesture::Dragged(delta)
            }

            MotionAction::Up => {
                if self.pointer != Some(ev.pointer) {
                    return Gesture::Ignored;
                }
                self.pointer = None;
                if pos == self.anchor {
                    Gesture::Tapped { x: ev.x, y: ev.y }
                } else {
                    Gesture::Released { x: ev.x, y: ev.y }
                }
            }

            MotionAction::Cancel => {
                if self.pointer.take().is_none() {
                    return Gesture::Ignored;
                }
                Gesture::Cancelled
            }
        }
    }
}

/// Converts a horizontal drag in pixels into a rotation angle in degrees.
///
/// Dragging across the full viewport width is one full turn.
pub fn drag_to_degrees(dx: f32, viewport_width: u32) -> f32 {
    360.0 * dx / viewport_width.max(1) as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ev(action: MotionAction, x: f32, y: f32) -> MotionEvent {
        MotionEvent { action, pointer: 0, x, y }
    }

    #[test]
    fn move_reports_total_and_step() {
        let mut t = DragTracker::default();
        t.apply(&ev(MotionAction::Down, 100.0, 50.0));
        t.apply(&ev(MotionAction::Move, 130.0, 50.0));

        let g = t.apply(&ev(MotionAction::Move, 180.0, 40.0));
        assert_eq!(
            g,
            Gesture::Dragged(DragDelta { total_x: 80.0, total_y: -10.0, step_x: 50.0, step_y: -10.0 })
        );
    }

    #[test]
    fn move_without_press_is_ignored() {
        let mut t = DragTracker::default();
        assert_eq!(t.apply(&ev(MotionAction::Move, 10.0, 10.0)), Gesture::Ignored);
    }

    #[test]
    fn release_in_place_is_a_tap() {
        let mut t = DragTracker::default();
        t.apply(&ev(MotionAction::Down, 5.0, 5.0));
        assert_eq!(t.apply(&ev(MotionAction::Up, 5.0, 5.0)), Gesture::Tapped { x: 5.0, y: 5.0 });
        assert!(!t.is_pressed());
    }

    #[test]
    fn secondary_pointer_is_ignored() {
        let mut t = DragTracker::default();
        t.apply(&ev(MotionAction::Down, 0.0, 0.0));

        let other = MotionEvent { action: MotionAction::Move, pointer: 7, x: 99.0, y: 0.0 };
        assert_eq!(t.apply(&other), Gesture::Ignored);
        assert!(t.is_pressed());
    }

    #[test]
    fn cancel_clears_press() {
        let mut t = DragTracker::default();
        t.apply(&ev(MotionAction::Down, 0.0, 0.0));
        assert_eq!(t.apply(&ev(MotionAction::Cancel, 0.0, 0.0)), Gesture::Cancelled);
        assert_eq!(t.apply(&ev(MotionAction::Move, 3.0, 0.0)), Gesture::Ignored);
    }

    #[test]
    fn quarter_width_is_quarter_turn() {
        assert_eq!(drag_to_degrees(200.0, 800), 90.0);
        assert_eq!(drag_to_degrees(-800.0, 800), -360.0);
    }

    #[test]
    fn zero_width_does_not_divide_by_zero() {
        assert!(drag_to_degrees(10.0, 0).is_finite());
    }
}
