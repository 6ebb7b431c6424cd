//! Input subsystem.
//!
//! Public API is platform-agnostic and does not expose winit types.
//! Runtime code is responsible for translating platform events into `InputEvent`s.

mod drag;
pub(crate) mod platform;
mod types;

pub use drag::{drag_to_degrees, DragDelta, DragTracker, Gesture};
pub use types::{InputEvent, KeyEvent, KeyState, MotionAction, MotionEvent};
