use winit::event::{ElementState, MouseButton, Touch, TouchPhase, WindowEvent};
use winit::keyboard::PhysicalKey;

use crate::input::{InputEvent, KeyEvent, KeyState, MotionAction, MotionEvent};

/// Pointer id of the emulated mouse pointer.
const MOUSE_POINTER: u64 = u64::MAX;

/// Mouse state needed to turn left-button drags into motion events.
///
/// winit 0.30 does not expose a cursor query, so the position is tracked here.
#[derive(Debug, Default)]
pub struct MouseEmulation {
    cursor: (f32, f32),
    left_down: bool,
}

impl MouseEmulation {
    /// Translates a winit `WindowEvent` into an engine `InputEvent`.
    ///
    /// Positions stay in physical pixels so they compare directly with the swapchain extent.
    /// Returns `None` for events not represented by the input subsystem.
    pub fn translate(&mut self, event: &WindowEvent) -> Option<InputEvent> {
        match event {
            WindowEvent::Touch(touch) => Some(InputEvent::Motion(map_touch(touch))),

            WindowEvent::CursorMoved { position, .. } => {
                self.cursor = (position.x as f32, position.y as f32);
                self.left_down.then(|| self.motion(MotionAction::Move))
            }

            WindowEvent::CursorLeft { .. } if self.left_down => {
                self.left_down = false;
                Some(self.motion(MotionAction::Cancel))
            }

            WindowEvent::MouseInput { state, button: MouseButton::Left, .. } => {
                let action = match state {
                    ElementState::Pressed => {
                        self.left_down = true;
                        MotionAction::Down
                    }
                    ElementState::Released => {
                        if !self.left_down {
                            return None;
                        }
                        self.left_down = false;
                        MotionAction::Up
                    }
                };
                Some(self.motion(action))
            }

            WindowEvent::KeyboardInput { event, .. } => {
                let state = match event.state {
                    ElementState::Pressed => KeyState::Pressed,
                    ElementState::Released => KeyState::Released,
                };
                Some(InputEvent::Key(KeyEvent {
                    state,
                    code: map_key(event.physical_key),
                    repeat: event.repeat,
                }))
            }

            _ => None,
        }
    }

    fn motion(&self, action: MotionAction) -> InputEvent {
        InputEvent::Motion(MotionEvent {
            action,
            pointer: MOUSE_POINTER,
            x: self.cursor.0,
            y: self.cursor.1,
        })
    }
}

fn map_touch(touch: &Touch) -> MotionEvent {
    let action = match touch.phase {
        TouchPhase::Started => MotionAction::Down,
        TouchPhase::Moved => MotionAction::Move,
        TouchPhase::Ended => MotionAction::Up,
        TouchPhase::Cancelled => MotionAction::Cancel,
    };
    MotionEvent {
        action,
        pointer: touch.id,
        x: touch.location.x as f32,
        y: touch.location.y as f32,
    }
}

fn map_key(pk: PhysicalKey) -> u32 {
    match pk {
        PhysicalKey::Code(code) => code as u32,
        // winit 0.30 uses NativeKeyCode; no stable numeric is guaranteed here.
        PhysicalKey::Unidentified(_) => 0,
    }
}

#[cfg(test)]
mod tests {
    use winit::dpi::PhysicalPosition;
    use winit::event::{DeviceId, Force};

    use super::*;

    fn device() -> DeviceId {
        // SAFETY: only used as an opaque id in synthetic events.
        unsafe { DeviceId::dummy() }
    }

    fn moved(x: f64, y: f64) -> WindowEvent {
        WindowEvent::CursorMoved { device_id: device(), position: PhysicalPosition::new(x, y) }
    }

    fn left(state: ElementState) -> WindowEvent {
        WindowEvent::MouseInput { device_id: device(), state, button: MouseButton::Left }
    }

    fn action(ev: Option<InputEvent>) -> Option<(MotionAction, f32)> {
        match ev {
            Some(InputEvent::Motion(m)) => Some((m.action, m.x)),
            _ => None,
        }
    }

    #[test]
    fn hover_is_not_a_motion() {
        let mut m = MouseEmulation::default();
        assert_eq!(action(m.translate(&moved(5.0, 5.0))), None);
    }

    #[test]
    fn left_drag_maps_to_down_move_up() {
        let mut m = MouseEmulation::default();
        m.translate(&moved(10.0, 0.0));

        assert_eq!(action(m.translate(&left(ElementState::Pressed))), Some((MotionAction::Down, 10.0)));
        assert_eq!(action(m.translate(&moved(60.0, 0.0))), Some((MotionAction::Move, 60.0)));
        assert_eq!(action(m.translate(&left(ElementState::Released))), Some((MotionAction::Up, 60.0)));
        assert_eq!(action(m.translate(&moved(70.0, 0.0))), None);
    }

    #[test]
    fn other_buttons_are_ignored() {
        let mut m = MouseEmulation::default();
        let right = WindowEvent::MouseInput {
            device_id: device(),
            state: ElementState::Pressed,
            button: MouseButton::Right,
        };
        assert_eq!(m.translate(&right), None);
    }

    #[test]
    fn touch_phases_map_to_actions() {
        let mut m = MouseEmulation::default();
        let touch = |phase| {
            WindowEvent::Touch(Touch {
                device_id: device(),
                phase,
                location: PhysicalPosition::new(3.0, 4.0),
                force: None::<Force>,
                id: 9,
            })
        };

        let ev = m.translate(&touch(TouchPhase::Started));
        assert_eq!(
            ev,
            Some(InputEvent::Motion(MotionEvent { action: MotionAction::Down, pointer: 9, x: 3.0, y: 4.0 }))
        );
        assert_eq!(action(m.translate(&touch(TouchPhase::Cancelled))), Some((MotionAction::Cancel, 3.0)));
    }
}
