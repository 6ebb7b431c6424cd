/// Phase of a single-pointer motion event.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum MotionAction {
    Down,
    Move,
    Up,
    Cancel,
}

/// Touch (or emulated mouse) sample in physical pixels, top-left origin.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct MotionEvent {
    pub action: MotionAction,
    /// Platform pointer id; only the pointer that pressed first is tracked.
    pub pointer: u64,
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum KeyState {
    Pressed,
    Released,
}

/// Key event. Keys are only logged, so the platform code is kept raw.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct KeyEvent {
    pub state: KeyState,
    pub code: u32,
    pub repeat: bool,
}

/// Platform-agnostic input event delivered to the shell.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum InputEvent {
    Motion(MotionEvent),
    Key(KeyEvent),
}
