use serde::{Deserialize, Serialize};

/// Toolkit-neutral input events delivered by the windowing layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum InputEvent {
    /// Single click at a window position
    Click { x: i32, y: i32, button: MouseButton },
    /// Keyboard input
    KeyPress { key: KeyCode },
}

/// Keyboard key codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyCode {
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Plus,
    Minus,
    PageUp,
    PageDown,
    Escape,
    Other(u32),
}

/// Mouse button types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
    Other(u16),
}
