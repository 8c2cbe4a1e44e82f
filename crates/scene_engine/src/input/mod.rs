//! Input state
//!
//! The windowing layer is an external collaborator. Once per frame it feeds
//! key, button and cursor changes into an [`InputState`] through an
//! [`InputSource`]; behaviors then read a stable snapshot for the rest of the
//! frame.

use std::collections::HashSet;

/// Per-frame keyboard and mouse snapshot
#[derive(Debug, Clone, Default)]
pub struct InputState {
    keys: HashSet<KeyCode>,
    previous_keys: HashSet<KeyCode>,
    buttons: HashSet<MouseButton>,
    previous_buttons: HashSet<MouseButton>,
    cursor: (f64, f64),
    previous_cursor: (f64, f64),
}

impl InputState {
    /// Create an empty input state
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new frame: the current state becomes the previous state
    pub fn begin_frame(&mut self) {
        self.previous_keys.clone_from(&self.keys);
        self.previous_buttons.clone_from(&self.buttons);
        self.previous_cursor = self.cursor;
    }

    /// Handle key input
    pub fn handle_key_input(&mut self, key: KeyCode, pressed: bool) {
        if pressed {
            self.keys.insert(key);
        } else {
            self.keys.remove(&key);
        }
    }

    /// Handle mouse button input
    pub fn handle_mouse_button(&mut self, button: MouseButton, pressed: bool) {
        if pressed {
            self.buttons.insert(button);
        } else {
            self.buttons.remove(&button);
        }
    }

    /// Handle mouse movement
    pub fn handle_mouse_move(&mut self, x: f64, y: f64) {
        self.cursor = (x, y);
    }

    /// Key is held this frame
    pub fn get_key(&self, key: KeyCode) -> bool {
        self.keys.contains(&key)
    }

    /// Key went down this frame
    pub fn get_key_down(&self, key: KeyCode) -> bool {
        self.keys.contains(&key) && !self.previous_keys.contains(&key)
    }

    /// Key went up this frame
    pub fn get_key_up(&self, key: KeyCode) -> bool {
        !self.keys.contains(&key) && self.previous_keys.contains(&key)
    }

    /// Button is held this frame
    pub fn get_mouse_button(&self, button: MouseButton) -> bool {
        self.buttons.contains(&button)
    }

    /// Button went down this frame
    pub fn get_mouse_button_down(&self, button: MouseButton) -> bool {
        self.buttons.contains(&button) && !self.previous_buttons.contains(&button)
    }

    /// Button went up this frame
    pub fn get_mouse_button_up(&self, button: MouseButton) -> bool {
        !self.buttons.contains(&button) && self.previous_buttons.contains(&button)
    }

    /// Cursor position in window coordinates
    pub fn cursor_position(&self) -> (f64, f64) {
        self.cursor
    }

    /// Cursor movement since the previous frame
    pub fn cursor_delta(&self) -> (f64, f64) {
        (
            self.cursor.0 - self.previous_cursor.0,
            self.cursor.1 - self.previous_cursor.1,
        )
    }
}

/// Windowing collaborator that reports input once per frame
pub trait InputSource {
    /// Push every change since the last poll into `input`
    fn poll(&mut self, input: &mut InputState);
}

/// Input source that never reports anything (headless runs)
#[derive(Debug, Clone, Copy, Default)]
pub struct NullInputSource;

impl InputSource for NullInputSource {
    fn poll(&mut self, _input: &mut InputState) {}
}

/// Key codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    /// A key
    A,
    /// B key
    B,
    /// C key
    C,
    /// D key
    D,
    /// E key
    E,
    /// F key
    F,
    /// G key
    G,
    /// H key
    H,
    /// I key
    I,
    /// J key
    J,
    /// K key
    K,
    /// L key
    L,
    /// M key
    M,
    /// N key
    N,
    /// O key
    O,
    /// P key
    P,
    /// Q key
    Q,
    /// R key
    R,
    /// S key
    S,
    /// T key
    T,
    /// U key
    U,
    /// V key
    V,
    /// W key
    W,
    /// X key
    X,
    /// Y key
    Y,
    /// Z key
    Z,
    /// Space key
    Space,
    /// Enter key
    Enter,
    /// Escape key
    Escape,
    /// Left shift
    LeftShift,
    /// Left control
    LeftControl,
    /// Up arrow
    Up,
    /// Down arrow
    Down,
    /// Left arrow
    Left,
    /// Right arrow
    Right,
}

/// Mouse buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    /// Left mouse button
    Left,
    /// Right mouse button
    Right,
    /// Middle mouse button
    Middle,
}
