//! Input-driven window state.
//!
//! [`WindowState`] is what the render loop reads every frame: size, zoom scale
//! and pan location. It changes only when input is applied:
//!
//! - scroll wheel adds its line delta to the scale (initially 100),
//! - arrow keys held during a step pan by one pixel's worth of NDC
//!   (`2 / width`, `2 / height`),
//! - holding the primary mouse button puts the location under the cursor,
//! - Escape or a close request moves the window to [`LoopState::ShouldClose`],
//! - losing focus releases every held key and button.
//!
//! The runtime feeds every polled [`InputEvent`] through
//! [`apply`](WindowState::apply) and calls [`step`](WindowState::step) once per
//! loop iteration, after the events and before the next frame is drawn.

use std::collections::HashSet;

use winit::event::MouseButton;
use winit::keyboard::KeyCode;

use crate::input::InputEvent;

/// Whether the render loop should keep going.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoopState {
    Open,
    ShouldClose,
}

/// Size, scale and pan location of the window, updated from input.
#[derive(Clone, Debug)]
pub struct WindowState {
    width: f32,
    height: f32,
    scale: f32,
    location: [f32; 2],
    keys_down: HashSet<KeyCode>,
    primary_down: bool,
    cursor: [f32; 2],
    close_requested: bool,
    /// Whether the most recent key event was a press or repeat.
    key_active: bool,
}

impl WindowState {
    pub const INITIAL_SCALE: f32 = 100.0;

    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: width.max(1) as f32,
            height: height.max(1) as f32,
            scale: Self::INITIAL_SCALE,
            location: [0.0, 0.0],
            keys_down: HashSet::new(),
            primary_down: false,
            cursor: [0.0, 0.0],
            close_requested: false,
            key_active: false,
        }
    }

    /// Records one input event.
    pub fn apply(&mut self, event: &InputEvent) {
        match *event {
            InputEvent::CloseRequested => self.close_requested = true,
            InputEvent::Resized { width, height } => {
                if width > 0 && height > 0 {
                    self.width = width as f32;
                    self.height = height as f32;
                }
            }
            InputEvent::Key { code, pressed } => {
                if pressed {
                    self.keys_down.insert(code);
                } else {
                    self.keys_down.remove(&code);
                }
                self.key_active = pressed;
            }
            InputEvent::MouseButton { button, pressed } => {
                if button == MouseButton::Left {
                    self.primary_down = pressed;
                }
            }
            InputEvent::CursorMoved { x, y } => self.cursor = [x, y],
            InputEvent::Scroll { lines } => self.scale += lines,
            // Releases may never arrive once another window has focus.
            InputEvent::FocusLost => {
                self.keys_down.clear();
                self.primary_down = false;
                self.key_active = false;
            }
        }
    }

    /// Applies held keys and mouse drag to the location.
    pub fn step(&mut self) {
        if self.key_down(KeyCode::ArrowLeft) {
            self.location[0] -= 2.0 / self.width;
        } else if self.key_down(KeyCode::ArrowRight) {
            self.location[0] += 2.0 / self.width;
        }

        if self.key_down(KeyCode::ArrowDown) {
            self.location[1] -= 2.0 / self.height;
        } else if self.key_down(KeyCode::ArrowUp) {
            self.location[1] += 2.0 / self.height;
        }

        if self.primary_down {
            let [x, y] = self.cursor;
            self.location[0] = x * 2.0 / self.width - 1.0;
            self.location[1] = 1.0 - y * 2.0 / self.height;
        }
    }

    pub fn loop_state(&self) -> LoopState {
        if self.close_requested || self.key_down(KeyCode::Escape) {
            LoopState::ShouldClose
        } else {
            LoopState::Open
        }
    }

    pub fn should_close(&self) -> bool {
        self.loop_state() == LoopState::ShouldClose
    }

    /// `true` when the loop may block until the next event.
    ///
    /// Holding a key keeps the loop polling so panning stays smooth.
    pub fn waits_for_input(&self) -> bool {
        !self.key_active
    }

    pub fn key_down(&self, code: KeyCode) -> bool {
        self.keys_down.contains(&code)
    }

    /// Width in pixels.
    pub fn width(&self) -> f32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn aspect(&self) -> f32 {
        self.width / self.height
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// Pan location in normalized device coordinates.
    pub fn location(&self) -> [f32; 2] {
        self.location
    }
}
