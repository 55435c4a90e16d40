use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

/// One input record, translated from a winit window event.
///
/// [`WindowState::apply`](crate::WindowState::apply) consumes these; the
/// runtime produces them while polling.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum InputEvent {
    /// The window surface wants to close.
    CloseRequested,
    /// The window was resized to the given pixel size.
    Resized { width: u32, height: u32 },
    /// A key was pressed (including repeats) or released.
    Key { code: KeyCode, pressed: bool },
    /// A mouse button changed state.
    MouseButton { button: MouseButton, pressed: bool },
    /// The cursor moved to a pixel position within the window.
    CursorMoved { x: f32, y: f32 },
    /// Vertical scroll, in lines.
    Scroll { lines: f32 },
    /// The window lost keyboard focus; held keys and buttons are released.
    FocusLost,
}

impl InputEvent {
    /// Translates the window events this crate reacts to; everything else is `None`.
    pub fn from_window_event(event: &WindowEvent) -> Option<Self> {
        match event {
            WindowEvent::CloseRequested => Some(InputEvent::CloseRequested),
            WindowEvent::Focused(false) => Some(InputEvent::FocusLost),
            WindowEvent::Resized(size) => Some(InputEvent::Resized {
                width: size.width,
                height: size.height,
            }),
            WindowEvent::KeyboardInput { event, .. } => match event.physical_key {
                PhysicalKey::Code(code) => Some(InputEvent::Key {
                    code,
                    pressed: event.state == ElementState::Pressed,
                }),
                PhysicalKey::Unidentified(_) => None,
            },
            WindowEvent::MouseInput { state, button, .. } => Some(InputEvent::MouseButton {
                button: *button,
                pressed: *state == ElementState::Pressed,
            }),
            WindowEvent::CursorMoved { position, .. } => Some(InputEvent::CursorMoved {
                x: position.x as f32,
                y: position.y as f32,
            }),
            WindowEvent::MouseWheel { delta, .. } => Some(InputEvent::Scroll {
                lines: scroll_lines(delta),
            }),
            _ => None,
        }
    }
}

/// Vertical scroll amount in lines; pixel deltas count 120 pixels per line.
pub fn scroll_lines(delta: &MouseScrollDelta) -> f32 {
    match delta {
        MouseScrollDelta::LineDelta(_, y) => *y,
        MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / 120.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use winit::dpi::PhysicalPosition;

    #[test]
    fn line_delta_is_passed_through() {
        assert_eq!(scroll_lines(&MouseScrollDelta::LineDelta(0.0, -2.0)), -2.0);
    }

    #[test]
    fn pixel_delta_is_converted_to_lines() {
        let delta = MouseScrollDelta::PixelDelta(PhysicalPosition::new(0.0, 240.0));
        assert_eq!(scroll_lines(&delta), 2.0);
    }

    #[test]
    fn losing_focus_is_input_but_gaining_it_is_not() {
        assert_eq!(
            InputEvent::from_window_event(&WindowEvent::Focused(false)),
            Some(InputEvent::FocusLost)
        );
        assert_eq!(InputEvent::from_window_event(&WindowEvent::Focused(true)), None);
    }

    #[test]
    fn redraw_is_not_input() {
        assert_eq!(InputEvent::from_window_event(&WindowEvent::RedrawRequested), None);
        assert_eq!(
            InputEvent::from_window_event(&WindowEvent::CloseRequested),
            Some(InputEvent::CloseRequested)
        );
    }
}
