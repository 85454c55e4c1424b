//! Pointer state for scene interaction.
//!
//! [`Pointer`] tracks the cursor in window pixels and converts it to
//! normalized device coordinates (x right, y up, both in `[-1, 1]`), the form
//! [`Scene::frame`](crate::scene::Scene::frame) consumes. It also tracks
//! button state and per-frame deltas so a host can drive camera orbit and
//! zoom.
//!
//! With the `viewer` feature, [`Pointer::handle_event`] folds winit window
//! events into the state.

use crate::Vec2;

/// Mouse button identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

impl MouseButton {
    fn bit(self) -> u8 {
        match self {
            MouseButton::Left => 1,
            MouseButton::Right => 2,
            MouseButton::Middle => 4,
        }
    }
}

#[cfg(feature = "viewer")]
impl From<winit::event::MouseButton> for MouseButton {
    fn from(btn: winit::event::MouseButton) -> Self {
        match btn {
            winit::event::MouseButton::Right => MouseButton::Right,
            winit::event::MouseButton::Middle => MouseButton::Middle,
            _ => MouseButton::Left,
        }
    }
}

/// Cursor position, buttons and wheel, tracked across frames.
#[derive(Debug, Clone, Default)]
pub struct Pointer {
    position: Option<Vec2>,
    window_size: (u32, u32),
    delta: Vec2,
    scroll_delta: f32,
    held: u8,
    pressed: u8,
    released: u8,
}

impl Pointer {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            window_size: (width, height),
            ..Default::default()
        }
    }

    /// Update window size for NDC calculations.
    pub fn set_window_size(&mut self, width: u32, height: u32) {
        self.window_size = (width, height);
    }

    pub fn window_size(&self) -> (u32, u32) {
        self.window_size
    }

    /// Width over height, or 1.0 while the window has no area.
    pub fn aspect(&self) -> f32 {
        let (w, h) = self.window_size;
        if w == 0 || h == 0 {
            1.0
        } else {
            w as f32 / h as f32
        }
    }

    /// Cursor position in window pixels, if the cursor is over the window.
    pub fn position(&self) -> Option<Vec2> {
        self.position
    }

    /// Cursor position in normalized device coordinates.
    ///
    /// `None` if the cursor left the window or the window has no size yet.
    pub fn ndc(&self) -> Option<Vec2> {
        let (w, h) = self.window_size;
        if w == 0 || h == 0 {
            return None;
        }
        self.position.map(|p| {
            Vec2::new(
                (p.x / w as f32) * 2.0 - 1.0,
                1.0 - (p.y / h as f32) * 2.0,
            )
        })
    }

    /// Cursor movement since the last [`begin_frame`](Self::begin_frame), in pixels.
    pub fn delta(&self) -> Vec2 {
        self.delta
    }

    /// Wheel movement this frame. Positive values scroll up/forward.
    pub fn scroll_delta(&self) -> f32 {
        self.scroll_delta
    }

    pub fn held(&self, button: MouseButton) -> bool {
        self.held & button.bit() != 0
    }

    pub fn pressed(&self, button: MouseButton) -> bool {
        self.pressed & button.bit() != 0
    }

    pub fn released(&self, button: MouseButton) -> bool {
        self.released & button.bit() != 0
    }

    /// Clear per-frame state. Call once after each frame is consumed.
    pub fn begin_frame(&mut self) {
        self.pressed = 0;
        self.released = 0;
        self.delta = Vec2::ZERO;
        self.scroll_delta = 0.0;
    }

    pub fn move_to(&mut self, pixels: Vec2) {
        if let Some(previous) = self.position {
            self.delta += pixels - previous;
        }
        self.position = Some(pixels);
    }

    pub fn leave(&mut self) {
        self.position = None;
    }

    pub fn set_button(&mut self, button: MouseButton, down: bool) {
        let bit = button.bit();
        if down {
            if self.held & bit == 0 {
                self.pressed |= bit;
            }
            self.held |= bit;
        } else {
            self.held &= !bit;
            self.released |= bit;
        }
    }

    pub fn scroll(&mut self, lines: f32) {
        self.scroll_delta += lines;
    }

    /// Process a winit window event.
    #[cfg(feature = "viewer")]
    pub fn handle_event(&mut self, event: &winit::event::WindowEvent) {
        use winit::event::{ElementState, MouseScrollDelta, WindowEvent};

        match event {
            WindowEvent::Resized(size) => self.set_window_size(size.width, size.height),
            WindowEvent::CursorMoved { position, .. } => {
                self.move_to(Vec2::new(position.x as f32, position.y as f32));
            }
            WindowEvent::CursorLeft { .. } => self.leave(),
            WindowEvent::MouseInput { state, button, .. } => {
                self.set_button((*button).into(), *state == ElementState::Pressed);
            }
            WindowEvent::MouseWheel { delta, .. } => {
                self.scroll(match delta {
                    MouseScrollDelta::LineDelta(_, y) => *y,
                    MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / 100.0,
                });
            }
            _ => {}
        }
    }
}
