//! Input types delivered by the windowing layer
//!
//! The engine does not own a window; whatever drives it translates native
//! events into these values and pushes them as
//! [`EngineEvent`](crate::events::EngineEvent)s.

pub mod picking;

pub use picking::{pick_color_from_pixel, window_to_framebuffer};

/// Non-character keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpecialKey {
    /// Up arrow
    Up,
    /// Down arrow
    Down,
    /// Left arrow
    Left,
    /// Right arrow
    Right,
    /// Page up
    PageUp,
    /// Page down
    PageDown,
    /// Home
    Home,
    /// End
    End,
    /// Function key `F1`..`F12`
    Function(u8),
}

/// Mouse buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    /// Left button
    Left,
    /// Middle button or wheel click
    Middle,
    /// Right button
    Right,
}

/// Press or release
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ButtonState {
    /// Button went down
    Pressed,
    /// Button came up
    Released,
}

impl ButtonState {
    /// Whether this is a press
    #[must_use]
    pub const fn is_pressed(self) -> bool {
        matches!(self, Self::Pressed)
    }
}
