//! Coordinate helpers for color-id picking
//!
//! Window coordinates have their origin at the top-left corner; the frame
//! buffer, like OpenGL, starts at the bottom-left.

use crate::scene::ObjectId;

/// Convert a window position to frame buffer coordinates
///
/// Returns `None` when the position lies outside a `width` x `height` buffer.
#[must_use]
pub fn window_to_framebuffer(x: i32, y: i32, width: u32, height: u32) -> Option<(u32, u32)> {
    let x = u32::try_from(x).ok()?;
    let y = u32::try_from(y).ok()?;
    if x >= width || y >= height {
        return None;
    }
    Some((x, height - 1 - y))
}

/// Decode an RGBA pixel read back from a picking pass
#[must_use]
pub fn pick_color_from_pixel(pixel: [u8; 4]) -> Option<ObjectId> {
    ObjectId::from_pick_color([pixel[0], pixel[1], pixel[2]])
}
