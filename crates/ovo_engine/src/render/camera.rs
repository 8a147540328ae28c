//! Perspective camera

use crate::foundation::math::{Mat4, Mat4Ext};
use crate::render::backend::{BackendResult, RenderBackend};
use crate::render::drawable::{DrawMode, Drawable};

/// Perspective projection parameters
///
/// Only the active camera configures the projection when drawn; the engine
/// activates exactly one camera at a time.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    /// Vertical field of view in degrees
    pub fov: f32,
    /// Near clip distance
    pub near: f32,
    /// Far clip distance
    pub far: f32,
    width: u32,
    height: u32,
    active: bool,
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}

impl Camera {
    /// 90 degree camera with near 0.01 and far 1000
    #[must_use]
    pub const fn new() -> Self {
        Self {
            fov: 90.0,
            near: 0.01,
            far: 1000.0,
            width: 1,
            height: 1,
            active: false,
        }
    }

    /// Set the field of view
    #[must_use]
    pub const fn with_fov(mut self, fov: f32) -> Self {
        self.fov = fov;
        self
    }

    /// Set near and far clip distances
    #[must_use]
    pub const fn with_clip(mut self, near: f32, far: f32) -> Self {
        self.near = near;
        self.far = far;
        self
    }

    /// Window size used for the aspect ratio
    #[must_use]
    pub const fn window_size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Update the window size; zero dimensions are clamped to 1
    pub fn set_window_size(&mut self, width: u32, height: u32) {
        self.width = width.max(1);
        self.height = height.max(1);
    }

    /// Width over height
    #[must_use]
    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height as f32
    }

    /// Whether this camera drives the projection
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Mark this camera as the active one
    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    /// Projection matrix
    #[must_use]
    pub fn projection(&self) -> Mat4 {
        Mat4::perspective_gl(self.fov, self.aspect(), self.near, self.far)
    }
}

impl Drawable for Camera {
    fn draw(&self, backend: &mut dyn RenderBackend, _view: &Mat4, _mode: DrawMode) -> BackendResult<()> {
        if self.active {
            backend.set_projection(&self.projection());
        }
        Ok(())
    }
}
