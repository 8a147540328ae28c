//! Backend abstraction for the fixed-function pipeline
//!
//! The frame renderer talks to its raster target only through
//! [`RenderBackend`]. The state model follows classic fixed-function GL: a
//! current projection and modelview matrix, numbered light slots whose
//! positions are captured in eye space when they are enabled, a current
//! material or flat color, an optional bound texture and a depth test.

use std::rc::Rc;

use bitflags::bitflags;

use crate::foundation::math::{Mat4, Vec3, Vec4};
use crate::render::geometry::Geometry;
use crate::render::lighting::LightParams;
use crate::render::material::{MaterialParams, Texture};
use crate::render::RenderError;

/// Result type for backend operations
pub type BackendResult<T> = Result<T, RenderError>;

bitflags! {
    /// Buffers affected by [`RenderBackend::clear`]
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ClearFlags: u8 {
        /// Color buffer (also drops recorded overlay text)
        const COLOR = 0b01;
        /// Depth buffer
        const DEPTH = 0b10;
    }
}

/// Depth comparison used by the depth test
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DepthFunc {
    /// Pass when closer than the stored depth
    #[default]
    Less,
    /// Pass when closer than or equal to the stored depth
    LessEqual,
}

impl DepthFunc {
    /// Whether a fragment at `incoming` depth passes against `stored`
    #[must_use]
    pub fn passes(self, incoming: f32, stored: f32) -> bool {
        match self {
            Self::Less => incoming < stored,
            Self::LessEqual => incoming <= stored,
        }
    }
}

/// Fixed-function rendering backend
pub trait RenderBackend {
    /// Number of light slots
    fn max_lights(&self) -> u32;

    /// Current framebuffer size
    fn viewport(&self) -> (u32, u32);

    /// Resize the framebuffer
    fn resize(&mut self, width: u32, height: u32);

    /// Color used by [`ClearFlags::COLOR`]
    fn set_clear_color(&mut self, color: Vec3);

    /// Current clear color
    fn clear_color(&self) -> Vec3;

    /// Clear the selected buffers
    fn clear(&mut self, flags: ClearFlags);

    /// Replace the projection matrix
    fn set_projection(&mut self, projection: &Mat4);

    /// Replace the modelview matrix
    fn load_modelview(&mut self, modelview: &Mat4);

    /// Enable or disable lighting; when disabled the flat color is used
    fn set_lighting(&mut self, enabled: bool);

    /// Scene-wide ambient light
    fn set_global_ambient(&mut self, ambient: Vec3);

    /// Enable a light slot; position and direction are taken relative to
    /// the current modelview matrix
    fn enable_light(&mut self, slot: u32, params: &LightParams) -> BackendResult<()>;

    /// Disable a light slot
    fn disable_light(&mut self, slot: u32);

    /// Set the current material
    fn set_material(&mut self, material: &MaterialParams);

    /// Bind a texture, or unbind with `None`
    fn bind_texture(&mut self, texture: Option<Rc<Texture>>);

    /// Flat color used while lighting is disabled
    fn set_color(&mut self, color: Vec4);

    /// Set the depth comparison
    fn set_depth_func(&mut self, func: DepthFunc);

    /// Draw indexed triangles with the current state
    fn draw_triangles(&mut self, geometry: &Geometry) -> BackendResult<()>;

    /// Draw overlay text at window coordinates (origin bottom-left)
    fn draw_text(&mut self, x: f32, y: f32, text: &str, color: Vec3);

    /// Read back one pixel (origin bottom-left)
    fn read_pixel(&self, x: u32, y: u32) -> Option<[u8; 4]>;

    /// Finish the frame
    fn present(&mut self);

    /// Downcast to concrete backend type for inspection
    fn as_any(&self) -> &dyn std::any::Any;

    /// Downcast to mutable concrete backend type
    fn as_any_mut(&mut self) -> &mut dyn std::any::Any;
}
