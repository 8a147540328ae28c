//! Per-node draw capability

use crate::foundation::math::Mat4;
use crate::render::backend::{BackendResult, RenderBackend};

/// How a frame pass draws its entries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DrawMode {
    /// Lit, textured rendering
    #[default]
    Normal,
    /// Flat color encoding an object id; lights contribute nothing
    Picking([u8; 3]),
}

/// Something that knows how to put itself into the current frame
///
/// `view` is the inverse camera matrix times the entry's world matrix.
pub trait Drawable {
    /// Issue this entry's backend calls
    fn draw(&self, backend: &mut dyn RenderBackend, view: &Mat4, mode: DrawMode) -> BackendResult<()>;
}
