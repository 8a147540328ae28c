//! Fixed-function rendering
//!
//! Data types for what gets drawn (geometry, materials, lights, cameras,
//! meshes), the [`RenderBackend`] seam the frame renderer draws through, and
//! a CPU [`SoftwareRasterizer`] implementing it.

pub mod backend;
pub mod camera;
pub mod drawable;
pub mod geometry;
pub mod lighting;
pub mod material;
pub mod mesh;
pub mod software;

pub use backend::{BackendResult, ClearFlags, DepthFunc, RenderBackend};
pub use camera::Camera;
pub use drawable::{DrawMode, Drawable};
pub use geometry::{Geometry, GeometryError};
pub use lighting::{Light, LightParams, LightVariant};
pub use material::{Material, MaterialParams, SharedMaterial, Texture};
pub use mesh::{same_material, MaterialOverride, Mesh};
pub use software::SoftwareRasterizer;

/// Rendering errors
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// Backend could not be set up
    #[error("Renderer initialization failed: {0}")]
    InitializationFailed(String),

    /// A draw or state call failed
    #[error("Rendering failed: {0}")]
    RenderingFailed(String),

    /// A light slot outside the backend's range
    #[error("Light slot {slot} exceeds the maximum of {max}")]
    InvalidLightSlot {
        /// Requested slot
        slot: u32,
        /// Number of slots the backend has
        max: u32,
    },
}
