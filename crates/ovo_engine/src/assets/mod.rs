//! Asset loading
//!
//! Texture images are decoded through the `image` crate; scene files use
//! the chunked OVO format handled by [`scene_file`].

pub mod image_loader;
pub mod scene_file;

pub use image_loader::ImageData;
pub use scene_file::{SceneFileError, SceneLoader};

/// Asset loading errors
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    /// Asset not found
    #[error("Asset not found: {0}")]
    NotFound(String),

    /// Asset loading failed
    #[error("Asset loading failed: {0}")]
    LoadFailed(String),
}
