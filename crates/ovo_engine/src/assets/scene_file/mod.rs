//! OVO scene files
//!
//! A scene file is a flat run of `{u32 type, u32 size, payload}` chunks in
//! little-endian order. Node, light and mesh chunks each declare how many of
//! the following hierarchy chunks are their children; material chunks feed a
//! side table that later meshes reference by name.
//!
//! - [`reader`]: bounds-checked cursor over a payload
//! - [`chunks`]: chunk records and payload decoders
//! - [`packing`]: 10-10-10-2 normal and half-float UV packing
//! - [`loader`]: builds scene nodes from a chunk stream
//! - [`writer`]: encodes chunk streams

pub mod chunks;
pub mod loader;
pub mod packing;
pub mod reader;
pub mod writer;

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::scene::SceneError;

pub use chunks::{
    ChunkType, HullRecord, LightRecord, LightSubtype, LodRecord, MaterialRecord, MeshRecord, NodeRecord,
    NONE_NAME,
};
pub use loader::{SceneLoader, SCENE_ROOT_NAME};
pub use reader::{ChunkReader, ReadError};
pub use writer::{ChunkWriter, PayloadWriter};

/// Scene file loading errors
#[derive(Error, Debug)]
pub enum SceneFileError {
    /// The file could not be opened or read
    #[error("Failed to open scene file {path}: {source}")]
    Open {
        /// File path
        path: PathBuf,
        /// Underlying error
        source: io::Error,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),


    /// The loaded nodes could not be attached
    #[error("Scene error: {0}")]
    Scene(#[from] SceneError),
}
