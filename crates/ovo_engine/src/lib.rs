//! # OVO Engine
//!
//! A small fixed-function 3D engine: a scene graph, a loader for the chunked
//! binary OVO scene format, a render pipeline with a shadow decal pass and
//! text overlay, and color-id object picking.
//!
//! ## Features
//!
//! - **Scene graph**: arena-backed tree with per-scene object ids and light slots
//! - **OVO loader**: nodes, lights, materials and meshes with packed normals and half-float UVs
//! - **Fixed-function pipeline**: GL-style lighting model behind a [`render::RenderBackend`] trait
//! - **Software rasterizer**: CPU backend for headless rendering and tests
//! - **Picking**: one flat-color pass maps a window pixel back to a node
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ovo_engine::prelude::*;
//!
//! struct Viewer;
//!
//! impl Application for Viewer {
//!     fn initialize(&mut self, engine: &mut Engine) -> Result<(), AppError> {
//!         engine.load_scene("chess.ovo")?;
//!         let camera = engine
//!             .find_object_by_name("Camera")
//!             .ok_or_else(|| AppError::Custom("no camera".into()))?;
//!         engine.set_active_camera(camera)?;
//!         Ok(())
//!     }
//!
//!     fn update(&mut self, engine: &mut Engine, _delta_time: f32) -> Result<(), AppError> {
//!         engine.set_screen_text("Press q to quit");
//!         Ok(())
//!     }
//!
//!     fn cleanup(&mut self, _engine: &mut Engine) {}
//! }
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = EngineConfig::load_or_default("engine.toml")?;
//!     ovo_engine::foundation::logging::init_with_level(&config.log_level);
//!     let backend = SoftwareRasterizer::new(config.window.width, config.window.height, config.render.max_lights);
//!     let mut engine = Engine::new(config, Box::new(backend))?;
//!     engine.run(&mut Viewer)?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod assets;
pub mod config;
pub mod core;
pub mod events;
pub mod foundation;
pub mod input;
pub mod render;
pub mod scene;

mod application;
mod engine;

pub use application::{AppError, Application};
pub use engine::{BlinkCallback, Engine, EngineError, KeyboardCallback, MouseCallback, SpecialCallback};

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        assets::scene_file::{ChunkWriter, SceneFileError, SceneLoader},
        core::config::{Config, EngineConfig},
        events::EngineEvent,
        foundation::math::{Mat4, Vec2, Vec3, Vec4},
        input::{ButtonState, MouseButton, SpecialKey},
        render::{Camera, Geometry, Light, Material, Mesh, RenderBackend, SoftwareRasterizer, Texture},
        scene::{EmissionPulse, NodeId, NodeKind, ObjectId, Scene, SceneError},
        AppError, Application, Engine, EngineError,
    };
}
