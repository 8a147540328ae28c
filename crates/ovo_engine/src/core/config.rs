//! # Engine Configuration
//!
//! Every tunable constant of the engine lives here so applications can load
//! it from a TOML or RON file instead of recompiling.
//!
//! ## Configuration Categories
//!
//! - **Window**: title and initial framebuffer size
//! - **Render**: light slot count, clear color, global ambient, shadow decal squash
//! - **Timing**: periodic tick interval and FPS sample length
//! - **Loader**: scene-file decoding constants and texture lookup

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub use crate::config::{Config, ConfigError};

/// Window configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Window title
    pub title: String,
    /// Framebuffer width in pixels
    pub width: u32,
    /// Framebuffer height in pixels
    pub height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "OVO Engine".to_string(),
            width: 800,
            height: 600,
        }
    }
}

/// Fixed-function pipeline configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Number of hardware light slots
    pub max_lights: u32,
    /// Background color
    pub clear_color: [f32; 3],
    /// Scene-wide ambient term added to every lit vertex
    pub global_ambient: [f32; 3],
    /// Y scale of the shadow decal matrix
    pub shadow_squash: f32,
    /// Color of the FPS counter and status text
    pub overlay_text_color: [f32; 3],
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            max_lights: 8,
            clear_color: [0.0, 0.0, 0.0],
            global_ambient: [0.2, 0.2, 0.2],
            shadow_squash: 0.05,
            overlay_text_color: [1.0, 1.0, 1.0],
        }
    }
}

/// Periodic timer configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Milliseconds between ticks
    pub tick_interval_ms: u64,
    /// Ticks per FPS sample
    pub ticks_per_fps_sample: u32,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 50,
            ticks_per_fps_sample: 20,
        }
    }
}

/// Scene-file loader configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// Point light radii in the file are divided by this
    pub point_light_radius_divisor: f32,
    /// Directory searched for textures; `None` means the scene file's directory
    pub texture_dir: Option<PathBuf>,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            point_light_radius_divisor: 250.0,
            texture_dir: None,
        }
    }
}

/// Top-level engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Default log filter used when `RUST_LOG` is unset
    pub log_level: String,
    /// Window settings
    pub window: WindowConfig,
    /// Renderer settings
    pub render: RenderConfig,
    /// Timer settings
    pub timing: TimingConfig,
    /// Loader settings
    pub loader: LoaderConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            window: WindowConfig::default(),
            render: RenderConfig::default(),
            timing: TimingConfig::default(),
            loader: LoaderConfig::default(),
        }
    }
}

impl Config for EngineConfig {}

impl EngineConfig {
    /// Set the window size
    #[must_use]
    pub fn with_window_size(mut self, width: u32, height: u32) -> Self {
        self.window.width = width;
        self.window.height = height;
        self
    }

    /// Set the window title
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.window.title = title.into();
        self
    }

    /// Set the number of light slots
    #[must_use]
    pub fn with_max_lights(mut self, max_lights: u32) -> Self {
        self.render.max_lights = max_lights;
        self
    }

    /// Set the texture lookup directory
    #[must_use]
    pub fn with_texture_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.loader.texture_dir = Some(dir.into());
        self
    }

    /// Check that every value is usable
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.window.width == 0 || self.window.height == 0 {
            return Err(ConfigError::Invalid(format!(
                "window size {}x{} must be non-zero",
                self.window.width, self.window.height
            )));
        }
        if self.render.max_lights == 0 {
            return Err(ConfigError::Invalid("max_lights must be at least 1".to_string()));
        }
        if self.timing.tick_interval_ms == 0 || self.timing.ticks_per_fps_sample == 0 {
            return Err(ConfigError::Invalid(
                "tick interval and FPS sample length must be non-zero".to_string(),
            ));
        }
        if self.loader.point_light_radius_divisor <= 0.0 {
            return Err(ConfigError::Invalid(
                "point_light_radius_divisor must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
