//! Light sources
//!
//! A light owns its colors and variant parameters; the slot it occupies is
//! handed out by the owning scene's [`LightSlotAllocator`] when the light
//! node is created.
//!
//! [`LightSlotAllocator`]: crate::scene::LightSlotAllocator

use crate::foundation::math::{Mat4, Vec3, Vec4};
use crate::render::backend::{BackendResult, RenderBackend};
use crate::render::drawable::{DrawMode, Drawable};

/// Spot cutoff value meaning "no cone"
pub const NO_CUTOFF: f32 = 180.0;

/// Per-variant light parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LightVariant {
    /// Omnidirectional light at the node origin
    Point {
        /// Attenuation driver; constant attenuation is `1 / radius`
        radius: f32,
    },
    /// Light at infinity shining along `direction`
    Directional {
        /// Direction towards the light
        direction: Vec3,
    },
    /// Cone light at the node origin
    Spot {
        /// Cone axis
        direction: Vec3,
        /// Cone half-angle in degrees
        cutoff: f32,
        /// Falloff concentration
        exponent: f32,
        /// Attenuation driver; constant attenuation is `100 / radius`
        radius: f32,
    },
}

/// Light state handed to a render backend
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightParams {
    /// Ambient contribution
    pub ambient: Vec4,
    /// Diffuse contribution
    pub diffuse: Vec4,
    /// Specular contribution
    pub specular: Vec4,
    /// Homogeneous position in model space; `w = 0` marks a direction
    pub position: Vec4,
    /// Spot axis in model space
    pub spot_direction: Vec3,
    /// Spot half-angle in degrees, 180 for no cone
    pub spot_cutoff: f32,
    /// Spot exponent
    pub spot_exponent: f32,
    /// Constant attenuation factor
    pub constant_attenuation: f32,
    /// Linear attenuation factor
    pub linear_attenuation: f32,
    /// Quadratic attenuation factor
    pub quadratic_attenuation: f32,
}

/// A light source
#[derive(Debug, Clone, PartialEq)]
pub struct Light {
    /// Slot index, `None` when every slot was taken at creation
    pub slot: Option<u32>,
    /// Ambient color
    pub ambient: Vec3,
    /// Diffuse color
    pub diffuse: Vec3,
    /// Specular color
    pub specular: Vec3,
    /// Variant parameters
    pub variant: LightVariant,
}

impl Light {
    fn with_variant(variant: LightVariant) -> Self {
        Self {
            slot: None,
            ambient: Vec3::zeros(),
            diffuse: Vec3::repeat(1.0),
            specular: Vec3::repeat(1.0),
            variant,
        }
    }

    /// Point light with radius 5
    #[must_use]
    pub fn point() -> Self {
        Self::with_variant(LightVariant::Point { radius: 5.0 })
    }

    /// Directional light pointing along +Y
    #[must_use]
    pub fn directional() -> Self {
        Self::with_variant(LightVariant::Directional { direction: Vec3::y() })
    }

    /// Spot light along +Y, 45 degree cone, exponent 8, radius 1
    #[must_use]
    pub fn spot() -> Self {
        Self::with_variant(LightVariant::Spot {
            direction: Vec3::y(),
            cutoff: 45.0,
            exponent: 8.0,
            radius: 1.0,
        })
    }

    /// Set diffuse and specular to the same color
    #[must_use]
    pub const fn with_color(mut self, color: Vec3) -> Self {
        self.diffuse = color;
        self.specular = color;
        self
    }

    /// Set only the diffuse color
    #[must_use]
    pub const fn with_diffuse(mut self, color: Vec3) -> Self {
        self.diffuse = color;
        self
    }

    /// Set the attenuation radius of a point or spot light
    #[must_use]
    pub fn with_radius(mut self, new_radius: f32) -> Self {
        match &mut self.variant {
            LightVariant::Point { radius } | LightVariant::Spot { radius, .. } => *radius = new_radius,
            LightVariant::Directional { .. } => {}
        }
        self
    }

    /// Type tag matching the node type name
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self.variant {
            LightVariant::Point { .. } => "PointLight",
            LightVariant::Directional { .. } => "DirectionalLight",
            LightVariant::Spot { .. } => "SpotLight",
        }
    }

    /// Fixed-function parameters for this light
    #[must_use]
    pub fn params(&self) -> LightParams {
        let mut params = LightParams {
            ambient: self.ambient.push(1.0),
            diffuse: self.diffuse.push(1.0),
            specular: self.specular.push(1.0),
            position: Vec4::new(0.0, 0.0, 0.0, 1.0),
            spot_direction: -Vec3::z(),
            spot_cutoff: NO_CUTOFF,
            spot_exponent: 0.0,
            constant_attenuation: 1.0,
            linear_attenuation: 0.0,
            quadratic_attenuation: 0.0,
        };

        match self.variant {
            LightVariant::Point { radius } => {
                params.constant_attenuation = 1.0 / radius.max(f32::EPSILON);
            }
            LightVariant::Directional { direction } => {
                params.position = direction.push(0.0);
            }
            LightVariant::Spot {
                direction,
                cutoff,
                exponent,
                radius,
            } => {
                params.spot_direction = direction;
                params.spot_cutoff = cutoff;
                params.spot_exponent = exponent;
                params.constant_attenuation = 100.0 / radius.max(f32::EPSILON);
            }
        }
        params
    }
}

impl Drawable for Light {
    fn draw(&self, backend: &mut dyn RenderBackend, view: &Mat4, mode: DrawMode) -> BackendResult<()> {
        let (DrawMode::Normal, Some(slot)) = (mode, self.slot) else {
            return Ok(());
        };
        backend.load_modelview(view);
        backend.enable_light(slot, &self.params())
    }
}
