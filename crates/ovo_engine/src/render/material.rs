//! Surface materials and textures

use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;

use crate::assets::{AssetError, ImageData};
use crate::foundation::math::{Vec2, Vec3, Vec4};

/// A decoded texture image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Texture {
    name: String,
    image: ImageData,
}

impl Texture {
    /// Wrap an already decoded image
    #[must_use]
    pub fn from_image(name: impl Into<String>, image: ImageData) -> Self {
        Self {
            name: name.into(),
            image,
        }
    }

    /// Decode an image file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, AssetError> {
        let path = path.as_ref();
        let image = ImageData::from_file(path)?;
        Ok(Self::from_image(path.display().to_string(), image))
    }

    /// Name or source path
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Texel data
    #[must_use]
    pub const fn image(&self) -> &ImageData {
        &self.image
    }

    /// Nearest-neighbour lookup with repeat wrapping
    ///
    /// `v = 0` is the bottom row of the image.
    #[must_use]
    pub fn sample(&self, uv: &Vec2) -> Vec4 {
        let (width, height) = (self.image.width, self.image.height);
        if width == 0 || height == 0 {
            return Vec4::new(1.0, 1.0, 1.0, 1.0);
        }
        let u = uv.x - uv.x.floor();
        let v = uv.y - uv.y.floor();
        let x = ((u * width as f32) as u32).min(width - 1);
        let y = (((1.0 - v) * height as f32) as u32).min(height - 1);
        self.image.pixel(x, y).map_or_else(
            || Vec4::new(1.0, 1.0, 1.0, 1.0),
            |[r, g, b, a]| {
                Vec4::new(
                    f32::from(r) / 255.0,
                    f32::from(g) / 255.0,
                    f32::from(b) / 255.0,
                    f32::from(a) / 255.0,
                )
            },
        )
    }
}

/// Material state handed to a render backend
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaterialParams {
    /// Emitted color
    pub emission: Vec4,
    /// Ambient reflectance
    pub ambient: Vec4,
    /// Diffuse reflectance, alpha in `w`
    pub diffuse: Vec4,
    /// Specular reflectance
    pub specular: Vec4,
    /// Specular exponent
    pub shininess: f32,
}

/// Material shared between meshes
pub type SharedMaterial = Rc<RefCell<Material>>;

/// Fixed-function surface description
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    /// Material name
    pub name: String,
    /// Emitted color
    pub emission: Vec3,
    /// Ambient reflectance
    pub ambient: Vec3,
    /// Diffuse reflectance
    pub diffuse: Vec3,
    /// Specular reflectance
    pub specular: Vec3,
    /// Specular exponent, at least 0
    pub shininess: f32,
    /// Opacity in `[0, 1]`
    pub alpha: f32,
    /// Optional base color texture
    pub texture: Option<Rc<Texture>>,
}

impl Default for Material {
    fn default() -> Self {
        Self::new("default")
    }
}

impl Material {
    /// Neutral gray material with no texture
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            emission: Vec3::zeros(),
            ambient: Vec3::repeat(0.75),
            diffuse: Vec3::repeat(0.75),
            specular: Vec3::repeat(0.75),
            shininess: 64.0,
            alpha: 1.0,
            texture: None,
        }
    }

    /// Map PBR parameters onto the fixed-function model
    ///
    /// Ambient, diffuse and specular all take the albedo; shininess is
    /// `(1 - sqrt(roughness)) * 128`.
    #[must_use]
    pub fn from_pbr(name: impl Into<String>, emission: Vec3, albedo: Vec3, roughness: f32, alpha: f32) -> Self {
        Self {
            name: name.into(),
            emission,
            ambient: albedo,
            diffuse: albedo,
            specular: albedo,
            shininess: ((1.0 - roughness.clamp(0.0, 1.0).sqrt()) * 128.0).max(0.0),
            alpha: alpha.clamp(0.0, 1.0),
            texture: None,
        }
    }

    /// Flat black material used for shadow decals
    #[must_use]
    pub fn shadow() -> Self {
        Self {
            name: "shadow".to_string(),
            emission: Vec3::zeros(),
            ambient: Vec3::zeros(),
            diffuse: Vec3::zeros(),
            specular: Vec3::zeros(),
            shininess: 0.0,
            alpha: 1.0,
            texture: None,
        }
    }

    /// Set the emission color
    #[must_use]
    pub fn with_emission(mut self, emission: Vec3) -> Self {
        self.emission = emission;
        self
    }

    /// Set the diffuse color
    #[must_use]
    pub fn with_diffuse(mut self, diffuse: Vec3) -> Self {
        self.diffuse = diffuse;
        self
    }

    /// Set the texture
    #[must_use]
    pub fn with_texture(mut self, texture: Rc<Texture>) -> Self {
        self.texture = Some(texture);
        self
    }

    /// Wrap into a shareable handle
    #[must_use]
    pub fn into_shared(self) -> SharedMaterial {
        Rc::new(RefCell::new(self))
    }

    /// Parameters for the backend
    #[must_use]
    pub fn params(&self) -> MaterialParams {
        MaterialParams {
            emission: self.emission.push(1.0),
            ambient: self.ambient.push(1.0),
            diffuse: self.diffuse.push(self.alpha),
            specular: self.specular.push(1.0),
            shininess: self.shininess,
        }
    }
}
