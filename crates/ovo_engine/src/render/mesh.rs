//! Mesh node payload and the shadow material override

use std::ops::Deref;
use std::rc::Rc;

use crate::foundation::math::{Mat4, Vec4};
use crate::render::backend::{BackendResult, RenderBackend};
use crate::render::drawable::{DrawMode, Drawable};
use crate::render::geometry::Geometry;
use crate::render::material::{Material, SharedMaterial};

/// Geometry plus the material it is drawn with
#[derive(Debug, Clone)]
pub struct Mesh {
    geometry: Geometry,
    material: SharedMaterial,
    /// Whether the shadow decal pass draws this mesh
    pub casts_shadow: bool,
    /// World-space Y offset applied to this mesh's shadow decal
    pub shadow_offset: f32,
}

impl Default for Mesh {
    fn default() -> Self {
        Self::new(Geometry::empty())
    }
}

impl Mesh {
    /// Mesh with the default material, casting shadows
    #[must_use]
    pub fn new(geometry: Geometry) -> Self {
        Self {
            geometry,
            material: Material::default().into_shared(),
            casts_shadow: true,
            shadow_offset: 0.0,
        }
    }

    /// Use a shared material
    #[must_use]
    pub fn with_material(mut self, material: SharedMaterial) -> Self {
        self.material = material;
        self
    }

    /// Geometry buffers
    #[must_use]
    pub const fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    /// Replace the geometry
    pub fn set_geometry(&mut self, geometry: Geometry) {
        self.geometry = geometry;
    }

    /// Current material
    #[must_use]
    pub const fn material(&self) -> &SharedMaterial {
        &self.material
    }

    /// Replace the material
    pub fn set_material(&mut self, material: SharedMaterial) {
        self.material = material;
    }
}

impl Drawable for Mesh {
    fn draw(&self, backend: &mut dyn RenderBackend, view: &Mat4, mode: DrawMode) -> BackendResult<()> {
        backend.load_modelview(view);
        match mode {
            DrawMode::Normal => {
                let material = self.material.borrow();
                backend.set_material(&material.params());
                backend.bind_texture(material.texture.clone());
            }
            DrawMode::Picking([r, g, b]) => {
                backend.bind_texture(None);
                backend.set_color(Vec4::new(
                    f32::from(r) / 255.0,
                    f32::from(g) / 255.0,
                    f32::from(b) / 255.0,
                    1.0,
                ));
            }
        }
        backend.draw_triangles(&self.geometry)
    }
}

/// Temporarily swaps a mesh's material, restoring it on drop
///
/// Restoration happens on every exit path, including early returns and `?`.
pub struct MaterialOverride<'a> {
    mesh: &'a mut Mesh,
    original: Option<SharedMaterial>,
}

impl<'a> MaterialOverride<'a> {
    /// Swap in `replacement` until the guard is dropped
    pub fn new(mesh: &'a mut Mesh, replacement: SharedMaterial) -> Self {
        let original = std::mem::replace(&mut mesh.material, replacement);
        Self {
            mesh,
            original: Some(original),
        }
    }
}

impl Deref for MaterialOverride<'_> {
    type Target = Mesh;

    fn deref(&self) -> &Mesh {
        &*self.mesh
    }
}

impl Drop for MaterialOverride<'_> {
    fn drop(&mut self) {
        if let Some(original) = self.original.take() {
            self.mesh.material = original;
        }
    }
}

/// Whether two handles refer to the same material
#[must_use]
pub fn same_material(a: &SharedMaterial, b: &SharedMaterial) -> bool {
    Rc::ptr_eq(a, b)
}
