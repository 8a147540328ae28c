//! CPU implementation of [`RenderBackend`]
//!
//! Renders into an RGBA8 color buffer and an `f32` depth buffer with
//! per-vertex (Gouraud) fixed-function lighting, perspective-correct
//! interpolation and nearest-neighbour texturing modulated by the vertex
//! color. Overlay text is recorded rather than rasterized so callers can
//! inspect what the frame printed.

mod raster;
mod shading;

pub use raster::{rasterize_triangle, ClipVertex, Fragment};
pub use shading::{shade_vertex, EyeLight};

use std::path::Path;
use std::rc::Rc;

use crate::foundation::math::{Mat4, Vec3, Vec4};
use crate::render::backend::{BackendResult, ClearFlags, DepthFunc, RenderBackend};
use crate::render::geometry::Geometry;
use crate::render::lighting::LightParams;
use crate::render::material::{Material, MaterialParams, Texture};
use crate::render::RenderError;

/// A line of overlay text
#[derive(Debug, Clone, PartialEq)]
pub struct TextItem {
    /// Window x, origin left
    pub x: f32,
    /// Window y, origin bottom
    pub y: f32,
    /// Text content
    pub text: String,
    /// Text color
    pub color: Vec3,
}

/// Counters for one frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Triangles passed to `draw_triangles`
    pub triangles_submitted: u32,
    /// Triangles that reached scan conversion
    pub triangles_rasterized: u32,
    /// Fragments that passed the depth test
    pub fragments_written: u32,
    /// `enable_light` calls
    pub lights_enabled: u32,
}

fn to_u8(channel: f32) -> u8 {
    (channel.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Software rasterizer
#[derive(Debug)]
pub struct SoftwareRasterizer {
    width: u32,
    height: u32,
    color: Vec<[u8; 4]>,
    depth: Vec<f32>,
    clear_color: Vec3,
    projection: Mat4,
    modelview: Mat4,
    lighting: bool,
    global_ambient: Vec3,
    lights: Vec<Option<EyeLight>>,
    material: MaterialParams,
    texture: Option<Rc<Texture>>,
    flat_color: Vec4,
    depth_func: DepthFunc,
    overlay: Vec<TextItem>,
    stats: FrameStats,
    last_frame_stats: FrameStats,
    frames_presented: u64,
}

impl SoftwareRasterizer {
    /// Create a rasterizer with the given framebuffer size and light slots
    #[must_use]
    pub fn new(width: u32, height: u32, max_lights: u32) -> Self {
        let pixels = (width as usize) * (height as usize);
        log::debug!("Software rasterizer {width}x{height} with {max_lights} light slots");
        Self {
            width,
            height,
            color: vec![[0, 0, 0, 255]; pixels],
            depth: vec![1.0; pixels],
            clear_color: Vec3::zeros(),
            projection: Mat4::identity(),
            modelview: Mat4::identity(),
            lighting: true,
            global_ambient: Vec3::repeat(0.2),
            lights: vec![None; max_lights as usize],
            material: Material::default().params(),
            texture: None,
            flat_color: Vec4::new(1.0, 1.0, 1.0, 1.0),
            depth_func: DepthFunc::Less,
            overlay: Vec::new(),
            stats: FrameStats::default(),
            last_frame_stats: FrameStats::default(),
            frames_presented: 0,
        }
    }

    fn index(&self, x: u32, y: u32) -> Option<usize> {
        (x < self.width && y < self.height).then(|| (y as usize) * (self.width as usize) + x as usize)
    }

    /// Depth stored at a pixel (origin bottom-left)
    #[must_use]
    pub fn depth_at(&self, x: u32, y: u32) -> Option<f32> {
        self.index(x, y).map(|i| self.depth[i])
    }

    /// Overlay text recorded since the last color clear
    #[must_use]
    pub fn overlay_text(&self) -> &[TextItem] {
        &self.overlay
    }

    /// Counters of the frame in progress
    #[must_use]
    pub const fn stats(&self) -> &FrameStats {
        &self.stats
    }

    /// Counters of the last presented frame
    #[must_use]
    pub const fn last_frame_stats(&self) -> &FrameStats {
        &self.last_frame_stats
    }

    /// Number of `present` calls
    #[must_use]
    pub const fn frames_presented(&self) -> u64 {
        self.frames_presented
    }

    /// Whether lighting is currently enabled
    #[must_use]
    pub const fn lighting_enabled(&self) -> bool {
        self.lighting
    }

    /// Current depth comparison
    #[must_use]
    pub const fn depth_func(&self) -> DepthFunc {
        self.depth_func
    }

    /// Slots currently enabled
    #[must_use]
    pub fn enabled_light_slots(&self) -> Vec<u32> {
        self.lights
            .iter()
            .enumerate()
            .filter(|(_, light)| light.is_some())
            .map(|(slot, _)| slot as u32)
            .collect()
    }

    /// Eye-space state of a light slot
    #[must_use]
    pub fn light(&self, slot: u32) -> Option<&EyeLight> {
        self.lights.get(slot as usize).and_then(Option::as_ref)
    }

    /// Copy the color buffer into an image with row 0 at the top
    #[must_use]
    pub fn to_image(&self) -> image::RgbaImage {
        image::RgbaImage::from_fn(self.width, self.height, |x, y| {
            let row = self.height - 1 - y;
            let i = (row as usize) * (self.width as usize) + x as usize;
            image::Rgba(self.color[i])
        })
    }

    /// Write the color buffer as a PNG
    pub fn save_png(&self, path: impl AsRef<Path>) -> BackendResult<()> {
        let path = path.as_ref();
        self.to_image()
            .save_with_format(path, image::ImageFormat::Png)
            .map_err(|e| RenderError::RenderingFailed(format!("Failed to save {}: {e}", path.display())))
    }

    fn normal_matrix(&self) -> nalgebra::Matrix3<f32> {
        let upper = self.modelview.fixed_view::<3, 3>(0, 0).into_owned();
        upper
            .try_inverse()
            .map_or(upper, |inverse| inverse.transpose())
    }

    fn write_fragment(&mut self, fragment: &Fragment) -> bool {
        let Some(i) = self.index(fragment.x, fragment.y) else {
            return false;
        };
        if !self.depth_func.passes(fragment.depth, self.depth[i]) {
            return false;
        }
        let mut color = fragment.color;
        if let Some(texture) = &self.texture {
            color = color.component_mul(&texture.sample(&fragment.uv));
        }
        self.color[i] = [to_u8(color.x), to_u8(color.y), to_u8(color.z), to_u8(color.w)];
        self.depth[i] = fragment.depth;
        true
    }
}

impl RenderBackend for SoftwareRasterizer {
    fn max_lights(&self) -> u32 {
        self.lights.len() as u32
    }

    fn viewport(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn resize(&mut self, width: u32, height: u32) {
        if (width, height) == (self.width, self.height) {
            return;
        }
        log::debug!("Resizing software framebuffer to {width}x{height}");
        let pixels = (width as usize) * (height as usize);
        self.width = width;
        self.height = height;
        self.color = vec![[0, 0, 0, 255]; pixels];
        self.depth = vec![1.0; pixels];
    }

    fn set_clear_color(&mut self, color: Vec3) {
        self.clear_color = color;
    }

    fn clear_color(&self) -> Vec3 {
        self.clear_color
    }

    fn clear(&mut self, flags: ClearFlags) {
        if flags.contains(ClearFlags::COLOR) {
            let c = self.clear_color;
            self.color.fill([to_u8(c.x), to_u8(c.y), to_u8(c.z), 255]);
            self.overlay.clear();
            self.stats = FrameStats::default();
        }
        if flags.contains(ClearFlags::DEPTH) {
            self.depth.fill(1.0);
        }
    }

    fn set_projection(&mut self, projection: &Mat4) {
        self.projection = *projection;
    }

    fn load_modelview(&mut self, modelview: &Mat4) {
        self.modelview = *modelview;
    }

    fn set_lighting(&mut self, enabled: bool) {
        self.lighting = enabled;
    }

    fn set_global_ambient(&mut self, ambient: Vec3) {
        self.global_ambient = ambient;
    }

    fn enable_light(&mut self, slot: u32, params: &LightParams) -> BackendResult<()> {
        let max = self.max_lights();
        let modelview = self.modelview;
        let entry = self
            .lights
            .get_mut(slot as usize)
            .ok_or(RenderError::InvalidLightSlot { slot, max })?;
        *entry = Some(EyeLight {
            params: *params,
            position: modelview * params.position,
            spot_direction: modelview.fixed_view::<3, 3>(0, 0) * params.spot_direction,
        });
        self.stats.lights_enabled += 1;
        Ok(())
    }

    fn disable_light(&mut self, slot: u32) {
        if let Some(entry) = self.lights.get_mut(slot as usize) {
            *entry = None;
        }
    }

    fn set_material(&mut self, material: &MaterialParams) {
        self.material = *material;
    }

    fn bind_texture(&mut self, texture: Option<Rc<Texture>>) {
        self.texture = texture;
    }

    fn set_color(&mut self, color: Vec4) {
        self.flat_color = color;
    }

    fn set_depth_func(&mut self, func: DepthFunc) {
        self.depth_func = func;
    }

    fn draw_triangles(&mut self, geometry: &Geometry) -> BackendResult<()> {
        let normal_matrix = self.normal_matrix();
        let vertices: Vec<ClipVertex> = geometry
            .positions()
            .iter()
            .zip(geometry.normals())
            .zip(geometry.uvs())
            .map(|((position, normal), uv)| {
                let eye = self.modelview * position.push(1.0);
                let color = if self.lighting {
                    let eye_normal = (normal_matrix * normal)
                        .try_normalize(f32::EPSILON)
                        .unwrap_or_else(Vec3::z);
                    shade_vertex(
                        &self.material,
                        &self.global_ambient,
                        &self.lights,
                        &eye.xyz(),
                        &eye_normal,
                    )
                } else {
                    self.flat_color
                };
                ClipVertex {
                    clip: self.projection * eye,
                    color,
                    uv: *uv,
                }
            })
            .collect();

        let (width, height) = (self.width, self.height);
        let mut fragments = Vec::new();
        for face in geometry.faces() {
            self.stats.triangles_submitted += 1;
            let corners = [
                &vertices[face[0] as usize],
                &vertices[face[1] as usize],
                &vertices[face[2] as usize],
            ];
            if rasterize_triangle(corners, width, height, |f| fragments.push(f)) {
                self.stats.triangles_rasterized += 1;
            }
            for fragment in fragments.drain(..) {
                if self.write_fragment(&fragment) {
                    self.stats.fragments_written += 1;
                }
            }
        }
        Ok(())
    }

    fn draw_text(&mut self, x: f32, y: f32, text: &str, color: Vec3) {
        self.overlay.push(TextItem {
            x,
            y,
            text: text.to_string(),
            color,
        });
    }

    fn read_pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        self.index(x, y).map(|i| self.color[i])
    }

    fn present(&mut self) {
        self.last_frame_stats = self.stats;
        self.frames_presented += 1;
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
        self
    }
}
