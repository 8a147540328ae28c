//! Triangle setup and scan conversion

use crate::foundation::math::{Vec2, Vec3, Vec4};

/// A vertex after lighting and projection
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClipVertex {
    /// Clip-space position
    pub clip: Vec4,
    /// Vertex color
    pub color: Vec4,
    /// Texture coordinate
    pub uv: Vec2,
}

/// One covered pixel with perspective-correct attributes
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fragment {
    /// Pixel column
    pub x: u32,
    /// Pixel row, 0 at the bottom
    pub y: u32,
    /// Window depth in `[0, 1]`
    pub depth: f32,
    /// Interpolated color
    pub color: Vec4,
    /// Interpolated texture coordinate
    pub uv: Vec2,
}

const MIN_W: f32 = 1e-6;

fn edge(a: &Vec2, b: &Vec2, c: &Vec2) -> f32 {
    (c.x - a.x).mul_add(b.y - a.y, -((c.y - a.y) * (b.x - a.x)))
}

/// Scan-convert one triangle into fragments
///
/// Returns `false` when the triangle is rejected before scan conversion:
/// a vertex at or behind the eye plane, zero screen area, or no overlap
/// with the viewport. Both windings are drawn.
pub fn rasterize_triangle(
    vertices: [&ClipVertex; 3],
    width: u32,
    height: u32,
    mut emit: impl FnMut(Fragment),
) -> bool {
    if width == 0 || height == 0 || vertices.iter().any(|v| v.clip.w <= MIN_W) {
        return false;
    }

    let mut screen = [Vec2::zeros(); 3];
    let mut depth = [0.0f32; 3];
    let mut inv_w = [0.0f32; 3];
    for (i, vertex) in vertices.iter().enumerate() {
        inv_w[i] = 1.0 / vertex.clip.w;
        let ndc = Vec3::new(vertex.clip.x, vertex.clip.y, vertex.clip.z) * inv_w[i];
        screen[i] = Vec2::new(
            (ndc.x * 0.5 + 0.5) * width as f32,
            (ndc.y * 0.5 + 0.5) * height as f32,
        );
        depth[i] = ndc.z * 0.5 + 0.5;
    }

    let area = edge(&screen[0], &screen[1], &screen[2]);
    if area.abs() <= f32::EPSILON {
        return false;
    }

    let min_x = screen.iter().map(|p| p.x).fold(f32::INFINITY, f32::min).floor().max(0.0);
    let min_y = screen.iter().map(|p| p.y).fold(f32::INFINITY, f32::min).floor().max(0.0);
    let max_x = screen.iter().map(|p| p.x).fold(f32::NEG_INFINITY, f32::max).ceil().min(width as f32 - 1.0);
    let max_y = screen.iter().map(|p| p.y).fold(f32::NEG_INFINITY, f32::max).ceil().min(height as f32 - 1.0);
    if min_x > max_x || min_y > max_y {
        return false;
    }

    for py in (min_y as u32)..=(max_y as u32) {
        for px in (min_x as u32)..=(max_x as u32) {
            let p = Vec2::new(px as f32 + 0.5, py as f32 + 0.5);
            let b0 = edge(&screen[1], &screen[2], &p) / area;
            let b1 = edge(&screen[2], &screen[0], &p) / area;
            let b2 = edge(&screen[0], &screen[1], &p) / area;
            if b0 < 0.0 || b1 < 0.0 || b2 < 0.0 {
                continue;
            }

            let z = b2.mul_add(depth[2], b0.mul_add(depth[0], b1 * depth[1]));
            if !(0.0..=1.0).contains(&z) {
                continue;
            }

            let weights = [b0 * inv_w[0], b1 * inv_w[1], b2 * inv_w[2]];
            let total = weights[0] + weights[1] + weights[2];
            if total <= f32::EPSILON {
                continue;
            }
            let color = (vertices[0].color * weights[0]
                + vertices[1].color * weights[1]
                + vertices[2].color * weights[2])
                / total;
            let uv = (vertices[0].uv * weights[0] + vertices[1].uv * weights[1] + vertices[2].uv * weights[2])
                / total;

            emit(Fragment {
                x: px,
                y: py,
                depth: z,
                color,
                uv,
            });
        }
    }
    true
}
