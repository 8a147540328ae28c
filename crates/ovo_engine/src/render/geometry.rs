//! Immutable per-mesh vertex and face buffers

use crate::foundation::math::{Vec2, Vec3};

/// Geometry validation errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GeometryError {
    /// Attribute arrays disagree on the vertex count
    #[error("attribute length mismatch: {positions} positions, {normals} normals, {uvs} uvs")]
    LengthMismatch {
        /// Position count
        positions: usize,
        /// Normal count
        normals: usize,
        /// UV count
        uvs: usize,
    },

    /// A face references a vertex that does not exist
    #[error("face {face} references vertex {index} but only {vertex_count} exist")]
    IndexOutOfRange {
        /// Face number
        face: usize,
        /// Offending index
        index: u32,
        /// Number of vertices
        vertex_count: usize,
    },
}

/// Vertex positions, normals and UVs plus indexed triangles
///
/// Construction validates that all attribute arrays have the same length and
/// that every face index is in range; after that the buffers never change.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Geometry {
    positions: Vec<Vec3>,
    normals: Vec<Vec3>,
    uvs: Vec<Vec2>,
    faces: Vec<[u32; 3]>,
}

impl Geometry {
    /// Build validated geometry
    pub fn new(
        positions: Vec<Vec3>,
        normals: Vec<Vec3>,
        uvs: Vec<Vec2>,
        faces: Vec<[u32; 3]>,
    ) -> Result<Self, GeometryError> {
        if positions.len() != normals.len() || positions.len() != uvs.len() {
            return Err(GeometryError::LengthMismatch {
                positions: positions.len(),
                normals: normals.len(),
                uvs: uvs.len(),
            });
        }

        let vertex_count = positions.len();
        for (face, indices) in faces.iter().enumerate() {
            if let Some(&index) = indices.iter().find(|&&i| i as usize >= vertex_count) {
                return Err(GeometryError::IndexOutOfRange {
                    face,
                    index,
                    vertex_count,
                });
            }
        }

        Ok(Self {
            positions,
            normals,
            uvs,
            faces,
        })
    }

    /// Geometry with no vertices
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Vertex positions
    #[must_use]
    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    /// Vertex normals
    #[must_use]
    pub fn normals(&self) -> &[Vec3] {
        &self.normals
    }

    /// Vertex texture coordinates
    #[must_use]
    pub fn uvs(&self) -> &[Vec2] {
        &self.uvs
    }

    /// Triangles
    #[must_use]
    pub fn faces(&self) -> &[[u32; 3]] {
        &self.faces
    }

    /// Number of vertices
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Number of triangles
    #[must_use]
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Whether there is nothing to draw
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    /// Lowest Y coordinate, used to rest objects on a plane
    #[must_use]
    pub fn min_y(&self) -> Option<f32> {
        self.positions.iter().map(|p| p.y).reduce(f32::min)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad_positions() -> Vec<Vec3> {
        vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(1.0, 1.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
        ]
    }

    #[test]
    fn test_valid_quad() {
        let geometry = Geometry::new(
            quad_positions(),
            vec![Vec3::z(); 4],
            vec![Vec2::zeros(); 4],
            vec![[0, 1, 2], [0, 2, 3]],
        )
        .unwrap();
        assert_eq!(geometry.vertex_count(), 4);
        assert_eq!(geometry.face_count(), 2);
        assert_eq!(geometry.min_y(), Some(0.0));
    }

    #[test]
    fn test_index_out_of_range() {
        let result = Geometry::new(
            quad_positions(),
            vec![Vec3::z(); 4],
            vec![Vec2::zeros(); 4],
            vec![[0, 1, 2], [0, 2, 4]],
        );
        assert_eq!(
            result,
            Err(GeometryError::IndexOutOfRange {
                face: 1,
                index: 4,
                vertex_count: 4
            })
        );
    }

    #[test]
    fn test_length_mismatch() {
        let result = Geometry::new(quad_positions(), vec![Vec3::z(); 3], vec![Vec2::zeros(); 4], vec![]);
        assert!(matches!(result, Err(GeometryError::LengthMismatch { .. })));
    }

    #[test]
    fn test_empty() {
        let geometry = Geometry::empty();
        assert!(geometry.is_empty());
        assert_eq!(geometry.min_y(), None);
    }
}
