//! Scene file encoder
//!
//! Produces byte streams in exactly the layout [`super::SceneLoader`] reads.
//! Used to author small scenes in code and to build test fixtures.

use std::io;
use std::path::Path;

use super::chunks::{
    ChunkType, LightRecord, LodRecord, MaterialRecord, MeshRecord, NodeRecord, NONE_NAME,
    PHYSICS_HEADER_BYTES, PHYSICS_PADDING_BYTES,
};
use super::packing::{pack_half_2x16, pack_snorm_3x10_1x2};
use crate::foundation::math::{Mat4, Vec3};

/// Little-endian payload builder
#[derive(Debug, Default, Clone)]
pub struct PayloadWriter {
    bytes: Vec<u8>,
}

impl PayloadWriter {
    /// Create an empty payload
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one byte
    pub fn put_u8(&mut self, value: u8) -> &mut Self {
        self.bytes.push(value);
        self
    }

    /// Append a `u32`
    pub fn put_u32(&mut self, value: u32) -> &mut Self {
        self.bytes.extend_from_slice(&value.to_le_bytes());
        self
    }

    /// Append an `f32`
    pub fn put_f32(&mut self, value: f32) -> &mut Self {
        self.bytes.extend_from_slice(&value.to_le_bytes());
        self
    }

    /// Append three `f32`s
    pub fn put_vec3(&mut self, value: &Vec3) -> &mut Self {
        self.put_f32(value.x).put_f32(value.y).put_f32(value.z)
    }

    /// Append a matrix in column-major order
    pub fn put_mat4(&mut self, value: &Mat4) -> &mut Self {
        for element in value.as_slice() {
            self.put_f32(*element);
        }
        self
    }

    /// Append a NUL-terminated string
    pub fn put_cstring(&mut self, value: &str) -> &mut Self {
        self.bytes.extend_from_slice(value.as_bytes());
        self.bytes.push(0);
        self
    }

    /// Append `count` zero bytes
    pub fn put_zeros(&mut self, count: usize) -> &mut Self {
        self.bytes.resize(self.bytes.len() + count, 0);
        self
    }

    /// Finished payload bytes
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    fn put_node(&mut self, node: &NodeRecord) -> &mut Self {
        self.put_cstring(&node.name)
            .put_mat4(&node.matrix)
            .put_u32(node.children)
    }

    fn put_lod(&mut self, lod: &LodRecord) -> &mut Self {
        self.put_u32(lod.positions.len() as u32)
            .put_u32(lod.faces.len() as u32);
        for (i, position) in lod.positions.iter().enumerate() {
            let normal = lod.normals.get(i).copied().unwrap_or_else(Vec3::y);
            let uv = lod.uvs.get(i).copied().unwrap_or_default();
            self.put_vec3(position)
                .put_u32(pack_snorm_3x10_1x2(&normal))
                .put_u32(pack_half_2x16(&uv))
                .put_u32(0);
        }
        for face in &lod.faces {
            self.put_u32(face[0]).put_u32(face[1]).put_u32(face[2]);
        }
        self
    }
}

/// Whole-file encoder: a sequence of `{type, size, payload}` chunks
#[derive(Debug, Default, Clone)]
pub struct ChunkWriter {
    buffer: Vec<u8>,
}

impl ChunkWriter {
    /// Create an empty stream
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a chunk with an arbitrary type id and payload
    pub fn raw_chunk(&mut self, chunk_type: u32, payload: &[u8]) -> &mut Self {
        self.buffer.extend_from_slice(&chunk_type.to_le_bytes());
        self.buffer
            .extend_from_slice(&(payload.len() as u32).to_le_bytes());
        self.buffer.extend_from_slice(payload);
        self
    }

    fn chunk(&mut self, chunk_type: ChunkType, payload: PayloadWriter) -> &mut Self {
        self.raw_chunk(chunk_type as u32, &payload.into_bytes())
    }

    /// Append a version chunk
    pub fn version(&mut self, version: u32) -> &mut Self {
        let mut payload = PayloadWriter::new();
        payload.put_u32(version);
        self.chunk(ChunkType::Version, payload)
    }

    /// Append a plain node chunk
    pub fn node(&mut self, node: &NodeRecord) -> &mut Self {
        let mut payload = PayloadWriter::new();
        payload.put_node(node);
        self.chunk(ChunkType::Node, payload)
    }

    /// Append a material chunk
    pub fn material(&mut self, material: &MaterialRecord) -> &mut Self {
        let mut payload = PayloadWriter::new();
        payload
            .put_cstring(&material.name)
            .put_vec3(&material.emission)
            .put_vec3(&material.albedo)
            .put_f32(material.roughness)
            .put_f32(material.metalness)
            .put_f32(material.alpha)
            .put_cstring(material.albedo_map.as_deref().unwrap_or(NONE_NAME));
        for map in &material.extra_maps {
            payload.put_cstring(map);
        }
        self.chunk(ChunkType::Material, payload)
    }

    /// Append a light chunk
    pub fn light(&mut self, light: &LightRecord) -> &mut Self {
        let mut payload = PayloadWriter::new();
        payload
            .put_node(&light.node)
            .put_cstring(&light.target)
            .put_u8(light.subtype.to_u8())
            .put_vec3(&light.color)
            .put_f32(light.radius)
            .put_vec3(&light.direction)
            .put_f32(light.cutoff)
            .put_f32(light.exponent);
        self.chunk(ChunkType::Light, payload)
    }

    /// Append a mesh chunk
    ///
    /// `record.lod` is written as the first LOD followed by `extra_lods`;
    /// `record.lod_count` is ignored in favour of the real count. Hull
    /// blocks are written with zeroed contents.
    pub fn mesh(&mut self, record: &MeshRecord, extra_lods: &[LodRecord]) -> &mut Self {
        let mut payload = PayloadWriter::new();
        payload
            .put_node(&record.node)
            .put_cstring(&record.target)
            .put_u8(record.subtype)
            .put_cstring(record.material.as_deref().unwrap_or(NONE_NAME))
            .put_f32(record.radius)
            .put_vec3(&record.bbox_min)
            .put_vec3(&record.bbox_max);

        match &record.hulls {
            Some(hulls) => {
                payload
                    .put_u8(1)
                    .put_zeros(PHYSICS_HEADER_BYTES)
                    .put_u32(hulls.len() as u32)
                    .put_zeros(PHYSICS_PADDING_BYTES);
                for hull in hulls {
                    payload.put_u32(hull.vertices).put_u32(hull.faces).put_zeros(
                        12 + hull.vertices as usize * 12 + hull.faces as usize * 12,
                    );
                }
            }
            None => {
                payload.put_u8(0);
            }
        }

        let lods: Vec<&LodRecord> = record.lod.iter().chain(extra_lods.iter()).collect();
        payload.put_u32(lods.len() as u32);
        for lod in lods {
            payload.put_lod(lod);
        }
        self.chunk(ChunkType::Mesh, payload)
    }

    /// Bytes written so far
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }

    /// Finish and take the stream
    #[must_use]
    pub fn finish(self) -> Vec<u8> {
        self.buffer
    }

    /// Write the stream to a file
    pub fn write_to_file(&self, path: impl AsRef<Path>) -> io::Result<()> {
        std::fs::write(path, &self.buffer)
    }
}
