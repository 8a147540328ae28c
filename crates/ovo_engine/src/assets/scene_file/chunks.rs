//! Chunk records and their payload decoders
//!
//! Decoding is pure: each function turns one payload into a plain record.
//! Turning records into scene nodes is the loader's job.

use super::packing::{unpack_half_2x16, unpack_snorm_3x10_1x2};
use super::reader::{ChunkReader, ReadError};
use crate::foundation::math::{Mat4, Vec2, Vec3};

/// Name used by the format for "no material" and "no texture"
pub const NONE_NAME: &str = "[none]";

/// Bytes of the fixed physics header before the hull count
pub(crate) const PHYSICS_HEADER_BYTES: usize = 40;
/// Bytes between the hull count and the first hull
pub(crate) const PHYSICS_PADDING_BYTES: usize = 20;

/// Known chunk types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum ChunkType {
    /// Format version
    Version = 0,
    /// Plain transform node
    Node = 1,
    /// Material definition
    Material = 9,
    /// Light node
    Light = 16,
    /// Mesh node
    Mesh = 18,
}

impl ChunkType {
    /// Map a raw chunk id to a known type
    #[must_use]
    pub const fn from_u32(raw: u32) -> Option<Self> {
        match raw {
            0 => Some(Self::Version),
            1 => Some(Self::Node),
            9 => Some(Self::Material),
            16 => Some(Self::Light),
            18 => Some(Self::Mesh),
            _ => None,
        }
    }
}

/// Header shared by node, light and mesh chunks
#[derive(Debug, Clone, PartialEq)]
pub struct NodeRecord {
    /// Node name
    pub name: String,
    /// Base pose
    pub matrix: Mat4,
    /// Number of chunks that follow as this node's children
    pub children: u32,
}

/// Material chunk
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialRecord {
    /// Material name, referenced by meshes
    pub name: String,
    /// Emitted color
    pub emission: Vec3,
    /// Base color
    pub albedo: Vec3,
    /// PBR roughness in `[0, 1]`
    pub roughness: f32,
    /// PBR metalness (unused by the fixed-function pipeline)
    pub metalness: f32,
    /// Opacity
    pub alpha: f32,
    /// Base color texture file, if any
    pub albedo_map: Option<String>,
    /// Normal, height, roughness and metalness map names
    pub extra_maps: [String; 4],
}

/// Light subtypes stored in the file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightSubtype {
    /// Omnidirectional light
    Point,
    /// Light at infinity
    Directional,
    /// Cone light
    Spot,
    /// Unrecognized subtype byte
    Unknown(u8),
}

impl LightSubtype {
    /// Decode the subtype byte
    #[must_use]
    pub const fn from_u8(raw: u8) -> Self {
        match raw {
            0 => Self::Point,
            1 => Self::Directional,
            2 => Self::Spot,
            other => Self::Unknown(other),
        }
    }

    /// Encode the subtype byte
    #[must_use]
    pub const fn to_u8(self) -> u8 {
        match self {
            Self::Point => 0,
            Self::Directional => 1,
            Self::Spot => 2,
            Self::Unknown(raw) => raw,
        }
    }
}

/// Light chunk
#[derive(Debug, Clone, PartialEq)]
pub struct LightRecord {
    /// Name, base pose and child count
    pub node: NodeRecord,
    /// Target node name
    pub target: String,
    /// Light kind
    pub subtype: LightSubtype,
    /// Light color
    pub color: Vec3,
    /// Influence radius in file units
    pub radius: f32,
    /// Direction for directional and spot lights
    pub direction: Vec3,
    /// Spot cone half-angle in degrees
    pub cutoff: f32,
    /// Spot falloff exponent
    pub exponent: f32,
}

/// Convex hull sizes of a mesh's physics block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HullRecord {
    /// Hull vertex count
    pub vertices: u32,
    /// Hull face count
    pub faces: u32,
}

/// One level of detail
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LodRecord {
    /// Vertex positions
    pub positions: Vec<Vec3>,
    /// Unpacked vertex normals
    pub normals: Vec<Vec3>,
    /// Unpacked texture coordinates
    pub uvs: Vec<Vec2>,
    /// Triangles as vertex index triples
    pub faces: Vec<[u32; 3]>,
}

/// Mesh chunk
#[derive(Debug, Clone, PartialEq)]
pub struct MeshRecord {
    /// Name, base pose and child count
    pub node: NodeRecord,
    /// Target node name
    pub target: String,
    /// Mesh subtype byte
    pub subtype: u8,
    /// Referenced material, `None` for `[none]`
    pub material: Option<String>,
    /// Bounding sphere radius
    pub radius: f32,
    /// Bounding box minimum corner
    pub bbox_min: Vec3,
    /// Bounding box maximum corner
    pub bbox_max: Vec3,
    /// Hull sizes when the mesh carries physics data
    pub hulls: Option<Vec<HullRecord>>,
    /// Number of LOD blocks in the chunk
    pub lod_count: u32,
    /// The first LOD, the only one kept
    pub lod: Option<LodRecord>,
}

impl NodeRecord {
    /// Node header with an identity pose
    #[must_use]
    pub fn new(name: impl Into<String>, children: u32) -> Self {
        Self {
            name: name.into(),
            matrix: Mat4::identity(),
            children,
        }
    }

    /// Set the base pose
    #[must_use]
    pub fn with_matrix(mut self, matrix: Mat4) -> Self {
        self.matrix = matrix;
        self
    }
}

impl MaterialRecord {
    /// Material with the given albedo and neutral remaining fields
    #[must_use]
    pub fn new(name: impl Into<String>, albedo: Vec3) -> Self {
        Self {
            name: name.into(),
            emission: Vec3::zeros(),
            albedo,
            roughness: 0.5,
            metalness: 0.0,
            alpha: 1.0,
            albedo_map: None,
            extra_maps: std::array::from_fn(|_| NONE_NAME.to_string()),
        }
    }
}

impl MeshRecord {
    /// Mesh with one LOD and no physics
    #[must_use]
    pub fn new(node: NodeRecord, material: Option<String>, lod: LodRecord) -> Self {
        Self {
            node,
            target: NONE_NAME.to_string(),
            subtype: 0,
            material,
            radius: 0.0,
            bbox_min: Vec3::zeros(),
            bbox_max: Vec3::zeros(),
            hulls: None,
            lod_count: 1,
            lod: Some(lod),
        }
    }
}

impl LodRecord {
    /// A single upward-facing triangle in the XZ plane
    #[must_use]
    pub fn triangle() -> Self {
        Self {
            positions: vec![
                Vec3::new(0.0, 0.0, 0.0),
                Vec3::new(1.0, 0.0, 0.0),
                Vec3::new(0.0, 0.0, -1.0),
            ],
            normals: vec![Vec3::y(); 3],
            uvs: vec![Default::default(); 3],
            faces: vec![[0, 1, 2]],
        }
    }
}

fn read_optional_name(reader: &mut ChunkReader<'_>) -> Result<Option<String>, ReadError> {
    let name = reader.read_cstring()?;
    Ok((name != NONE_NAME).then_some(name))
}

/// Decode the version chunk
pub fn decode_version(reader: &mut ChunkReader<'_>) -> Result<u32, ReadError> {
    reader.read_u32()
}

/// Decode a node chunk, or the node header of a light or mesh chunk
pub fn decode_node(reader: &mut ChunkReader<'_>) -> Result<NodeRecord, ReadError> {
    Ok(NodeRecord {
        name: reader.read_cstring()?,
        matrix: reader.read_mat4()?,
        children: reader.read_u32()?,
    })
}

/// Decode a material chunk
pub fn decode_material(reader: &mut ChunkReader<'_>) -> Result<MaterialRecord, ReadError> {
    let name = reader.read_cstring()?;
    let emission = reader.read_vec3()?;
    let albedo = reader.read_vec3()?;
    let roughness = reader.read_f32()?;
    let metalness = reader.read_f32()?;
    let alpha = reader.read_f32()?;
    let albedo_map = read_optional_name(reader)?;
    let extra_maps = [
        reader.read_cstring()?,
        reader.read_cstring()?,
        reader.read_cstring()?,
        reader.read_cstring()?,
    ];

    Ok(MaterialRecord {
        name,
        emission,
        albedo,
        roughness,
        metalness,
        alpha,
        albedo_map,
        extra_maps,
    })
}

/// Decode a light chunk
pub fn decode_light(reader: &mut ChunkReader<'_>) -> Result<LightRecord, ReadError> {
    let node = decode_node(reader)?;
    decode_light_body(reader, node)
}

/// Decode the rest of a light chunk once its node header is read
pub fn decode_light_body(reader: &mut ChunkReader<'_>, node: NodeRecord) -> Result<LightRecord, ReadError> {
    Ok(LightRecord {
        node,
        target: reader.read_cstring()?,
        subtype: LightSubtype::from_u8(reader.read_u8()?),
        color: reader.read_vec3()?,
        radius: reader.read_f32()?,
        direction: reader.read_vec3()?,
        cutoff: reader.read_f32()?,
        exponent: reader.read_f32()?,
    })
}

fn decode_hulls(reader: &mut ChunkReader<'_>) -> Result<Vec<HullRecord>, ReadError> {
    reader.skip(PHYSICS_HEADER_BYTES)?;
    let hull_count = reader.read_u32()?;
    reader.skip(PHYSICS_PADDING_BYTES)?;

    let mut hulls = Vec::new();
    for _ in 0..hull_count {
        let vertices = reader.read_u32()?;
        let faces = reader.read_u32()?;
        // Hull centroid, then vertices, then index triples
        reader.skip(12 + vertices as usize * 12 + faces as usize * 12)?;
        hulls.push(HullRecord { vertices, faces });
    }
    Ok(hulls)
}

fn decode_lod(reader: &mut ChunkReader<'_>) -> Result<LodRecord, ReadError> {
    let vertex_count = reader.read_u32()? as usize;
    let face_count = reader.read_u32()? as usize;

    // Each vertex takes at least 24 bytes; bail out before allocating for a
    // count the payload cannot hold.
    if vertex_count.saturating_mul(24) > reader.remaining() {
        return Err(ReadError::UnexpectedEnd {
            offset: reader.offset(),
            needed: vertex_count.saturating_mul(24),
            remaining: reader.remaining(),
        });
    }

    let mut lod = LodRecord {
        positions: Vec::with_capacity(vertex_count),
        normals: Vec::with_capacity(vertex_count),
        uvs: Vec::with_capacity(vertex_count),
        faces: Vec::new(),
    };

    for _ in 0..vertex_count {
        lod.positions.push(reader.read_vec3()?);
        lod.normals.push(unpack_snorm_3x10_1x2(reader.read_u32()?));
        lod.uvs.push(unpack_half_2x16(reader.read_u32()?));
        // Packed tangent
        reader.skip(4)?;
    }

    for _ in 0..face_count {
        lod.faces
            .push([reader.read_u32()?, reader.read_u32()?, reader.read_u32()?]);
    }

    Ok(lod)
}

fn skip_lod(reader: &mut ChunkReader<'_>) -> Result<(), ReadError> {
    let vertex_count = reader.read_u32()? as usize;
    let face_count = reader.read_u32()? as usize;
    reader.skip(vertex_count.saturating_mul(24))?;
    reader.skip(face_count.saturating_mul(12))
}

/// Decode a mesh chunk
///
/// Only the first LOD is decoded; the rest are walked so a truncated
/// payload is still reported.
pub fn decode_mesh(reader: &mut ChunkReader<'_>) -> Result<MeshRecord, ReadError> {
    let node = decode_node(reader)?;
    decode_mesh_body(reader, node)
}

/// Decode the rest of a mesh chunk once its node header is read
pub fn decode_mesh_body(reader: &mut ChunkReader<'_>, node: NodeRecord) -> Result<MeshRecord, ReadError> {
    let target = reader.read_cstring()?;
    let subtype = reader.read_u8()?;
    let material = read_optional_name(reader)?;
    let radius = reader.read_f32()?;
    let bbox_min = reader.read_vec3()?;
    let bbox_max = reader.read_vec3()?;

    let hulls = if reader.read_u8()? != 0 {
        Some(decode_hulls(reader)?)
    } else {
        None
    };

    let lod_count = reader.read_u32()?;
    let mut lod = None;
    for index in 0..lod_count {
        if index == 0 {
            lod = Some(decode_lod(reader)?);
        } else {
            skip_lod(reader)?;
        }
    }

    Ok(MeshRecord {
        node,
        target,
        subtype,
        material,
        radius,
        bbox_min,
        bbox_max,
        hulls,
        lod_count,
        lod,
    })
}
