//! Scene file loader
//!
//! Walks the chunk stream once, keeping a stack of `(node, children left)`
//! pairs. Each node, light or mesh chunk becomes a child of the node on top
//! of the stack and is then pushed with its own declared child count. Entries
//! whose count reaches zero are popped after every chunk.
//!
//! Only a file that cannot be read fails the load. A hierarchy chunk whose
//! body does not decode still becomes a node with its declared child count
//! (an empty mesh, a default light or a plain group), and one whose header
//! does not decode becomes a childless placeholder, so the chunks after it
//! keep their place in the tree.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use super::chunks::{
    decode_light_body, decode_material, decode_mesh_body, decode_node, decode_version, ChunkType, LightRecord,
    LightSubtype, MaterialRecord, MeshRecord, NodeRecord,
};
use super::reader::{ChunkReader, ReadError};
use super::SceneFileError;
use crate::core::config::LoaderConfig;
use crate::render::{Geometry, Light, LightVariant, Material, Mesh, SharedMaterial, Texture};
use crate::scene::{NodeId, NodeKind, Scene};

/// Name of the group node every load creates to hold the file's nodes
pub const SCENE_ROOT_NAME: &str = "Scene Root";

/// Builds scene nodes from OVO chunk streams
#[derive(Debug, Clone, Default)]
pub struct SceneLoader {
    config: LoaderConfig,
}

impl SceneLoader {
    /// Loader using the given settings
    #[must_use]
    pub fn new(config: &LoaderConfig) -> Self {
        Self { config: config.clone() }
    }

    /// Load a scene file into a fresh [`Scene`]
    pub fn load_scene(&self, path: impl AsRef<Path>, max_lights: u32) -> Result<Scene, SceneFileError> {
        let mut scene = Scene::new(max_lights);
        let root = scene.root();
        self.load(path, &mut scene, root)?;
        Ok(scene)
    }

    /// Load a scene file under `parent`, returning the new scene-root group
    pub fn load(
        &self,
        path: impl AsRef<Path>,
        scene: &mut Scene,
        parent: NodeId,
    ) -> Result<NodeId, SceneFileError> {
        let path = path.as_ref();
        log::info!("Loading scene file {}", path.display());

        let bytes = std::fs::read(path).map_err(|source| {
            log::error!("Cannot open scene file {}: {}", path.display(), source);
            SceneFileError::Open {
                path: path.to_path_buf(),
                source,
            }
        })?;

        self.load_bytes(&bytes, path.parent(), scene, parent)
    }

    /// Load an in-memory chunk stream under `parent`
    ///
    /// Texture names resolve against the configured texture directory, or
    /// `base_dir` when none is configured.
    pub fn load_bytes(
        &self,
        bytes: &[u8],
        base_dir: Option<&Path>,
        scene: &mut Scene,
        parent: NodeId,
    ) -> Result<NodeId, SceneFileError> {
        let scene_root = scene.spawn(parent, SCENE_ROOT_NAME, NodeKind::Group)?;
        let texture_dir = self
            .config
            .texture_dir
            .clone()
            .or_else(|| base_dir.map(Path::to_path_buf));

        let outcome = {
            let mut load = LoadState {
                config: &self.config,
                scene: &mut *scene,
                scene_root,
                stack: vec![(scene_root, 1)],
                materials: HashMap::new(),
                textures: HashMap::new(),
                texture_dir,
                nodes_created: 0,
            };
            load.run(bytes).map(|()| (load.nodes_created, load.materials.len()))
        };

        match outcome {
            Ok((nodes, materials)) => {
                log::info!("Scene loaded: {nodes} nodes, {materials} materials");
            }
            Err(err) => {
                log::error!("Scene load aborted: {err}");
                // Leave the target scene as it was before the call
                if let Err(cleanup) = scene.remove_subtree(scene_root) {
                    log::warn!("Could not discard partial scene: {cleanup}");
                }
                return Err(err);
            }
        }
        Ok(scene_root)
    }
}

fn read_header(stream: &mut ChunkReader<'_>) -> Result<(u32, u32), ReadError> {
    Ok((stream.read_u32()?, stream.read_u32()?))
}

struct LoadState<'a> {
    config: &'a LoaderConfig,
    scene: &'a mut Scene,
    scene_root: NodeId,
    stack: Vec<(NodeId, u32)>,
    materials: HashMap<String, SharedMaterial>,
    textures: HashMap<String, Rc<Texture>>,
    texture_dir: Option<PathBuf>,
    nodes_created: usize,
}

impl LoadState<'_> {
    fn run(&mut self, bytes: &[u8]) -> Result<(), SceneFileError> {
        let mut stream = ChunkReader::new(bytes);
        let mut index = 0usize;

        while !stream.is_empty() {
            let (chunk_type, size) = match read_header(&mut stream) {
                Ok(header) => header,
                Err(err) => {
                    log::warn!("Ignoring incomplete chunk header after chunk {index}: {err}");
                    break;
                }
            };

            let payload = match stream.read_bytes(size as usize) {
                Ok(payload) => payload,
                Err(err) => {
                    log::warn!("Chunk {index} (type {chunk_type}) is truncated: {err}");
                    break;
                }
            };

            log::trace!("Chunk {index}: type {chunk_type}, {size} bytes");
            self.chunk(index, chunk_type, payload)?;
            index += 1;
        }

        if self.stack.len() > 1 {
            log::warn!(
                "Scene file ended with {} open nodes still expecting children",
                self.stack.len() - 1
            );
        }
        Ok(())
    }

    fn chunk(&mut self, index: usize, chunk_type: u32, payload: &[u8]) -> Result<(), SceneFileError> {
        let mut reader = ChunkReader::new(payload);

        match ChunkType::from_u32(chunk_type) {
            Some(ChunkType::Version) => match decode_version(&mut reader) {
                Ok(version) => log::debug!("Scene file version {version}"),
                Err(err) => log::warn!("Unreadable version chunk: {err}"),
            },
            Some(kind @ (ChunkType::Node | ChunkType::Light | ChunkType::Mesh)) => {
                let record = match decode_node(&mut reader) {
                    Ok(record) => record,
                    Err(err) => {
                        log::warn!("Chunk {index} (type {chunk_type}) has an unreadable header, loading it as an empty leaf: {err}");
                        NodeRecord::new(format!("[unreadable chunk {index}]"), 0)
                    }
                };
                match kind {
                    ChunkType::Light => self.light(index, record, &mut reader)?,
                    ChunkType::Mesh => self.mesh(index, record, &mut reader)?,
                    _ => self.node(record, NodeKind::Group)?,
                }
            }
            Some(ChunkType::Material) => match decode_material(&mut reader) {
                Ok(record) => self.material(record),
                Err(err) => log::warn!("Skipping unreadable material chunk {index}: {err}"),
            },
            None => log::warn!("Unknown chunk type {chunk_type}, skipping {} bytes", payload.len()),
        }

        if !reader.is_empty() && ChunkType::from_u32(chunk_type).is_some() {
            log::debug!("Chunk {index}: {} unread payload bytes", reader.remaining());
        }
        Ok(())
    }

    /// Create a node from its chunk header and attach it
    fn node(&mut self, record: NodeRecord, kind: NodeKind) -> Result<(), SceneFileError> {
        let handle = self.scene.create_node(record.name, kind);
        if let Some(node) = self.scene.node_mut(handle) {
            node.set_base_matrix(record.matrix);
        }
        self.attach(handle, record.children)
    }

    /// Attach under the open node on top of the stack and open `node` itself
    fn attach(&mut self, node: NodeId, children: u32) -> Result<(), SceneFileError> {
        let parent = match self.stack.last_mut() {
            Some((parent, remaining)) => {
                *remaining = remaining.saturating_sub(1);
                *parent
            }
            None => {
                log::warn!("Chunk outside the declared hierarchy, attaching to the scene root");
                self.scene_root
            }
        };
        self.scene.add_child(parent, node)?;
        self.nodes_created += 1;

        self.stack.push((node, children));
        while self.stack.last().is_some_and(|&(_, remaining)| remaining == 0) {
            self.stack.pop();
        }
        Ok(())
    }

    fn material(&mut self, record: MaterialRecord) {
        let mut material = Material::from_pbr(
            record.name.clone(),
            record.emission,
            record.albedo,
            record.roughness,
            record.alpha,
        );
        if let Some(map) = &record.albedo_map {
            material.texture = self.texture(map);
        }
        log::debug!("Material '{}' (shininess {:.1})", record.name, material.shininess);

        if self
            .materials
            .insert(record.name.clone(), material.into_shared())
            .is_some()
        {
            log::warn!("Material '{}' defined twice, keeping the later one", record.name);
        }
    }

    fn texture(&mut self, name: &str) -> Option<Rc<Texture>> {
        if let Some(texture) = self.textures.get(name) {
            return Some(Rc::clone(texture));
        }

        let path = self
            .texture_dir
            .as_ref()
            .map_or_else(|| PathBuf::from(name), |dir| dir.join(name));
        match Texture::load(&path) {
            Ok(texture) => {
                let texture = Rc::new(texture);
                self.textures.insert(name.to_string(), Rc::clone(&texture));
                Some(texture)
            }
            Err(err) => {
                log::warn!("Texture '{}' not loaded: {}", path.display(), err);
                None
            }
        }
    }

    fn light(&mut self, index: usize, node: NodeRecord, reader: &mut ChunkReader<'_>) -> Result<(), SceneFileError> {
        let record = match decode_light_body(reader, node.clone()) {
            Ok(record) => record,
            Err(err) => {
                log::warn!("Light '{}' (chunk {index}) is unreadable, using a default point light: {err}", node.name);
                return self.node(node, NodeKind::Light(Light::point()));
            }
        };

        let LightRecord {
            node,
            subtype,
            color,
            radius,
            direction,
            cutoff,
            exponent,
            ..
        } = record;
        let point_radius = radius / self.config.point_light_radius_divisor;

        let light = match subtype {
            LightSubtype::Point => Light::point().with_color(color).with_radius(point_radius),
            LightSubtype::Directional => {
                let mut light = Light::directional().with_diffuse(color);
                light.variant = LightVariant::Directional { direction };
                light
            }
            LightSubtype::Spot => {
                let mut light = Light::spot().with_color(color);
                light.variant = LightVariant::Spot {
                    direction,
                    cutoff,
                    exponent,
                    radius,
                };
                light
            }
            LightSubtype::Unknown(raw) => {
                log::warn!("Light '{}' has unknown subtype {raw}, defaulting to a point light", node.name);
                Light::point().with_color(color).with_radius(point_radius)
            }
        };
        self.node(node, NodeKind::Light(light))
    }

    fn mesh(&mut self, index: usize, node: NodeRecord, reader: &mut ChunkReader<'_>) -> Result<(), SceneFileError> {
        let record = match decode_mesh_body(reader, node.clone()) {
            Ok(record) => record,
            Err(err) => {
                log::warn!("Mesh '{}' (chunk {index}) is unreadable, loading it without geometry: {err}", node.name);
                return self.node(node, NodeKind::Mesh(Mesh::default()));
            }
        };

        let MeshRecord {
            node,
            material,
            hulls,
            lod_count,
            lod,
            ..
        } = record;

        if let Some(hulls) = &hulls {
            log::debug!("Mesh '{}': skipped {} physics hulls", node.name, hulls.len());
        }
        if lod_count > 1 {
            log::warn!(
                "Mesh '{}' has {lod_count} LODs; only the first is used",
                node.name
            );
        }

        let lod = lod.unwrap_or_default();
        let geometry = match Geometry::new(lod.positions, lod.normals, lod.uvs, lod.faces) {
            Ok(geometry) => geometry,
            Err(err) => {
                log::warn!("Mesh '{}' has invalid geometry, using none: {err}", node.name);
                Geometry::empty()
            }
        };

        let mut mesh = Mesh::new(geometry);
        if let Some(name) = material {
            match self.materials.get(&name) {
                Some(shared) => mesh.set_material(Rc::clone(shared)),
                None => log::warn!(
                    "Mesh '{}' references material '{name}' before it is defined. \
                     Out-of-order material loading is not supported.",
                    node.name
                ),
            }
        }

        self.node(node, NodeKind::Mesh(mesh))
    }
}
