//! Scene nodes
//!
//! A node carries a base pose baked in at load time plus runtime position,
//! rotation and scale offsets applied on top of it, a draw priority and its
//! child handles. Type-specific state lives in [`NodeKind`].

use super::ids::{NodeId, ObjectId};
use crate::foundation::math::{Mat4, Mat4Ext, Vec3};
use crate::render::{BackendResult, Camera, DrawMode, Drawable, Light, Mesh, RenderBackend};

/// Priority of cameras in the render list
pub const CAMERA_PRIORITY: i32 = 2;
/// Priority of lights in the render list
pub const LIGHT_PRIORITY: i32 = 1;
/// Priority of everything else
pub const DEFAULT_PRIORITY: i32 = 0;

/// Type-specific node payload
#[derive(Debug, Clone)]
pub enum NodeKind {
    /// Plain transform node
    Group,
    /// Perspective camera
    Camera(Camera),
    /// Light source
    Light(Light),
    /// Drawable geometry
    Mesh(Mesh),
}

impl NodeKind {
    /// Render-list priority for this kind
    #[must_use]
    pub const fn default_priority(&self) -> i32 {
        match self {
            Self::Camera(_) => CAMERA_PRIORITY,
            Self::Light(_) => LIGHT_PRIORITY,
            Self::Group | Self::Mesh(_) => DEFAULT_PRIORITY,
        }
    }

    /// Type tag
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Group => "Node",
            Self::Camera(_) => "PerspectiveCamera",
            Self::Light(light) => light.type_name(),
            Self::Mesh(_) => "Mesh",
        }
    }
}

impl Drawable for NodeKind {
    fn draw(&self, backend: &mut dyn RenderBackend, view: &Mat4, mode: DrawMode) -> BackendResult<()> {
        match self {
            Self::Group => {
                backend.load_modelview(view);
                Ok(())
            }
            Self::Camera(camera) => camera.draw(backend, view, mode),
            Self::Light(light) => light.draw(backend, view, mode),
            Self::Mesh(mesh) => mesh.draw(backend, view, mode),
        }
    }
}

/// A node of the scene tree
#[derive(Debug, Clone)]
pub struct Node {
    id: ObjectId,
    name: String,
    base_matrix: Mat4,
    position: Vec3,
    rotation: Vec3,
    scale: Vec3,
    priority: i32,
    pub(crate) children: Vec<NodeId>,
    pub(crate) parent: Option<NodeId>,
    kind: NodeKind,
}

impl Node {
    pub(crate) fn new(id: ObjectId, name: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            id,
            name: name.into(),
            base_matrix: Mat4::identity(),
            position: Vec3::zeros(),
            rotation: Vec3::zeros(),
            scale: Vec3::repeat(1.0),
            priority: kind.default_priority(),
            children: Vec::new(),
            parent: None,
            kind,
        }
    }

    /// Object id
    #[must_use]
    pub const fn id(&self) -> ObjectId {
        self.id
    }

    /// Display name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rename
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Type tag, e.g. `"Mesh"` or `"PointLight"`
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        self.kind.type_name()
    }

    /// Pose baked in at load time
    #[must_use]
    pub const fn base_matrix(&self) -> &Mat4 {
        &self.base_matrix
    }

    /// Replace the base pose
    pub fn set_base_matrix(&mut self, matrix: Mat4) {
        self.base_matrix = matrix;
    }

    /// Position offset
    #[must_use]
    pub const fn position(&self) -> &Vec3 {
        &self.position
    }

    /// Set the position offset
    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    /// Rotation offset, Euler degrees applied Z·Y·X
    #[must_use]
    pub const fn rotation(&self) -> &Vec3 {
        &self.rotation
    }

    /// Set the rotation offset
    pub fn set_rotation(&mut self, rotation: Vec3) {
        self.rotation = rotation;
    }

    /// Scale offset
    #[must_use]
    pub const fn scale(&self) -> &Vec3 {
        &self.scale
    }

    /// Set the scale offset
    pub fn set_scale(&mut self, scale: Vec3) {
        self.scale = scale;
    }

    /// Render-list priority; higher draws first
    #[must_use]
    pub const fn priority(&self) -> i32 {
        self.priority
    }

    /// Override the priority
    pub fn set_priority(&mut self, priority: i32) {
        self.priority = priority;
    }

    /// Child handles in order
    #[must_use]
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Parent handle, for upward lookups only
    #[must_use]
    pub const fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Type-specific payload
    #[must_use]
    pub const fn kind(&self) -> &NodeKind {
        &self.kind
    }

    /// Mutable type-specific payload
    pub fn kind_mut(&mut self) -> &mut NodeKind {
        &mut self.kind
    }

    /// Camera payload, if this is a camera
    #[must_use]
    pub const fn as_camera(&self) -> Option<&Camera> {
        match &self.kind {
            NodeKind::Camera(camera) => Some(camera),
            _ => None,
        }
    }

    /// Mutable camera payload
    pub fn as_camera_mut(&mut self) -> Option<&mut Camera> {
        match &mut self.kind {
            NodeKind::Camera(camera) => Some(camera),
            _ => None,
        }
    }

    /// Light payload, if this is a light
    #[must_use]
    pub const fn as_light(&self) -> Option<&Light> {
        match &self.kind {
            NodeKind::Light(light) => Some(light),
            _ => None,
        }
    }

    /// Mutable light payload
    pub fn as_light_mut(&mut self) -> Option<&mut Light> {
        match &mut self.kind {
            NodeKind::Light(light) => Some(light),
            _ => None,
        }
    }

    /// Mesh payload, if this is a mesh
    #[must_use]
    pub const fn as_mesh(&self) -> Option<&Mesh> {
        match &self.kind {
            NodeKind::Mesh(mesh) => Some(mesh),
            _ => None,
        }
    }

    /// Mutable mesh payload
    pub fn as_mesh_mut(&mut self) -> Option<&mut Mesh> {
        match &mut self.kind {
            NodeKind::Mesh(mesh) => Some(mesh),
            _ => None,
        }
    }

    /// `T · R · S · base`, offsets applied on top of the base pose
    #[must_use]
    pub fn local_matrix(&self) -> Mat4 {
        Mat4::new_translation(&self.position)
            * Mat4::euler_degrees(&self.rotation)
            * Mat4::new_nonuniform_scaling(&self.scale)
            * self.base_matrix
    }
}
