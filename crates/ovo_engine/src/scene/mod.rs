//! Scene graph
//!
//! A [`Scene`] owns its nodes in an arena together with the object-id and
//! light-slot counters. [`RenderList`] flattens a subtree into world-space
//! draw entries each frame.

pub mod emission_pulse;
pub mod ids;
pub mod node;
pub mod render_list;
pub mod scene_graph;

pub use emission_pulse::EmissionPulse;
pub use ids::{LightSlotAllocator, NodeId, ObjectId, ObjectIdAllocator};
pub use node::{Node, NodeKind, CAMERA_PRIORITY, DEFAULT_PRIORITY, LIGHT_PRIORITY};
pub use render_list::{RenderEntry, RenderList};
pub use scene_graph::{Scene, ROOT_NAME};

use thiserror::Error;

/// Scene graph errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SceneError {
    /// Handle does not refer to a live node
    #[error("Node not found: {0:?}")]
    NodeNotFound(NodeId),

    /// Node exists but is not a camera
    #[error("Node {0:?} is not a camera")]
    NotACamera(NodeId),

    /// The scene root is permanent
    #[error("The scene root cannot be removed")]
    CannotRemoveRoot,

    /// Attaching would make a node its own ancestor
    #[error("Cannot attach {child:?} under {parent:?}: it is an ancestor")]
    WouldCreateCycle {
        /// Requested parent
        parent: NodeId,
        /// Node being attached
        child: NodeId,
    },
}
