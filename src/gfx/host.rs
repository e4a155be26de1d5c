//! # Scene Collaborators
//!
//! The batch pipeline never touches a concrete scene graph, importer or
//! renderer directly. It talks to these traits, which are all synchronous and
//! report failure as [`CollaboratorError`].
//!
//! Objects are identified by [`NodeId`] handles returned from the call that
//! created them, never looked up again by name. A handle stays valid until the
//! next [`SceneHost::reset`].

use std::path::Path;

use cgmath::Matrix4;

use crate::config::RenderSettings;
use crate::errors::CollaboratorError;
use crate::gfx::geometry::MeshData;

/// Opaque handle to a scene object.
///
/// The epoch ties a handle to one scene lifetime so handles from before a
/// reset cannot address objects created after it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId {
    pub(crate) index: u32,
    pub(crate) epoch: u32,
}

impl NodeId {
    pub fn new(index: u32, epoch: u32) -> Self {
        Self { index, epoch }
    }
}

/// A mesh as placed in the world, handed to the renderer.
#[derive(Debug, Clone, Copy)]
pub struct MeshInstance<'a> {
    pub node: NodeId,
    pub world: Matrix4<f64>,
    pub mesh: &'a MeshData,
}

/// The scene the batch builds each unit in.
pub trait SceneHost {
    /// Removes every object and purges orphaned meshes, materials, textures
    /// and images. Invalidates every outstanding [`NodeId`].
    fn reset(&mut self) -> Result<(), CollaboratorError>;

    /// Adds an orientation-only node at the world origin.
    fn add_empty(&mut self, name: &str) -> Result<NodeId, CollaboratorError>;

    /// Adds a mesh object at the world origin.
    fn add_mesh(&mut self, name: &str, mesh: MeshData) -> Result<NodeId, CollaboratorError>;

    fn world_transform(&self, node: NodeId) -> Result<Matrix4<f64>, CollaboratorError>;

    fn set_world_transform(
        &mut self,
        node: NodeId,
        transform: Matrix4<f64>,
    ) -> Result<(), CollaboratorError>;

    /// Parents `objects` under `parent`. With `keep_world_transform` the
    /// objects do not move in the world.
    fn set_parent(
        &mut self,
        parent: NodeId,
        objects: &[NodeId],
        keep_world_transform: bool,
    ) -> Result<(), CollaboratorError>;

    /// Detaches `objects` from their parents. With `keep_world_transform` the
    /// objects do not move in the world.
    fn unparent(
        &mut self,
        objects: &[NodeId],
        keep_world_transform: bool,
    ) -> Result<(), CollaboratorError>;

    /// Direct children of `node`, in creation order.
    fn children(&self, node: NodeId) -> Result<Vec<NodeId>, CollaboratorError>;

    /// Mesh data of `node`, `None` for empties.
    fn mesh(&self, node: NodeId) -> Result<Option<&MeshData>, CollaboratorError>;

    /// Every mesh object with its world transform.
    fn mesh_instances(&self) -> Vec<MeshInstance<'_>>;
}

/// Inputs of one procedural shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShapeParams {
    /// Number of extrusions grown from the base block.
    pub amount: u32,
    pub seed: u64,
}

/// Procedural shape generator.
pub trait ShapeBuilder {
    /// Builds and bakes a shape into `host`, returning its root object
    /// centred on the origin.
    fn build_shape(
        &mut self,
        host: &mut dyn SceneHost,
        params: &ShapeParams,
    ) -> Result<NodeId, CollaboratorError>;
}

/// Importer for third-party mesh corpora.
pub trait MeshImporter {
    /// Imports every mesh object in the file at `path`.
    fn import_mesh(
        &mut self,
        host: &mut dyn SceneHost,
        path: &Path,
    ) -> Result<Vec<NodeId>, CollaboratorError>;
}

/// Fixed-viewpoint renderer.
pub trait Renderer {
    /// Sets up camera and image settings for the frames that follow.
    fn configure(&mut self, settings: &RenderSettings) -> Result<(), CollaboratorError>;

    /// Renders the current scene and writes the image to `path`.
    fn render_to(&mut self, scene: &dyn SceneHost, path: &Path) -> Result<(), CollaboratorError>;
}
