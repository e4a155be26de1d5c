use cgmath::{Matrix4, SquareMatrix};
use log::debug;

use crate::errors::CollaboratorError;
use crate::gfx::geometry::MeshData;
use crate::gfx::host::{MeshInstance, NodeId, SceneHost};

use super::object::Node;

/// Scene holding every object of the current work unit
///
/// Nodes live in a flat arena and refer to their parent by index. Nothing is
/// removed individually; [`SceneHost::reset`] drops everything at once and
/// starts a new epoch so stale handles fail to resolve.
#[derive(Debug, Default)]
pub struct Scene {
    nodes: Vec<Node>,
    meshes: Vec<MeshData>,
    epoch: u32,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    fn resolve(&self, id: NodeId) -> Result<usize, CollaboratorError> {
        let index = id.index as usize;
        if id.epoch != self.epoch || index >= self.nodes.len() {
            return Err(CollaboratorError::MissingObject(id));
        }
        Ok(index)
    }

    fn handle(&self, index: usize) -> NodeId {
        NodeId::new(index as u32, self.epoch)
    }

    fn world_of(&self, index: usize) -> Matrix4<f64> {
        let mut world = self.nodes[index].transform;
        let mut parent = self.nodes[index].parent;
        while let Some(p) = parent {
            world = self.nodes[p].transform * world;
            parent = self.nodes[p].parent;
        }
        world
    }

    /// True if `ancestor` is `node` or lies on its parent chain.
    fn is_ancestor(&self, ancestor: usize, node: usize) -> bool {
        let mut current = Some(node);
        while let Some(index) = current {
            if index == ancestor {
                return true;
            }
            current = self.nodes[index].parent;
        }
        false
    }

    fn inverse_world(&self, index: usize) -> Result<Matrix4<f64>, CollaboratorError> {
        self.world_of(index)
            .invert()
            .ok_or_else(|| CollaboratorError::SingularTransform(self.handle(index)))
    }

    fn push_node(&mut self, node: Node) -> NodeId {
        self.nodes.push(node);
        self.handle(self.nodes.len() - 1)
    }

    /// Gets a node by handle
    pub fn get_node(&self, id: NodeId) -> Result<&Node, CollaboratorError> {
        Ok(&self.nodes[self.resolve(id)?])
    }

    /// Parent of `id`, if any.
    pub fn parent(&self, id: NodeId) -> Result<Option<NodeId>, CollaboratorError> {
        let index = self.resolve(id)?;
        Ok(self.nodes[index].parent.map(|p| self.handle(p)))
    }

    /// Returns `desired_name`, suffixed `.001`, `.002`, ... if already taken.
    pub fn ensure_unique_name(&self, desired_name: &str) -> String {
        let mut counter = 0;
        let mut test_name = desired_name.to_string();

        while self.nodes.iter().any(|node| node.name == test_name) {
            counter += 1;
            test_name = format!("{}.{:03}", desired_name, counter);
        }

        test_name
    }

    /// Gets statistics about the scene
    pub fn get_statistics(&self) -> SceneStatistics {
        SceneStatistics {
            object_count: self.nodes.len(),
            mesh_count: self.meshes.len(),
            total_triangles: self.meshes.iter().map(MeshData::triangle_count).sum(),
            total_vertices: self.meshes.iter().map(MeshData::vertex_count).sum(),
        }
    }
}

impl SceneHost for Scene {
    fn reset(&mut self) -> Result<(), CollaboratorError> {
        debug!(
            "Resetting scene: removing {} objects, purging {} meshes",
            self.nodes.len(),
            self.meshes.len()
        );
        self.nodes.clear();
        self.meshes.clear();
        self.epoch = self.epoch.wrapping_add(1);
        Ok(())
    }

    fn add_empty(&mut self, name: &str) -> Result<NodeId, CollaboratorError> {
        let name = self.ensure_unique_name(name);
        Ok(self.push_node(Node::new(name)))
    }

    fn add_mesh(&mut self, name: &str, mesh: MeshData) -> Result<NodeId, CollaboratorError> {
        let name = self.ensure_unique_name(name);
        self.meshes.push(mesh);
        let node = Node::new(name).with_mesh(self.meshes.len() - 1);
        Ok(self.push_node(node))
    }

    fn world_transform(&self, node: NodeId) -> Result<Matrix4<f64>, CollaboratorError> {
        Ok(self.world_of(self.resolve(node)?))
    }

    fn set_world_transform(
        &mut self,
        node: NodeId,
        transform: Matrix4<f64>,
    ) -> Result<(), CollaboratorError> {
        let index = self.resolve(node)?;
        let local = match self.nodes[index].parent {
            Some(parent) => self.inverse_world(parent)? * transform,
            None => transform,
        };
        self.nodes[index].transform = local;
        Ok(())
    }

    fn set_parent(
        &mut self,
        parent: NodeId,
        objects: &[NodeId],
        keep_world_transform: bool,
    ) -> Result<(), CollaboratorError> {
        let parent_index = self.resolve(parent)?;
        let mut children = Vec::with_capacity(objects.len());
        for &object in objects {
            let index = self.resolve(object)?;
            if self.is_ancestor(index, parent_index) {
                return Err(CollaboratorError::InvalidHierarchy {
                    parent,
                    child: object,
                });
            }
            children.push(index);
        }

        // Validate everything before mutating so a failure leaves no
        // half-parented objects behind.
        let parent_inverse = if keep_world_transform {
            Some(self.inverse_world(parent_index)?)
        } else {
            None
        };

        for index in children {
            if let Some(inverse) = parent_inverse {
                let world = self.world_of(index);
                self.nodes[index].transform = inverse * world;
            }
            self.nodes[index].parent = Some(parent_index);
        }
        Ok(())
    }

    fn unparent(
        &mut self,
        objects: &[NodeId],
        keep_world_transform: bool,
    ) -> Result<(), CollaboratorError> {
        let indices = objects
            .iter()
            .map(|&object| self.resolve(object))
            .collect::<Result<Vec<_>, _>>()?;

        for index in indices {
            if keep_world_transform {
                self.nodes[index].transform = self.world_of(index);
            }
            self.nodes[index].parent = None;
        }
        Ok(())
    }

    fn children(&self, node: NodeId) -> Result<Vec<NodeId>, CollaboratorError> {
        let index = self.resolve(node)?;
        Ok(self
            .nodes
            .iter()
            .enumerate()
            .filter(|(_, n)| n.parent == Some(index))
            .map(|(i, _)| self.handle(i))
            .collect())
    }

    fn mesh(&self, node: NodeId) -> Result<Option<&MeshData>, CollaboratorError> {
        let index = self.resolve(node)?;
        Ok(self.nodes[index].mesh.map(|m| &self.meshes[m]))
    }

    fn mesh_instances(&self) -> Vec<MeshInstance<'_>> {
        self.nodes
            .iter()
            .enumerate()
            .filter_map(|(index, node)| {
                node.mesh.map(|m| MeshInstance {
                    node: self.handle(index),
                    world: self.world_of(index),
                    mesh: &self.meshes[m],
                })
            })
            .collect()
    }
}

/// Scene statistics for logging
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SceneStatistics {
    pub object_count: usize,
    pub mesh_count: usize,
    pub total_triangles: usize,
    pub total_vertices: usize,
}
