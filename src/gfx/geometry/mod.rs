//! # Geometry
//!
//! Triangle mesh data shared by the scene, the procedural shape builder, the
//! OBJ importer and the rasterizer.
//!
//! ## Contents
//!
//! - [`MeshData`] - Indexed triangle mesh in object space
//! - [`Aabb`] - Axis-aligned bounds used to centre baked shapes
//! - [`primitives`] - Box generation
//! - [`shapegen`] - Seeded procedural shapes built from extruded boxes

pub mod primitives;
pub mod shapegen;

pub use primitives::*;

use cgmath::{Matrix4, Point3, Transform, Vector3};

/// Indexed triangle mesh, positions in object space.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshData {
    /// Vertex positions (x, y, z)
    pub vertices: Vec<[f32; 3]>,
    /// Triangle indices (counter-clockwise winding)
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn new(vertices: Vec<[f32; 3]>, indices: Vec<u32>) -> Self {
        Self { vertices, indices }
    }

    /// Builds a mesh from the flat position/index arrays OBJ loaders produce.
    pub fn from_flat(positions: &[f32], indices: &[u32]) -> Self {
        let vertices = positions
            .chunks_exact(3)
            .map(|p| [p[0], p[1], p[2]])
            .collect();
        Self::new(vertices, indices.to_vec())
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() || self.indices.len() < 3
    }

    /// Joins `other` into this mesh, offsetting its indices.
    pub fn append(&mut self, other: &MeshData) {
        let offset = self.vertices.len() as u32;
        self.vertices.extend_from_slice(&other.vertices);
        self.indices.extend(other.indices.iter().map(|i| i + offset));
    }

    /// Moves every vertex by `offset`.
    pub fn translate(&mut self, offset: Vector3<f32>) {
        for v in &mut self.vertices {
            v[0] += offset.x;
            v[1] += offset.y;
            v[2] += offset.z;
        }
    }

    /// Object-space bounds, `None` for a mesh without vertices.
    pub fn bounds(&self) -> Option<Aabb> {
        Aabb::from_vertices(&self.vertices)
    }

    /// Vertices transformed into world space.
    pub fn world_vertices<'a>(
        &'a self,
        world: &'a Matrix4<f64>,
    ) -> impl Iterator<Item = Point3<f64>> + 'a {
        self.vertices.iter().map(move |v| {
            world.transform_point(Point3::new(v[0] as f64, v[1] as f64, v[2] as f64))
        })
    }

    /// Triangles as index triples; trailing indices that do not form a full
    /// triangle are ignored.
    pub fn triangles(&self) -> impl Iterator<Item = [usize; 3]> + '_ {
        self.indices
            .chunks_exact(3)
            .map(|t| [t[0] as usize, t[1] as usize, t[2] as usize])
    }
}

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vector3<f32>,
    pub max: Vector3<f32>,
}

impl Aabb {
    pub fn new(min: Vector3<f32>, max: Vector3<f32>) -> Self {
        Self { min, max }
    }

    /// Create AABB from a set of vertices
    pub fn from_vertices(vertices: &[[f32; 3]]) -> Option<Self> {
        let first = vertices.first()?;
        let mut min = Vector3::new(first[0], first[1], first[2]);
        let mut max = min;

        for vertex in vertices.iter().skip(1) {
            min.x = min.x.min(vertex[0]);
            min.y = min.y.min(vertex[1]);
            min.z = min.z.min(vertex[2]);
            max.x = max.x.max(vertex[0]);
            max.y = max.y.max(vertex[1]);
            max.z = max.z.max(vertex[2]);
        }

        Some(Self::new(min, max))
    }

    pub fn center(&self) -> Vector3<f32> {
        (self.min + self.max) * 0.5
    }

    pub fn half_extents(&self) -> Vector3<f32> {
        (self.max - self.min) * 0.5
    }
}

/// Average of all world-space vertices, or `None` when there are none.
pub fn vertex_centroid<I>(vertices: I) -> Option<Point3<f64>>
where
    I: IntoIterator<Item = Point3<f64>>,
{
    let mut sum = Vector3::new(0.0, 0.0, 0.0);
    let mut count = 0usize;
    for v in vertices {
        sum += Vector3::new(v.x, v.y, v.z);
        count += 1;
    }
    if count == 0 {
        return None;
    }
    let mean = sum / count as f64;
    Some(Point3::new(mean.x, mean.y, mean.z))
}
