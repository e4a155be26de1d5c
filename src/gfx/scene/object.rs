use cgmath::{Matrix4, SquareMatrix, Vector3, Vector4};

/// A scene object: an empty or a mesh, with a transform relative to its parent.
#[derive(Debug, Clone)]
pub struct Node {
    pub name: String,
    pub transform: Matrix4<f64>, // relative to parent, world if unparented
    pub(crate) parent: Option<usize>,
    pub(crate) mesh: Option<usize>,
}

impl Node {
    /// Create a new node with identity transformation
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            transform: Matrix4::identity(),
            parent: None,
            mesh: None,
        }
    }

    pub(crate) fn with_mesh(mut self, mesh: usize) -> Self {
        self.mesh = Some(mesh);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.mesh.is_none()
    }

    /// Translation component of the local transform.
    pub fn translation(&self) -> Vector3<f64> {
        self.transform.w.truncate()
    }
}

/// Zeroes the translation of `transform`, leaving rotation and scale.
pub fn without_translation(mut transform: Matrix4<f64>) -> Matrix4<f64> {
    transform.w = Vector4::new(0.0, 0.0, 0.0, 1.0);
    transform
}
