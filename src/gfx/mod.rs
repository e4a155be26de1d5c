//! # Graphics Module
//!
//! Scene-side collaborators of the batch pipeline.
//!
//! ## Architecture Overview
//!
//! - **Collaborator traits** ([`host`]) - What the batch driver needs from a scene,
//!   a shape builder, a mesh importer and a renderer
//! - **Scene Management** ([`scene`]) - Node hierarchy with keep-transform parenting,
//!   and the OBJ importer
//! - **Geometry** ([`geometry`]) - Mesh data, boxes and procedural shapes
//! - **Pivot Rotation** ([`pivot`]) - World-axis rotation of the shape pivot
//! - **Rendering** ([`rendering`]) - Fixed-camera software rasteriser
//!
//! ## Usage
//!
//! ```no_run
//! use posegen::gfx::{geometry::shapegen::ExtrusionShapeBuilder, host::*, scene::Scene};
//!
//! let mut scene = Scene::new();
//! let mut shapes = ExtrusionShapeBuilder::default();
//! let shape = shapes.build_shape(&mut scene, &ShapeParams { amount: 3, seed: 0 })?;
//! let pivot = scene.add_empty("RotationPivot")?;
//! scene.set_parent(pivot, &[shape], true)?;
//! # Ok::<(), posegen::errors::CollaboratorError>(())
//! ```

pub mod geometry;
pub mod host;
pub mod pivot;
pub mod rendering;
pub mod scene;

// Re-export commonly used types
pub use host::{MeshImporter, NodeId, Renderer, SceneHost, ShapeBuilder};
pub use pivot::{PivotRotator, RotationStrategy};
pub use rendering::SilhouetteRenderer;
pub use scene::{ObjImporter, Scene};
