//! # Scene Management Module
//!
//! In-process scene graph used by the batch driver.
//!
//! ## Key Components
//!
//! - [`Scene`] - Node arena implementing [`SceneHost`](crate::gfx::host::SceneHost)
//! - [`Node`] - A named object with a local transform, optional parent and mesh
//! - [`ObjImporter`] - Loads OBJ corpus files into a scene
//!
//! ## Transforms
//!
//! World transforms are the product of local transforms from the root down.
//! Parenting and unparenting with `keep_world_transform` recompute the local
//! transform so that the object stays where it is in the world.

pub mod import;
pub mod object;
pub mod scene;

// Re-export main types
pub use import::ObjImporter;
pub use object::Node;
pub use scene::{Scene, SceneStatistics};
