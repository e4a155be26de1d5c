//! # Posegen Prelude
//!
//! Commonly used types and traits in one import, for binaries and tests that
//! assemble a batch from the default collaborators.
//!
//! ## Usage
//!
//! ```no_run
//! use posegen::prelude::*;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = BatchConfig::new("dataset").with_render(RenderSettings::sweep());
//!     let enumerator = WorkUnitEnumerator::Sweep {
//!         sweep: SweepConfig::new(vec![45.0], 2, 10)?,
//!         output_dir: config.output_dir.clone(),
//!     };
//!
//!     let mut scene = Scene::new();
//!     let mut shapes = ExtrusionShapeBuilder::default();
//!     let mut importer = ObjImporter::new();
//!     let mut renderer = SilhouetteRenderer::new();
//!     let report = BatchDriver::new(&mut scene, &mut shapes, &mut importer, &mut renderer, &config)
//!         .run(&enumerator);
//!     println!("{}", report);
//!     Ok(())
//! }
//! ```

// Re-export batch pipeline types
pub use crate::batch::driver::{BatchDriver, BatchReport, UnitOutcome, UnitState};
pub use crate::batch::enumerate::{Manifest, UnitSource, WorkUnit, WorkUnitEnumerator};
pub use crate::batch::planner::{Axis, Direction, FramePath, RotationPlanner, RotationStep};
pub use crate::batch::resume::{ResumeGuard, ResumePolicy};
pub use crate::batch::seed::derive_seed;

// Re-export configuration and errors
pub use crate::config::{BatchConfig, RenderSettings, SweepConfig};
pub use crate::errors::{CollaboratorError, ConfigError, FramePathError, UnitInputError};

// Re-export collaborators and their default implementations
pub use crate::gfx::geometry::shapegen::ExtrusionShapeBuilder;
pub use crate::gfx::geometry::{generate_box, generate_cube, MeshData};
pub use crate::gfx::host::{MeshImporter, NodeId, Renderer, SceneHost, ShapeBuilder, ShapeParams};
pub use crate::gfx::pivot::{PivotRotator, RotationStrategy};
pub use crate::gfx::rendering::SilhouetteRenderer;
pub use crate::gfx::scene::{ObjImporter, Scene};

// Re-export common external dependencies
pub use cgmath::{Deg, Matrix4, Vector3};
