// src/lib.rs
//! Posegen
//!
//! Batch generator for pose-labelled image sequences. A base shape (built
//! procedurally or imported from a mesh corpus) is centred under a rotation
//! pivot, photographed from a fixed camera, then rotated step by step about
//! world axes with one photograph per step. Every frame is named by the path
//! of rotations that produced it.

pub mod batch;
pub mod config;
pub mod errors;
pub mod gfx;
pub mod prelude;

// Re-export main types for convenience
pub use batch::driver::{BatchDriver, BatchReport, UnitOutcome};
pub use batch::enumerate::{WorkUnit, WorkUnitEnumerator};
pub use config::BatchConfig;
pub use errors::{CollaboratorError, ConfigError};
