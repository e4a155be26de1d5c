//! Error Types
//!
//! Failures are grouped by how far they reach:
//!
//! - [`ConfigError`] aborts the whole process before any work unit runs.
//! - [`UnitInputError`] skips a single work unit; the batch continues.
//! - [`CollaboratorError`] fails a single work unit after it has started; the
//!   batch continues and any partial output is left in place.
//!
//! Seed derivation never fails: a malformed identity falls back to a fixed
//! seed instead (see [`crate::batch::seed`]).

use std::path::PathBuf;

use thiserror::Error;

use crate::gfx::host::NodeId;

/// Bad invocation or missing batch inputs.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The rotation increment could not be used.
    #[error("rotation degree must be a finite number, got {0}")]
    InvalidDegrees(String),

    /// The model manifest does not exist.
    #[error("'{}' not found", .0.display())]
    ManifestNotFound(PathBuf),

    /// The model manifest exists but could not be read.
    #[error("failed to read manifest {}: {source}", path.display())]
    ManifestRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Sweep bounds that would enumerate nothing meaningful.
    #[error("invalid sweep configuration: {0}")]
    InvalidSweep(String),
}

/// A work unit whose inputs are unusable. The unit is skipped.
#[derive(Error, Debug)]
pub enum UnitInputError {
    #[error("model identifier '{0}' is not of the form category/model-id")]
    MalformedIdentifier(String),

    #[error("model file not found at {}", .0.display())]
    MissingSourceMesh(PathBuf),
}

/// A scene, shape, import or render call that failed mid-unit.
#[derive(Error, Debug)]
pub enum CollaboratorError {
    /// A handle that does not resolve in the current scene, typically one
    /// leaked across a reset.
    #[error("object {0:?} does not exist in the current scene")]
    MissingObject(NodeId),

    /// An object expected to survive a destructive operation is gone.
    #[error("'{0}' lost after bake")]
    ObjectVanished(String),

    #[error("import of {} failed: {reason}", path.display())]
    Import { path: PathBuf, reason: String },

    #[error("shape generation failed: {0}")]
    Build(String),

    /// Parenting that would create a cycle.
    #[error("cannot parent {child:?} under {parent:?}: would create a cycle")]
    InvalidHierarchy { parent: NodeId, child: NodeId },

    #[error("world transform of {0:?} is not invertible")]
    SingularTransform(NodeId),

    /// Children were detached from the pivot but could not all be reattached.
    #[error("failed to reattach {children} children to pivot: {reason}")]
    Reparent { children: usize, reason: String },

    #[error("invalid render settings: {0}")]
    RenderSettings(String),

    #[error("render to {} failed: {reason}", path.display())]
    Render { path: PathBuf, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A frame name that does not decode into a rotation path.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FramePathError {
    #[error("frame name '{0}' does not start with 'base'")]
    MissingBase(String),

    #[error("unknown rotation token '{token}' in '{name}'")]
    UnknownToken { name: String, token: String },
}
