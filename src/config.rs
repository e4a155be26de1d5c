//! # Batch Configuration
//!
//! Everything a batch run needs that is not part of an individual work unit:
//! where output goes, where the mesh corpus lives, how many rotation steps to
//! take, which pivot strategy to use, and the fixed camera/render settings.
//!
//! Defaults reproduce the two dataset layouts the benchmark consumes: the
//! corpus sweep (imported models, 512px, camera at 3 units) and the
//! parametric sweep (generated shapes, 1080px, camera at 7 units).

use std::path::{Path, PathBuf};

use crate::batch::resume::ResumePolicy;
use crate::errors::ConfigError;
use crate::gfx::pivot::RotationStrategy;

/// Name of the model manifest looked up in the working directory.
pub const DEFAULT_MANIFEST: &str = "directory.txt";

/// Rotation steps rendered after the base frame.
pub const DEFAULT_STEP_COUNT: usize = 7;

/// Mesh file inside each corpus model directory.
pub const CORPUS_MESH_PATH: &str = "models/model_normalized.obj";

/// Fixed camera and image settings shared by every frame of a batch.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderSettings {
    /// Square output resolution in pixels.
    pub resolution: u32,
    /// Distance of the camera from the origin along -Y.
    pub camera_distance: f64,
    pub backface_culling: bool,
    pub transparent_background: bool,
}

impl RenderSettings {
    /// Settings for imported corpus models.
    pub fn corpus() -> Self {
        Self {
            resolution: 512,
            camera_distance: 3.0,
            backface_culling: false,
            transparent_background: true,
        }
    }

    /// Settings for procedurally generated shapes.
    pub fn sweep() -> Self {
        Self {
            resolution: 1080,
            camera_distance: 7.0,
            backface_culling: true,
            transparent_background: true,
        }
    }
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self::corpus()
    }
}

/// Largest shape count whose identity still fits two hex digits.
pub const MAX_AMOUNT_COUNT: u32 = 0xff;
/// Largest trial count whose indices still fit four hex digits.
pub const MAX_ROTATE_NUM: u32 = 0x1_0000;

/// Bounds of the parametric sweep: angles × shape counts × trial indices.
#[derive(Debug, Clone, PartialEq)]
pub struct SweepConfig {
    pub angles: Vec<f64>,
    /// Shape counts run from 1 to `amount_count` inclusive.
    pub amount_count: u32,
    /// Trial indices run from 0 to `rotate_num` exclusive.
    pub rotate_num: u32,
}

impl SweepConfig {
    pub fn new(angles: Vec<f64>, amount_count: u32, rotate_num: u32) -> Result<Self, ConfigError> {
        if angles.is_empty() {
            return Err(ConfigError::InvalidSweep("no angles to process".into()));
        }
        if let Some(bad) = angles.iter().find(|a| !a.is_finite()) {
            return Err(ConfigError::InvalidDegrees(bad.to_string()));
        }
        if amount_count == 0 {
            return Err(ConfigError::InvalidSweep("amount count must be at least 1".into()));
        }
        // Beyond these the six-digit identity wraps and distinct units share a seed.
        if amount_count > MAX_AMOUNT_COUNT {
            return Err(ConfigError::InvalidSweep(format!(
                "amount count {} exceeds {}",
                amount_count, MAX_AMOUNT_COUNT
            )));
        }
        if rotate_num > MAX_ROTATE_NUM {
            return Err(ConfigError::InvalidSweep(format!(
                "trial count {} exceeds {}",
                rotate_num, MAX_ROTATE_NUM
            )));
        }
        Ok(Self {
            angles,
            amount_count,
            rotate_num,
        })
    }

    /// Total number of work units this sweep enumerates.
    pub fn unit_count(&self) -> usize {
        self.angles.len() * self.amount_count as usize * self.rotate_num as usize
    }
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            angles: vec![15.0, 30.0, 45.0, 60.0, 75.0],
            amount_count: 10,
            rotate_num: 1800,
        }
    }
}

/// Configuration of one batch run.
#[derive(Debug, Clone)]
pub struct BatchConfig {
    /// Root of the dataset; every unit writes below it.
    pub output_dir: PathBuf,
    /// Root of the mesh corpus the manifest identifiers are relative to.
    pub corpus_root: PathBuf,
    pub manifest_path: PathBuf,
    pub step_count: usize,
    pub strategy: RotationStrategy,
    pub resume_policy: ResumePolicy,
    pub render: RenderSettings,
}

impl BatchConfig {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            corpus_root: PathBuf::new(),
            manifest_path: PathBuf::from(DEFAULT_MANIFEST),
            step_count: DEFAULT_STEP_COUNT,
            strategy: RotationStrategy::default(),
            resume_policy: ResumePolicy::default(),
            render: RenderSettings::default(),
        }
    }

    pub fn with_corpus_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.corpus_root = root.into();
        self
    }

    pub fn with_manifest(mut self, path: impl Into<PathBuf>) -> Self {
        self.manifest_path = path.into();
        self
    }

    pub fn with_step_count(mut self, steps: usize) -> Self {
        self.step_count = steps;
        self
    }

    pub fn with_strategy(mut self, strategy: RotationStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_resume_policy(mut self, policy: ResumePolicy) -> Self {
        self.resume_policy = policy;
        self
    }

    pub fn with_render(mut self, render: RenderSettings) -> Self {
        self.render = render;
        self
    }

    /// Location of the source mesh for a corpus identifier.
    pub fn corpus_mesh_path(&self, identifier: &str) -> PathBuf {
        corpus_mesh_path(&self.corpus_root, identifier)
    }
}

pub(crate) fn corpus_mesh_path(root: &Path, identifier: &str) -> PathBuf {
    root.join(identifier).join(CORPUS_MESH_PATH)
}

/// Checks a rotation increment taken from the command line.
pub fn validate_degrees(degrees: f64) -> Result<f64, ConfigError> {
    if degrees.is_finite() {
        Ok(degrees)
    } else {
        Err(ConfigError::InvalidDegrees(degrees.to_string()))
    }
}

/// Directory name for a batch rotated by `degrees` per step.
///
/// Integral increments print without a fractional part (`45`), others in
/// their shortest decimal form (`22.5`).
pub fn batch_name(degrees: f64) -> String {
    if degrees.fract() == 0.0 && degrees.abs() < i64::MAX as f64 {
        (degrees as i64).to_string()
    } else {
        degrees.to_string()
    }
}
