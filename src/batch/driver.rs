//! # Batch Driver
//!
//! Runs every enumerated work unit through the same sequence of states:
//!
//! ```text
//! Reset → Build | Import → Normalize → Parent → RenderSetup → Seed
//!       → RenderBase → RenderStep(1..=n) → Done
//! ```
//!
//! Any collaborator error moves the unit to a failed outcome carrying the
//! state it failed in. The unit's directory is left as it is and the batch
//! moves on; nothing is retried. Units run strictly one after another, and
//! each one starts from a reset scene.

use std::fmt;
use std::fs;

use cgmath::{EuclideanSpace, Matrix4, SquareMatrix};
use log::{debug, info, warn};

use crate::batch::enumerate::{UnitSource, WorkUnit, WorkUnitEnumerator};
use crate::batch::planner::{FramePath, RotationPlanner};
use crate::batch::resume::{mark_complete, ResumeGuard};
use crate::config::BatchConfig;
use crate::errors::{CollaboratorError, UnitInputError};
use crate::gfx::geometry::vertex_centroid;
use crate::gfx::host::{MeshImporter, NodeId, Renderer, SceneHost, ShapeBuilder, ShapeParams};
use crate::gfx::pivot::PivotRotator;

/// Name of the empty every unit's shape is parented to.
pub const PIVOT_NAME: &str = "RotationPivot";

/// Where a unit is in its run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitState {
    Reset,
    Build,
    Import,
    Normalize,
    Parent,
    RenderSetup,
    Seed,
    RenderBase,
    /// Rotating and rendering step `i`, counted from 1.
    RenderStep(usize),
    Done,
}

impl fmt::Display for UnitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnitState::Reset => f.write_str("reset"),
            UnitState::Build => f.write_str("build"),
            UnitState::Import => f.write_str("import"),
            UnitState::Normalize => f.write_str("normalize"),
            UnitState::Parent => f.write_str("parent"),
            UnitState::RenderSetup => f.write_str("render setup"),
            UnitState::Seed => f.write_str("seed"),
            UnitState::RenderBase => f.write_str("render base"),
            UnitState::RenderStep(i) => write!(f, "render step {}", i),
            UnitState::Done => f.write_str("done"),
        }
    }
}

#[derive(Debug)]
pub enum SkipReason {
    /// Output already satisfies the resume policy.
    AlreadyComplete,
    InvalidInput(UnitInputError),
}

/// Result of one work unit.
#[derive(Debug)]
pub enum UnitOutcome {
    /// Every frame was written; file names in render order.
    Rendered { frames: Vec<String> },
    Skipped(SkipReason),
    Failed {
        state: UnitState,
        error: CollaboratorError,
    },
}

/// Unit counts of a finished batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub processed: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl BatchReport {
    pub fn record(&mut self, outcome: &UnitOutcome) {
        match outcome {
            UnitOutcome::Rendered { .. } => self.processed += 1,
            UnitOutcome::Skipped(_) => self.skipped += 1,
            UnitOutcome::Failed { .. } => self.failed += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.processed + self.skipped + self.failed
    }
}

impl fmt::Display for BatchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} processed, {} skipped, {} failed",
            self.processed, self.skipped, self.failed
        )
    }
}

/// Sequential executor of work units against the scene collaborators.
pub struct BatchDriver<'a> {
    host: &'a mut dyn SceneHost,
    shapes: &'a mut dyn ShapeBuilder,
    importer: &'a mut dyn MeshImporter,
    renderer: &'a mut dyn Renderer,
    config: &'a BatchConfig,
    guard: ResumeGuard,
    rotator: PivotRotator,
}

impl<'a> BatchDriver<'a> {
    pub fn new(
        host: &'a mut dyn SceneHost,
        shapes: &'a mut dyn ShapeBuilder,
        importer: &'a mut dyn MeshImporter,
        renderer: &'a mut dyn Renderer,
        config: &'a BatchConfig,
    ) -> Self {
        Self {
            host,
            shapes,
            importer,
            renderer,
            config,
            guard: ResumeGuard::new(config.resume_policy),
            rotator: PivotRotator::new(config.strategy),
        }
    }

    /// Processes every unit of `enumerator`. Never aborts on a unit failure.
    pub fn run(&mut self, enumerator: &WorkUnitEnumerator) -> BatchReport {
        let total = enumerator.unit_count();
        let mut report = BatchReport::default();

        for (i, unit) in enumerator.units().enumerate() {
            let progress = format!("[{}/{}]", i + 1, total);
            let outcome = self.process_unit(&unit);
            match &outcome {
                UnitOutcome::Rendered { frames } => {
                    info!("{} {}: rendered {} frames", progress, unit, frames.len())
                }
                UnitOutcome::Skipped(SkipReason::AlreadyComplete) => {
                    info!("{} {}: already rendered, skipping", progress, unit)
                }
                UnitOutcome::Skipped(SkipReason::InvalidInput(e)) => {
                    warn!("{} {}: skipped: {}", progress, unit, e)
                }
                UnitOutcome::Failed { state, error } => {
                    warn!("{} {}: failed during {}: {}", progress, unit, state, error)
                }
            }
            report.record(&outcome);
        }

        report
    }

    /// Runs one unit to completion, skip or failure.
    ///
    /// A skipped unit makes no collaborator call at all.
    pub fn process_unit(&mut self, unit: &WorkUnit) -> UnitOutcome {
        if self.guard.should_skip(&unit.output_dir) {
            return UnitOutcome::Skipped(SkipReason::AlreadyComplete);
        }
        if let UnitSource::Corpus { mesh_path, .. } = &unit.source {
            if !mesh_path.is_file() {
                return UnitOutcome::Skipped(SkipReason::InvalidInput(
                    UnitInputError::MissingSourceMesh(mesh_path.clone()),
                ));
            }
        }

        let mut state = UnitState::Reset;
        match self.render_unit(unit, &mut state) {
            Ok(frames) => UnitOutcome::Rendered { frames },
            Err(error) => UnitOutcome::Failed { state, error },
        }
    }

    fn render_unit(
        &mut self,
        unit: &WorkUnit,
        state: &mut UnitState,
    ) -> Result<Vec<String>, CollaboratorError> {
        // The directory exists before any frame is rendered.
        fs::create_dir_all(&unit.output_dir)?;

        *state = UnitState::Reset;
        self.host.reset()?;

        let objects = match &unit.source {
            UnitSource::Shape { amount, trial } => {
                *state = UnitState::Build;
                let params = ShapeParams {
                    amount: *amount,
                    seed: u64::from(*trial),
                };
                vec![self.shapes.build_shape(&mut *self.host, &params)?]
            }
            UnitSource::Corpus { mesh_path, .. } => {
                *state = UnitState::Import;
                self.importer.import_mesh(&mut *self.host, mesh_path)?
            }
        };

        *state = UnitState::Normalize;
        match &unit.source {
            UnitSource::Shape { .. } => {
                for &object in &objects {
                    self.host.set_world_transform(object, Matrix4::identity())?;
                }
            }
            UnitSource::Corpus { .. } => center_on_origin(&mut *self.host, &objects)?,
        }

        *state = UnitState::Parent;
        let pivot = self.host.add_empty(PIVOT_NAME)?;
        self.host.set_parent(pivot, &objects, true)?;

        *state = UnitState::RenderSetup;
        self.renderer.configure(&self.config.render)?;

        *state = UnitState::Seed;
        let seed = unit.seed();
        debug!("{}: seed {}", unit, seed);
        let mut planner = RotationPlanner::new(seed, unit.rotation_degrees);

        let mut frames = Vec::with_capacity(self.config.step_count + 1);
        let mut path = FramePath::base();

        *state = UnitState::RenderBase;
        frames.push(self.render_frame(unit, &path)?);

        for i in 1..=self.config.step_count {
            *state = UnitState::RenderStep(i);
            let step = planner.next_step();
            self.rotator.apply(&mut *self.host, pivot, &step)?;
            path.push(&step);
            frames.push(self.render_frame(unit, &path)?);
        }

        mark_complete(&unit.output_dir, &frames)?;
        *state = UnitState::Done;
        Ok(frames)
    }

    fn render_frame(&mut self, unit: &WorkUnit, path: &FramePath) -> Result<String, CollaboratorError> {
        let file_name = path.file_name();
        let target = unit.output_dir.join(&file_name);
        self.renderer.render_to(&*self.host, &target)?;
        debug!("Rendered {}", target.display());
        Ok(file_name)
    }
}

/// Moves `objects` so the average of all their world-space vertices sits at
/// the origin.
fn center_on_origin(host: &mut dyn SceneHost, objects: &[NodeId]) -> Result<(), CollaboratorError> {
    let mut vertices = Vec::new();
    for &object in objects {
        let world = host.world_transform(object)?;
        if let Some(mesh) = host.mesh(object)? {
            vertices.extend(mesh.world_vertices(&world));
        }
    }

    let Some(centroid) = vertex_centroid(vertices) else {
        return Ok(());
    };
    let offset = Matrix4::from_translation(-centroid.to_vec());
    for &object in objects {
        let world = host.world_transform(object)?;
        host.set_world_transform(object, offset * world)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::enumerate::Manifest;
    use crate::batch::resume::COMPLETION_MARKER;
    use crate::config::{RenderSettings, SweepConfig};
    use crate::gfx::geometry::{generate_cube, shapegen::ExtrusionShapeBuilder, MeshData};
    use crate::gfx::host::MeshInstance;
    use crate::gfx::pivot::RotationStrategy;
    use crate::gfx::scene::Scene;
    use approx::assert_abs_diff_eq;
    use cgmath::Vector3;
    use std::cell::Cell;
    use std::path::{Path, PathBuf};

    /// Scene wrapper counting every call and optionally failing `set_parent`.
    #[derive(Default)]
    struct RecordingHost {
        scene: Scene,
        calls: Cell<usize>,
        set_parent_calls: usize,
        fail_set_parent_at: Option<usize>,
    }

    impl RecordingHost {
        fn hit(&self) {
            self.calls.set(self.calls.get() + 1);
        }
    }

    impl SceneHost for RecordingHost {
        fn reset(&mut self) -> Result<(), CollaboratorError> {
            self.hit();
            self.scene.reset()
        }

        fn add_empty(&mut self, name: &str) -> Result<NodeId, CollaboratorError> {
            self.hit();
            self.scene.add_empty(name)
        }

        fn add_mesh(&mut self, name: &str, mesh: MeshData) -> Result<NodeId, CollaboratorError> {
            self.hit();
            self.scene.add_mesh(name, mesh)
        }

        fn world_transform(&self, node: NodeId) -> Result<Matrix4<f64>, CollaboratorError> {
            self.hit();
            self.scene.world_transform(node)
        }

        fn set_world_transform(
            &mut self,
            node: NodeId,
            transform: Matrix4<f64>,
        ) -> Result<(), CollaboratorError> {
            self.hit();
            self.scene.set_world_transform(node, transform)
        }

        fn set_parent(
            &mut self,
            parent: NodeId,
            objects: &[NodeId],
            keep_world_transform: bool,
        ) -> Result<(), CollaboratorError> {
            self.hit();
            self.set_parent_calls += 1;
            if self.fail_set_parent_at == Some(self.set_parent_calls) {
                return Err(CollaboratorError::InvalidHierarchy {
                    parent,
                    child: objects[0],
                });
            }
            self.scene.set_parent(parent, objects, keep_world_transform)
        }

        fn unparent(
            &mut self,
            objects: &[NodeId],
            keep_world_transform: bool,
        ) -> Result<(), CollaboratorError> {
            self.hit();
            self.scene.unparent(objects, keep_world_transform)
        }

        fn children(&self, node: NodeId) -> Result<Vec<NodeId>, CollaboratorError> {
            self.hit();
            self.scene.children(node)
        }

        fn mesh(&self, node: NodeId) -> Result<Option<&MeshData>, CollaboratorError> {
            self.hit();
            self.scene.mesh(node)
        }

        fn mesh_instances(&self) -> Vec<MeshInstance<'_>> {
            self.hit();
            self.scene.mesh_instances()
        }
    }

    /// Importer placing one cube off-centre, failing for paths it is told to.
    #[derive(Default)]
    struct FakeImporter {
        calls: usize,
        fail_for: Vec<PathBuf>,
    }

    impl MeshImporter for FakeImporter {
        fn import_mesh(
            &mut self,
            host: &mut dyn SceneHost,
            path: &Path,
        ) -> Result<Vec<NodeId>, CollaboratorError> {
            self.calls += 1;
            if self.fail_for.iter().any(|p| p == path) {
                return Err(CollaboratorError::Import {
                    path: path.to_path_buf(),
                    reason: "corrupt".into(),
                });
            }
            let node = host.add_mesh("model", generate_cube())?;
            host.set_world_transform(node, Matrix4::from_translation(Vector3::new(2.0, 0.5, -1.0)))?;
            Ok(vec![node])
        }
    }

    /// Renderer writing the frame name as file content.
    #[derive(Default)]
    struct FakeRenderer {
        configured: usize,
        rendered: Vec<PathBuf>,
    }

    impl Renderer for FakeRenderer {
        fn configure(&mut self, _settings: &RenderSettings) -> Result<(), CollaboratorError> {
            self.configured += 1;
            Ok(())
        }

        fn render_to(&mut self, _scene: &dyn SceneHost, path: &Path) -> Result<(), CollaboratorError> {
            let name = path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
            fs::write(path, name)?;
            self.rendered.push(path.to_path_buf());
            Ok(())
        }
    }

    fn fakes() -> (RecordingHost, FakeImporter, FakeRenderer) {
        Default::default()
    }

    fn sweep(output_dir: &Path, trials: u32) -> WorkUnitEnumerator {
        WorkUnitEnumerator::Sweep {
            sweep: SweepConfig::new(vec![45.0], 1, trials).unwrap(),
            output_dir: output_dir.to_path_buf(),
        }
    }

    fn write_mesh(root: &Path, identifier: &str) {
        let path = crate::config::corpus_mesh_path(root, identifier);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "").unwrap();
    }

    fn run(
        config: &BatchConfig,
        enumerator: &WorkUnitEnumerator,
        host: &mut RecordingHost,
        importer: &mut FakeImporter,
        renderer: &mut FakeRenderer,
    ) -> BatchReport {
        let mut shapes = ExtrusionShapeBuilder::default();
        BatchDriver::new(host, &mut shapes, importer, renderer, config).run(enumerator)
    }

    #[test]
    fn test_unit_renders_base_plus_steps() {
        let out = tempfile::tempdir().unwrap();
        let config = BatchConfig::new(out.path());
        let enumerator = sweep(out.path(), 1);
        let unit = enumerator.units().next().unwrap();

        let (mut host, mut importer, mut renderer) = fakes();
        let mut shapes = ExtrusionShapeBuilder::default();
        let outcome = BatchDriver::new(&mut host, &mut shapes, &mut importer, &mut renderer, &config)
            .process_unit(&unit);

        let UnitOutcome::Rendered { frames } = outcome else {
            panic!("unit did not render: {:?}", outcome);
        };
        let expected: Vec<_> = RotationPlanner::plan(unit.seed(), 7, 45.0)
            .frame_paths()
            .iter()
            .map(FramePath::file_name)
            .collect();
        assert_eq!(frames, expected);
        assert_eq!(frames.len(), 8);
        assert_eq!(frames[0], "base.png");

        let pngs = fs::read_dir(&unit.output_dir)
            .unwrap()
            .filter(|e| e.as_ref().unwrap().path().extension().is_some_and(|x| x == "png"))
            .count();
        assert_eq!(pngs, 8);
        assert!(unit.output_dir.join(COMPLETION_MARKER).is_file());
        assert_eq!(renderer.configured, 1);
        assert_eq!(host.scene.get_statistics().mesh_count, 1);
    }

    #[test]
    fn test_second_run_renders_nothing() {
        let out = tempfile::tempdir().unwrap();
        let config = BatchConfig::new(out.path());
        let enumerator = sweep(out.path(), 3);

        let (mut host, mut importer, mut renderer) = fakes();
        let first = run(&config, &enumerator, &mut host, &mut importer, &mut renderer);
        assert_eq!(first, BatchReport { processed: 3, skipped: 0, failed: 0 });
        let snapshot = fs::read(out.path().join("45/1/2/base.png")).unwrap();

        let (mut host, mut importer, mut renderer) = fakes();
        let second = run(&config, &enumerator, &mut host, &mut importer, &mut renderer);
        assert_eq!(second, BatchReport { processed: 0, skipped: 3, failed: 0 });
        assert!(renderer.rendered.is_empty());
        assert_eq!(host.calls.get(), 0);
        assert_eq!(fs::read(out.path().join("45/1/2/base.png")).unwrap(), snapshot);
    }

    #[test]
    fn test_existing_output_makes_no_calls() {
        let out = tempfile::tempdir().unwrap();
        let corpus = tempfile::tempdir().unwrap();
        write_mesh(corpus.path(), "02747177/60b743e9");
        let config = BatchConfig::new(out.path()).with_corpus_root(corpus.path());
        let enumerator = WorkUnitEnumerator::Corpus {
            manifest: Manifest::from_lines(["02747177/60b743e9"]),
            angles: vec![45.0],
            output_dir: out.path().to_path_buf(),
            corpus_root: corpus.path().to_path_buf(),
        };
        let unit_dir = out.path().join("45/02747177/60b743e9");
        fs::create_dir_all(&unit_dir).unwrap();
        fs::write(unit_dir.join("base.png"), "partial").unwrap();

        let (mut host, mut importer, mut renderer) = fakes();
        let report = run(&config, &enumerator, &mut host, &mut importer, &mut renderer);

        assert_eq!(report.skipped, 1);
        assert_eq!(host.calls.get(), 0);
        assert_eq!(importer.calls, 0);
        assert_eq!(renderer.configured, 0);
        assert!(renderer.rendered.is_empty());
    }

    #[test]
    fn test_failed_unit_does_not_stop_batch() {
        let out = tempfile::tempdir().unwrap();
        let corpus = tempfile::tempdir().unwrap();
        let ids = ["03001627/aaaaaa", "03001627/bbbbbb", "03001627/cccccc"];
        for id in &ids[..2] {
            write_mesh(corpus.path(), id);
        }
        let config = BatchConfig::new(out.path()).with_corpus_root(corpus.path());
        let enumerator = WorkUnitEnumerator::Corpus {
            manifest: Manifest::from_lines(ids),
            angles: vec![30.0],
            output_dir: out.path().to_path_buf(),
            corpus_root: corpus.path().to_path_buf(),
        };

        let mut host = RecordingHost::default();
        let mut importer = FakeImporter {
            fail_for: vec![config.corpus_mesh_path(ids[0])],
            ..Default::default()
        };
        let mut renderer = FakeRenderer::default();
        let report = run(&config, &enumerator, &mut host, &mut importer, &mut renderer);

        // Import failure, one good unit, one missing mesh.
        assert_eq!(report, BatchReport { processed: 1, skipped: 1, failed: 1 });
        let failed_dir = out.path().join("30/03001627/aaaaaa");
        assert!(failed_dir.is_dir());
        assert!(!failed_dir.join(COMPLETION_MARKER).exists());
        assert!(out.path().join("30/03001627/bbbbbb/.complete").is_file());
        assert!(!out.path().join("30/03001627/cccccc").exists());
    }

    #[test]
    fn test_reparent_failure_fails_unit() {
        let out = tempfile::tempdir().unwrap();
        let config = BatchConfig::new(out.path()).with_strategy(RotationStrategy::Reparent);
        let enumerator = sweep(out.path(), 1);
        let unit = enumerator.units().next().unwrap();

        // The first set_parent attaches the shape, the second reattaches it
        // after the first rotation.
        let mut host = RecordingHost {
            fail_set_parent_at: Some(2),
            ..Default::default()
        };
        let (_, mut importer, mut renderer) = fakes();
        let mut shapes = ExtrusionShapeBuilder::default();
        let outcome = BatchDriver::new(&mut host, &mut shapes, &mut importer, &mut renderer, &config)
            .process_unit(&unit);

        match outcome {
            UnitOutcome::Failed { state, error } => {
                assert_eq!(state, UnitState::RenderStep(1));
                assert!(matches!(error, CollaboratorError::Reparent { children: 1, .. }));
            }
            other => panic!("expected failure, got {:?}", other),
        }
        assert!(unit.output_dir.join("base.png").is_file());
        assert!(!unit.output_dir.join(COMPLETION_MARKER).exists());
    }

    #[test]
    fn test_imported_model_centred_under_pivot() {
        let out = tempfile::tempdir().unwrap();
        let corpus = tempfile::tempdir().unwrap();
        write_mesh(corpus.path(), "04379243/87882e55");
        let config = BatchConfig::new(out.path())
            .with_corpus_root(corpus.path())
            .with_strategy(RotationStrategy::Premultiply);
        let enumerator = WorkUnitEnumerator::Corpus {
            manifest: Manifest::from_lines(["04379243/87882e55"]),
            angles: vec![60.0],
            output_dir: out.path().to_path_buf(),
            corpus_root: corpus.path().to_path_buf(),
        };

        let (mut host, mut importer, mut renderer) = fakes();
        let report = run(&config, &enumerator, &mut host, &mut importer, &mut renderer);
        assert_eq!(report.processed, 1);

        // Rotation about the origin keeps the centroid there.
        let instances = host.scene.mesh_instances();
        let centroid =
            vertex_centroid(instances.iter().flat_map(|i| i.mesh.world_vertices(&i.world))).unwrap();
        assert_abs_diff_eq!(centroid.x, 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(centroid.y, 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(centroid.z, 0.0, epsilon = 1e-9);
    }
}
