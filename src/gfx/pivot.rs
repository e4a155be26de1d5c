//! # Pivot Rotation
//!
//! Shapes are never rotated directly. They hang under a pivot node at the
//! world origin and only the pivot turns. Every step must turn about a fixed
//! world axis no matter how far the pivot has already turned, and the pivot
//! must sit exactly at the origin after each step.
//!
//! Two strategies produce the same child placement:
//!
//! - [`RotationStrategy::Premultiply`] composes the step on the world side of
//!   the pivot's accumulated transform. Cheap, but the pivot carries the whole
//!   rounding history of the sequence.
//! - [`RotationStrategy::Reparent`] rotates the pivot while it is still
//!   world-aligned, detaches the children keeping their world placement, zeroes
//!   the pivot, then reattaches them. The pivot is the identity between steps,
//!   so no orientation accumulates on it.
//!
//! The batch uses [`RotationStrategy::Reparent`] unless configured otherwise.

use std::fmt;
use std::str::FromStr;

use cgmath::{Matrix4, SquareMatrix};
use log::trace;

use crate::batch::planner::RotationStep;
use crate::errors::CollaboratorError;
use crate::gfx::host::{NodeId, SceneHost};
use crate::gfx::scene::object::without_translation;

/// How a rotation step is applied to the pivot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RotationStrategy {
    /// World-side composition on the accumulated pivot transform.
    Premultiply,
    /// Rotate, unparent keeping transforms, reset pivot, reparent.
    #[default]
    Reparent,
}

impl fmt::Display for RotationStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RotationStrategy::Premultiply => f.write_str("premultiply"),
            RotationStrategy::Reparent => f.write_str("reparent"),
        }
    }
}

impl FromStr for RotationStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "premultiply" => Ok(RotationStrategy::Premultiply),
            "reparent" => Ok(RotationStrategy::Reparent),
            other => Err(format!(
                "unknown rotation strategy '{}', expected 'premultiply' or 'reparent'",
                other
            )),
        }
    }
}

/// Applies rotation steps to a pivot in a [`SceneHost`].
#[derive(Debug, Clone, Copy)]
pub struct PivotRotator {
    pub strategy: RotationStrategy,
}

impl PivotRotator {
    pub fn new(strategy: RotationStrategy) -> Self {
        Self { strategy }
    }

    /// Rotates `pivot` by `step` about the world axis of the step.
    ///
    /// A pivot without children is rotated all the same. With the reparent
    /// strategy, an error after the children were detached leaves them
    /// unparented in the world; the caller must abandon the unit.
    pub fn apply(
        &self,
        host: &mut dyn SceneHost,
        pivot: NodeId,
        step: &RotationStep,
    ) -> Result<(), CollaboratorError> {
        trace!("Rotating pivot {:?} by {}{}", pivot, step.signed_degrees(), step.axis.symbol());
        match self.strategy {
            RotationStrategy::Premultiply => premultiply(host, pivot, step),
            RotationStrategy::Reparent => unparent_reset_reparent(host, pivot, step),
        }
    }
}

fn premultiply(
    host: &mut dyn SceneHost,
    pivot: NodeId,
    step: &RotationStep,
) -> Result<(), CollaboratorError> {
    let current = host.world_transform(pivot)?;
    host.set_world_transform(pivot, without_translation(step.matrix() * current))
}

fn unparent_reset_reparent(
    host: &mut dyn SceneHost,
    pivot: NodeId,
    step: &RotationStep,
) -> Result<(), CollaboratorError> {
    // The pivot is world-aligned here, so its local axes are the world axes.
    let current = host.world_transform(pivot)?;
    host.set_world_transform(pivot, current * step.matrix())?;

    let children = host.children(pivot)?;
    host.unparent(&children, true)?;

    host.set_world_transform(pivot, Matrix4::identity())
        .and_then(|()| host.set_parent(pivot, &children, true))
        .map_err(|e| CollaboratorError::Reparent {
            children: children.len(),
            reason: e.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::planner::{Axis, Direction, RotationPlanner};
    use crate::gfx::geometry::generate_cube;
    use crate::gfx::scene::Scene;
    use approx::assert_abs_diff_eq;
    use cgmath::{Deg, Vector3};

    fn assert_matrix_eq(a: Matrix4<f64>, b: Matrix4<f64>, epsilon: f64) {
        for c in 0..4 {
            for r in 0..4 {
                assert_abs_diff_eq!(a[c][r], b[c][r], epsilon = epsilon);
            }
        }
    }

    fn assert_at_origin(host: &dyn SceneHost, pivot: NodeId) {
        let w = host.world_transform(pivot).unwrap().w;
        assert_abs_diff_eq!(w.x, 0.0, epsilon = 1e-6);
        assert_abs_diff_eq!(w.y, 0.0, epsilon = 1e-6);
        assert_abs_diff_eq!(w.z, 0.0, epsilon = 1e-6);
    }

    /// Pivot with two off-centre children, the second one pre-rotated.
    fn rig() -> (Scene, NodeId, Vec<NodeId>) {
        let mut scene = Scene::new();
        let a = scene.add_mesh("Part", generate_cube()).unwrap();
        let b = scene.add_mesh("Part", generate_cube()).unwrap();
        scene
            .set_world_transform(a, Matrix4::from_translation(Vector3::new(0.3, -0.2, 0.5)))
            .unwrap();
        scene
            .set_world_transform(
                b,
                Matrix4::from_translation(Vector3::new(-0.4, 0.1, 0.0)) * Matrix4::from_angle_y(Deg(20.0)),
            )
            .unwrap();
        let pivot = scene.add_empty("RotationPivot").unwrap();
        scene.set_parent(pivot, &[a, b], true).unwrap();
        (scene, pivot, vec![a, b])
    }

    #[test]
    fn test_pivot_stays_at_origin() {
        for strategy in [RotationStrategy::Premultiply, RotationStrategy::Reparent] {
            let (mut scene, pivot, _) = rig();
            let rotator = PivotRotator::new(strategy);
            for step in RotationPlanner::new(4242, 45.0).take(25) {
                rotator.apply(&mut scene, pivot, &step).unwrap();
                assert_at_origin(&scene, pivot);
            }
        }
    }

    #[test]
    fn test_rotation_is_about_world_axis() {
        // After X+90, a further Z+90 must turn about world Z, not the pivot's
        // local Z (which now points along world -Y).
        for strategy in [RotationStrategy::Premultiply, RotationStrategy::Reparent] {
            let (mut scene, pivot, children) = rig();
            let before = scene.world_transform(children[0]).unwrap();
            let rotator = PivotRotator::new(strategy);
            let steps = [
                RotationStep::new(Axis::X, Direction::Positive, 90.0),
                RotationStep::new(Axis::Z, Direction::Positive, 90.0),
            ];
            for step in &steps {
                rotator.apply(&mut scene, pivot, step).unwrap();
            }
            let expected = steps[1].matrix() * steps[0].matrix() * before;
            assert_matrix_eq(scene.world_transform(children[0]).unwrap(), expected, 1e-9);
        }
    }

    #[test]
    fn test_strategies_agree_on_children() {
        let (mut premul, p_pivot, p_children) = rig();
        let (mut reparent, r_pivot, r_children) = rig();
        let premul_rotator = PivotRotator::new(RotationStrategy::Premultiply);
        let reparent_rotator = PivotRotator::new(RotationStrategy::Reparent);

        for step in RotationPlanner::plan(0xd3ecf2 + 45, 7, 45.0).steps {
            premul_rotator.apply(&mut premul, p_pivot, &step).unwrap();
            reparent_rotator.apply(&mut reparent, r_pivot, &step).unwrap();
            for (p, r) in p_children.iter().zip(&r_children) {
                assert_matrix_eq(
                    premul.world_transform(*p).unwrap(),
                    reparent.world_transform(*r).unwrap(),
                    1e-9,
                );
            }
        }
    }

    #[test]
    fn test_reparent_leaves_pivot_world_aligned() {
        let (mut scene, pivot, children) = rig();
        let rotator = PivotRotator::new(RotationStrategy::Reparent);
        rotator
            .apply(&mut scene, pivot, &RotationStep::new(Axis::Y, Direction::Negative, 30.0))
            .unwrap();
        assert_matrix_eq(scene.world_transform(pivot).unwrap(), Matrix4::identity(), 1e-12);
        assert_eq!(scene.children(pivot).unwrap(), children);
    }

    #[test]
    fn test_premultiply_accumulates_on_pivot() {
        let (mut scene, pivot, _) = rig();
        let rotator = PivotRotator::new(RotationStrategy::Premultiply);
        let plan = RotationPlanner::plan(17, 5, 60.0);
        for step in &plan.steps {
            rotator.apply(&mut scene, pivot, step).unwrap();
        }
        assert_matrix_eq(scene.world_transform(pivot).unwrap(), plan.world_rotation(), 1e-9);
    }

    #[test]
    fn test_childless_pivot_rotates() {
        for strategy in [RotationStrategy::Premultiply, RotationStrategy::Reparent] {
            let mut scene = Scene::new();
            let pivot = scene.add_empty("RotationPivot").unwrap();
            PivotRotator::new(strategy)
                .apply(&mut scene, pivot, &RotationStep::new(Axis::Z, Direction::Positive, 45.0))
                .unwrap();
            assert_at_origin(&scene, pivot);
        }
    }

    #[test]
    fn test_stale_pivot_fails() {
        let (mut scene, pivot, _) = rig();
        scene.reset().unwrap();
        let result = PivotRotator::new(RotationStrategy::default()).apply(
            &mut scene,
            pivot,
            &RotationStep::new(Axis::X, Direction::Positive, 45.0),
        );
        assert!(matches!(result, Err(CollaboratorError::MissingObject(_))));
    }

    #[test]
    fn test_strategy_from_str() {
        assert_eq!("premultiply".parse(), Ok(RotationStrategy::Premultiply));
        assert_eq!("reparent".parse(), Ok(RotationStrategy::Reparent));
        assert!("local".parse::<RotationStrategy>().is_err());
        assert_eq!(RotationStrategy::default().to_string(), "reparent");
    }
}
