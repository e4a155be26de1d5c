//! # Procedural Shapes
//!
//! Blocky abstract shapes grown from a base box. Each extrusion attaches a new
//! box of random size to a random face of a box already in the shape. The
//! parts are then baked into a single mesh whose bounds are centred on the
//! origin.
//!
//! The same [`ShapeParams`] always produce the same mesh.

use cgmath::Vector3;
use log::debug;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use super::{generate_box, Aabb, MeshData};
use crate::errors::CollaboratorError;
use crate::gfx::host::{NodeId, SceneHost, ShapeBuilder, ShapeParams};

/// Name given to the baked shape object.
pub const SHAPE_NAME: &str = "Generated Shape";

/// Size limits for the generated boxes, as half extents.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExtrusionLimits {
    pub base_min: f32,
    pub base_max: f32,
    pub part_min: f32,
    pub part_max: f32,
    /// Fraction of a new part's depth sunk into the face it grows from.
    pub overlap: f32,
}

impl Default for ExtrusionLimits {
    fn default() -> Self {
        Self {
            base_min: 0.4,
            base_max: 1.0,
            part_min: 0.2,
            part_max: 0.8,
            overlap: 0.1,
        }
    }
}

/// [`ShapeBuilder`] producing baked extruded-box shapes.
#[derive(Debug, Clone, Default)]
pub struct ExtrusionShapeBuilder {
    pub limits: ExtrusionLimits,
}

impl ExtrusionShapeBuilder {
    pub fn new(limits: ExtrusionLimits) -> Self {
        Self { limits }
    }

    /// Generates the part boxes of a shape.
    pub fn generate_parts(&self, params: &ShapeParams) -> Vec<Aabb> {
        let limits = &self.limits;
        let mut rng = ChaCha8Rng::seed_from_u64(params.seed);
        let random_extents = |min: f32, max: f32, rng: &mut ChaCha8Rng| {
            Vector3::new(
                rng.random_range(min..=max),
                rng.random_range(min..=max),
                rng.random_range(min..=max),
            )
        };

        let base = random_extents(limits.base_min, limits.base_max, &mut rng);
        let mut parts = vec![Aabb::new(-base, base)];

        for _ in 0..params.amount {
            let parent = parts[rng.random_range(0..parts.len())];
            let axis = rng.random_range(0..3usize);
            let sign = if rng.random_bool(0.5) { 1.0 } else { -1.0 };
            let half = random_extents(limits.part_min, limits.part_max, &mut rng);

            let parent_center = parent.center();
            let parent_half = parent.half_extents();
            let mut center = Vector3::new(0.0, 0.0, 0.0);
            for i in 0..3 {
                center[i] = if i == axis {
                    parent_center[i] + sign * (parent_half[i] + half[i] * (1.0 - 2.0 * limits.overlap))
                } else {
                    parent_center[i] + rng.random_range(-parent_half[i]..=parent_half[i])
                };
            }
            parts.push(Aabb::new(center - half, center + half));
        }

        parts
    }

    /// Joins the parts into one mesh centred on its bounds.
    pub fn bake(parts: &[Aabb]) -> MeshData {
        let mut mesh = MeshData::default();
        for part in parts {
            mesh.append(&generate_box(part.center(), part.half_extents()));
        }
        if let Some(bounds) = mesh.bounds() {
            mesh.translate(-bounds.center());
        }
        mesh
    }
}

impl ShapeBuilder for ExtrusionShapeBuilder {
    fn build_shape(
        &mut self,
        host: &mut dyn SceneHost,
        params: &ShapeParams,
    ) -> Result<NodeId, CollaboratorError> {
        if params.amount == 0 {
            return Err(CollaboratorError::Build("amount must be at least 1".into()));
        }

        let parts = self.generate_parts(params);
        let mesh = Self::bake(&parts);
        if mesh.is_empty() {
            return Err(CollaboratorError::ObjectVanished(SHAPE_NAME.into()));
        }

        debug!(
            "Baked shape (amount {}, seed {}): {} parts, {} triangles",
            params.amount,
            params.seed,
            parts.len(),
            mesh.triangle_count()
        );
        host.add_mesh(SHAPE_NAME, mesh)
    }
}
