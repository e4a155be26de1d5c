use cgmath::{perspective, Deg, Matrix4, Point3, Vector3, Vector4};

use crate::config::RenderSettings;

/// Vertical field of view of every frame.
pub const FIELD_OF_VIEW: Deg<f64> = Deg(40.0);

/// Fixed camera on the -Y axis looking at the origin, +Z up.
#[derive(Debug, Clone, Copy)]
pub struct StudioCamera {
    pub eye: Point3<f64>,
    pub target: Point3<f64>,
    pub up: Vector3<f64>,
    pub fovy: Deg<f64>,
    pub znear: f64,
    pub zfar: f64,
}

impl StudioCamera {
    pub fn new(distance: f64) -> Self {
        Self {
            eye: Point3::new(0.0, -distance, 0.0),
            target: Point3::new(0.0, 0.0, 0.0),
            up: Vector3::unit_z(),
            fovy: FIELD_OF_VIEW,
            znear: 0.1,
            zfar: distance * 10.0 + 100.0,
        }
    }

    pub fn from_settings(settings: &RenderSettings) -> Self {
        Self::new(settings.camera_distance)
    }

    /// Square frames only, so the aspect ratio is always 1.
    pub fn build_view_projection_matrix(&self) -> Matrix4<f64> {
        let view = Matrix4::look_at_rh(self.eye, self.target, self.up);
        let proj = perspective(self.fovy, 1.0, self.znear, self.zfar);
        proj * view
    }

    /// Projects a world point into pixel coordinates of a `resolution`-sized
    /// frame. Returns `(x, y, depth)` with depth in NDC, or `None` for points
    /// at or behind the near plane.
    pub fn project(
        view_proj: &Matrix4<f64>,
        point: Point3<f64>,
        resolution: u32,
    ) -> Option<Vector3<f64>> {
        let clip = *view_proj * Vector4::new(point.x, point.y, point.z, 1.0);
        if clip.w <= f64::EPSILON {
            return None;
        }
        let ndc = clip.truncate() / clip.w;
        if ndc.z < -1.0 {
            return None;
        }
        let size = resolution as f64;
        Some(Vector3::new(
            (ndc.x + 1.0) * 0.5 * size,
            (1.0 - ndc.y) * 0.5 * size,
            ndc.z,
        ))
    }
}

impl Default for StudioCamera {
    fn default() -> Self {
        Self::from_settings(&RenderSettings::default())
    }
}
