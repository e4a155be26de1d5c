use std::path::Path;

use cgmath::{InnerSpace, Point3, Vector3};
use image::{Rgba, RgbaImage};
use log::trace;

use super::camera::StudioCamera;
use crate::config::RenderSettings;
use crate::errors::CollaboratorError;
use crate::gfx::host::{Renderer, SceneHost};

/// Surface colour of every mesh.
const BASE_COLOR: [f64; 3] = [0.8, 0.8, 0.8];
const AMBIENT: f64 = 0.25;
const DIFFUSE: f64 = 0.75;
const TRANSPARENT: Rgba<u8> = Rgba([0, 0, 0, 0]);
const BACKDROP: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// Software z-buffer renderer with a single fixed key light.
#[derive(Debug, Clone)]
pub struct SilhouetteRenderer {
    settings: RenderSettings,
    camera: StudioCamera,
    /// Direction towards the light, world space.
    light_dir: Vector3<f64>,
}

impl SilhouetteRenderer {
    pub fn new() -> Self {
        let settings = RenderSettings::default();
        Self {
            camera: StudioCamera::from_settings(&settings),
            settings,
            light_dir: Vector3::new(-0.4, -1.0, 0.8).normalize(),
        }
    }

    pub fn settings(&self) -> &RenderSettings {
        &self.settings
    }

    /// Rasterises every mesh instance of `scene` into a new image.
    pub fn render_image(&self, scene: &dyn SceneHost) -> RgbaImage {
        let size = self.settings.resolution;
        let background = if self.settings.transparent_background {
            TRANSPARENT
        } else {
            BACKDROP
        };
        let mut frame = Frame::new(size, background);
        let view_proj = self.camera.build_view_projection_matrix();

        let mut drawn = 0usize;
        for instance in scene.mesh_instances() {
            let world: Vec<Point3<f64>> = instance.mesh.world_vertices(&instance.world).collect();
            let screen: Vec<_> = world
                .iter()
                .map(|&p| StudioCamera::project(&view_proj, p, size))
                .collect();

            for [a, b, c] in instance.mesh.triangles() {
                let (Some(&wa), Some(&wb), Some(&wc)) = (world.get(a), world.get(b), world.get(c)) else {
                    continue;
                };
                // Triangles crossing the near plane are dropped whole.
                let (Some(sa), Some(sb), Some(sc)) = (screen[a], screen[b], screen[c]) else {
                    continue;
                };

                let normal = (wb - wa).cross(wc - wa);
                if normal.magnitude2() == 0.0 {
                    continue;
                }
                let mut normal = normal.normalize();
                let facing = normal.dot(self.camera.eye - wa) > 0.0;
                if !facing {
                    if self.settings.backface_culling {
                        continue;
                    }
                    normal = -normal;
                }

                let shade = AMBIENT + DIFFUSE * normal.dot(self.light_dir).max(0.0);
                frame.fill_triangle([sa, sb, sc], shade_color(shade));
                drawn += 1;
            }
        }

        trace!("Rasterised {} triangles at {}px", drawn, size);
        frame.image
    }
}

impl Default for SilhouetteRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer for SilhouetteRenderer {
    fn configure(&mut self, settings: &RenderSettings) -> Result<(), CollaboratorError> {
        if settings.resolution == 0 {
            return Err(CollaboratorError::RenderSettings("resolution must be positive".into()));
        }
        if !(settings.camera_distance.is_finite() && settings.camera_distance > 0.0) {
            return Err(CollaboratorError::RenderSettings(format!(
                "camera distance must be positive, got {}",
                settings.camera_distance
            )));
        }
        self.settings = settings.clone();
        self.camera = StudioCamera::from_settings(settings);
        Ok(())
    }

    fn render_to(&mut self, scene: &dyn SceneHost, path: &Path) -> Result<(), CollaboratorError> {
        self.render_image(scene)
            .save(path)
            .map_err(|e| CollaboratorError::Render {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })
    }
}

fn shade_color(shade: f64) -> Rgba<u8> {
    let channel = |c: f64| ((c * shade).clamp(0.0, 1.0) * 255.0).round() as u8;
    Rgba([
        channel(BASE_COLOR[0]),
        channel(BASE_COLOR[1]),
        channel(BASE_COLOR[2]),
        255,
    ])
}

/// Colour and depth targets of one frame.
struct Frame {
    image: RgbaImage,
    depth: Vec<f64>,
}

impl Frame {
    fn new(size: u32, background: Rgba<u8>) -> Self {
        Self {
            image: RgbaImage::from_pixel(size, size, background),
            depth: vec![f64::INFINITY; size as usize * size as usize],
        }
    }

    /// Fills a screen-space triangle, sampling at pixel centres. Depth is
    /// interpolated linearly, which is exact for NDC depth.
    fn fill_triangle(&mut self, v: [Vector3<f64>; 3], color: Rgba<u8>) {
        let area = edge(v[0], v[1], v[2]);
        if area == 0.0 {
            return;
        }

        let width = self.image.width();
        let height = self.image.height();
        let min_x = v.iter().map(|p| p.x).fold(f64::INFINITY, f64::min).floor().max(0.0) as u32;
        let min_y = v.iter().map(|p| p.y).fold(f64::INFINITY, f64::min).floor().max(0.0) as u32;
        let max_x = v.iter().map(|p| p.x).fold(f64::NEG_INFINITY, f64::max).ceil();
        let max_y = v.iter().map(|p| p.y).fold(f64::NEG_INFINITY, f64::max).ceil();
        if max_x < 0.0 || max_y < 0.0 {
            return;
        }
        let max_x = (max_x as u32).min(width);
        let max_y = (max_y as u32).min(height);

        for y in min_y..max_y {
            for x in min_x..max_x {
                let p = Vector3::new(x as f64 + 0.5, y as f64 + 0.5, 0.0);
                let w0 = edge(v[1], v[2], p) / area;
                let w1 = edge(v[2], v[0], p) / area;
                let w2 = edge(v[0], v[1], p) / area;
                if w0 < 0.0 || w1 < 0.0 || w2 < 0.0 {
                    continue;
                }

                let z = w0 * v[0].z + w1 * v[1].z + w2 * v[2].z;
                let index = y as usize * width as usize + x as usize;
                if z < self.depth[index] {
                    self.depth[index] = z;
                    self.image.put_pixel(x, y, color);
                }
            }
        }
    }
}

/// Twice the signed area of the triangle `a`, `b`, `p` in screen space.
fn edge(a: Vector3<f64>, b: Vector3<f64>, p: Vector3<f64>) -> f64 {
    (b.x - a.x) * (p.y - a.y) - (b.y - a.y) * (p.x - a.x)
}
