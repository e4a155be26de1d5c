//! # Primitive Shape Generation
//!
//! Axis-aligned boxes, the building block of procedural shapes. Faces are
//! emitted with their own four vertices so that flat shading stays crisp.

use cgmath::Vector3;

use super::MeshData;

/// Unit cube corners per face, counter-clockwise seen from outside.
const CUBE_FACES: [[[f32; 3]; 4]; 6] = [
    // Front face (+Z)
    [[-0.5, -0.5, 0.5], [0.5, -0.5, 0.5], [0.5, 0.5, 0.5], [-0.5, 0.5, 0.5]],
    // Back face (-Z)
    [[-0.5, -0.5, -0.5], [-0.5, 0.5, -0.5], [0.5, 0.5, -0.5], [0.5, -0.5, -0.5]],
    // Left face (-X)
    [[-0.5, -0.5, -0.5], [-0.5, -0.5, 0.5], [-0.5, 0.5, 0.5], [-0.5, 0.5, -0.5]],
    // Right face (+X)
    [[0.5, -0.5, 0.5], [0.5, -0.5, -0.5], [0.5, 0.5, -0.5], [0.5, 0.5, 0.5]],
    // Top face (+Y)
    [[-0.5, 0.5, 0.5], [0.5, 0.5, 0.5], [0.5, 0.5, -0.5], [-0.5, 0.5, -0.5]],
    // Bottom face (-Y)
    [[-0.5, -0.5, -0.5], [0.5, -0.5, -0.5], [0.5, -0.5, 0.5], [-0.5, -0.5, 0.5]],
];

/// Generate a unit cube centered at the origin
///
/// Returns a cube with vertices from -0.5 to 0.5 on all axes.
pub fn generate_cube() -> MeshData {
    generate_box(Vector3::new(0.0, 0.0, 0.0), Vector3::new(0.5, 0.5, 0.5))
}

/// Generate an axis-aligned box
///
/// # Arguments
/// * `center` - Box centre in object space
/// * `half_extents` - Half the box size along each axis
pub fn generate_box(center: Vector3<f32>, half_extents: Vector3<f32>) -> MeshData {
    let mut data = MeshData::default();
    let size = half_extents * 2.0;

    for face in CUBE_FACES.iter() {
        let base = data.vertices.len() as u32;
        for corner in face {
            data.vertices.push([
                center.x + corner[0] * size.x,
                center.y + corner[1] * size.y,
                center.z + corner[2] * size.z,
            ]);
        }
        // 2 triangles per face
        data.indices
            .extend_from_slice(&[base, base + 1, base + 2, base + 2, base + 3, base]);
    }

    data
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cube_generation() {
        let cube = generate_cube();
        assert_eq!(cube.vertices.len(), 24); // 6 faces * 4 vertices
        assert_eq!(cube.indices.len(), 36); // 6 faces * 2 triangles * 3 indices
        assert_eq!(cube.vertex_count(), 24);
        assert_eq!(cube.triangle_count(), 12);
    }

    #[test]
    fn test_box_bounds() {
        let b = generate_box(Vector3::new(1.0, 0.0, -1.0), Vector3::new(0.5, 1.0, 2.0));
        let aabb = b.bounds().unwrap();
        assert_eq!(aabb.min, Vector3::new(0.5, -1.0, -3.0));
        assert_eq!(aabb.max, Vector3::new(1.5, 1.0, 1.0));
    }

    #[test]
    fn test_faces_point_outward() {
        let cube = generate_cube();
        for [a, b, c] in cube.triangles() {
            let (a, b, c) = (
                Vector3::from(cube.vertices[a]),
                Vector3::from(cube.vertices[b]),
                Vector3::from(cube.vertices[c]),
            );
            let normal = (b - a).cross(c - a);
            let centre = (a + b + c) / 3.0;
            assert!(cgmath::dot(normal, centre) > 0.0);
        }
    }
}
