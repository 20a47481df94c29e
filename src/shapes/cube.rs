// Copyright @yucwang 2026

use crate::math::constants::Vector3f;
use crate::shapes::triangle::{quad, Triangle};

/// Axis-aligned box spanning `p_min`..`p_max` as twelve outward-facing triangles.
pub fn cuboid(p_min: Vector3f, p_max: Vector3f, material_index: usize) -> Vec<Triangle> {
    let (x0, y0, z0) = (p_min.x, p_min.y, p_min.z);
    let (x1, y1, z1) = (p_max.x, p_max.y, p_max.z);
    let v = Vector3f::new;
    let faces = [
        // -z, +z
        [v(x0, y0, z0), v(x0, y1, z0), v(x1, y1, z0), v(x1, y0, z0)],
        [v(x0, y0, z1), v(x1, y0, z1), v(x1, y1, z1), v(x0, y1, z1)],
        // -y, +y
        [v(x0, y0, z0), v(x1, y0, z0), v(x1, y0, z1), v(x0, y0, z1)],
        [v(x0, y1, z0), v(x0, y1, z1), v(x1, y1, z1), v(x1, y1, z0)],
        // -x, +x
        [v(x0, y0, z0), v(x0, y0, z1), v(x0, y1, z1), v(x0, y1, z0)],
        [v(x1, y0, z0), v(x1, y1, z0), v(x1, y1, z1), v(x1, y0, z1)],
    ];

    faces.iter()
        .flat_map(|f| quad(f[0], f[1], f[2], f[3], material_index))
        .collect()
}
