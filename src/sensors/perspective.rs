// Copyright @yucwang 2026

use crate::math::constants::{Float, Vector2f, Vector3f};
use crate::math::ray::Ray3f;

/// Pinhole camera. Film coordinates run from the top-left corner (0, 0)
/// to the bottom-right corner (1, 1).
#[derive(Debug, Clone)]
pub struct PerspectiveCamera {
    origin: Vector3f,
    forward: Vector3f,
    right: Vector3f,
    up: Vector3f,
    tan_half_fov_y: Float,
    aspect: Float,
    width: usize,
    height: usize,
}

impl PerspectiveCamera {
    pub fn new(origin: Vector3f,
               target: Vector3f,
               up: Vector3f,
               fov_y_radians: Float,
               width: usize,
               height: usize) -> Self {
        let forward = (target - origin).normalize();
        let right = forward.cross(&up).normalize();
        let up = right.cross(&forward).normalize();

        Self {
            origin,
            forward,
            right,
            up,
            tan_half_fov_y: (0.5 * fov_y_radians).tan(),
            aspect: width.max(1) as Float / height.max(1) as Float,
            width,
            height,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn pixel_count(&self) -> usize {
        self.width * self.height
    }

    pub fn origin(&self) -> Vector3f {
        self.origin
    }

    /// Film coordinate of `pixel_index` displaced by `jitter` in [0, 1)^2.
    pub fn film_uv(&self, pixel_index: usize, jitter: &Vector2f) -> Vector2f {
        let width = self.width.max(1);
        let x = (pixel_index % width) as Float + jitter.x;
        let y = (pixel_index / width) as Float + jitter.y;
        Vector2f::new(x / width as Float, y / self.height.max(1) as Float)
    }

    pub fn generate_ray(&self, uv: &Vector2f) -> Ray3f {
        let px = (2.0 * uv.x - 1.0) * self.aspect * self.tan_half_fov_y;
        let py = (1.0 - 2.0 * uv.y) * self.tan_half_fov_y;
        let dir = self.right * px + self.up * py + self.forward;
        Ray3f::new(self.origin, dir, None, None)
    }
}
