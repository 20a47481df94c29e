// Copyright 2020 @TwoCookingMice

use super::constants::{ Float, Vector3f };
use super::ray::Ray3f;

/// Axis-aligned box. The default box is empty (min > max) and absorbs the
/// first point or box it is expanded by.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct AABB {
    pub p_min: Vector3f,
    pub p_max: Vector3f
}

impl Default for AABB {
    fn default() -> Self {
        Self { p_min: Vector3f::repeat(Float::INFINITY),
               p_max: Vector3f::repeat(-Float::INFINITY) }
    }
}

impl AABB {
    pub fn new(a: Vector3f, b: Vector3f) -> Self {
        Self { p_min: a.inf(&b), p_max: a.sup(&b) }
    }

    pub fn center(&self) -> Vector3f {
        0.5 * (self.p_min + self.p_max)
    }

    pub fn diagonal(&self) -> Vector3f {
        self.p_max - self.p_min
    }

    pub fn expand_by_point(&mut self, p: &Vector3f) {
        self.p_min = self.p_min.inf(p);
        self.p_max = self.p_max.sup(p);
    }

    pub fn expand_by_aabb(&mut self, other: &AABB) {
        self.p_min = self.p_min.inf(&other.p_min);
        self.p_max = self.p_max.sup(&other.p_max);
    }

    /// Position of `p` relative to the box, 0 at `p_min` and 1 at `p_max`
    /// along each non-degenerate axis.
    pub fn offset(&self, p: &Vector3f) -> Vector3f {
        let d = self.diagonal();
        let mut o = p - self.p_min;
        for axis in 0..3 {
            if d[axis] > 0.0 {
                o[axis] /= d[axis];
            }
        }
        o
    }

    /// Slab test against the ray's `[min_t, max_t]` segment.
    pub fn ray_intersect(&self, ray: &Ray3f) -> bool {
        if !self.is_valid() {
            return false;
        }

        let o = ray.origin();
        let d = ray.dir();
        let mut t_near = ray.min_t;
        let mut t_far = ray.max_t;
        for axis in 0..3 {
            if d[axis].abs() < 1e-8 {
                if o[axis] < self.p_min[axis] || o[axis] > self.p_max[axis] {
                    return false;
                }
                continue;
            }

            let inv = 1.0 / d[axis];
            let t0 = (self.p_min[axis] - o[axis]) * inv;
            let t1 = (self.p_max[axis] - o[axis]) * inv;
            t_near = t_near.max(t0.min(t1));
            t_far = t_far.min(t0.max(t1));
            if t_far < t_near {
                return false;
            }
        }
        true
    }

    /// Radius of the sphere centered at `center()` enclosing the box.
    pub fn bounding_radius(&self) -> Float {
        if self.is_valid() { 0.5 * self.diagonal().norm() } else { 0.0 }
    }

    pub fn surface_area(&self) -> Float {
        if !self.is_valid() {
            return 0.0;
        }
        let d = self.diagonal();
        2.0 * (d.x * d.y + d.x * d.z + d.y * d.z)
    }

    pub fn max_extent(&self) -> usize {
        self.diagonal().imax()
    }

    pub fn is_valid(&self) -> bool {
        (0..3).all(|axis| self.p_min[axis] <= self.p_max[axis])
    }
}

#[cfg(test)]
mod tests {
    use super::AABB;
    use super::Ray3f;
    use super::Vector3f;

    #[test]
    fn test_aabb_geometry() {
        let mut bbox = AABB::new(Vector3f::new(1.0, 7.0, 3.0), Vector3f::new(4.0, 4.0, 4.0));
        assert_eq!(bbox.p_min, Vector3f::new(1.0, 4.0, 3.0));
        assert!((bbox.center() - Vector3f::new(2.5, 5.5, 3.5)).norm() < 1e-6);
        assert!((bbox.surface_area() - 30.0).abs() < 1e-5);
        assert!((bbox.offset(&Vector3f::new(2.5, 7.0, 3.0)) - Vector3f::new(0.5, 1.0, 0.0)).norm() < 1e-6);

        bbox.expand_by_point(&Vector3f::new(-1.0, 5.0, 6.0));
        assert_eq!(bbox.p_min.x, -1.0);
        assert_eq!(bbox.p_max.z, 6.0);
        assert_eq!(bbox.max_extent(), 0);

        let mut empty = AABB::default();
        assert!(!empty.is_valid());
        assert_eq!(empty.surface_area(), 0.0);
        assert_eq!(empty.bounding_radius(), 0.0);
        empty.expand_by_aabb(&bbox);
        assert_eq!(empty, bbox);
    }

    #[test]
    fn test_aabb_intersect() {
        let bbox = AABB::new(Vector3f::new(-1.0, -1.0, -1.0), Vector3f::new(1.0, 1.0, 1.0));
        let o = Vector3f::zeros();
        let d = Vector3f::new(1.0, 1.0, 1.0);
        assert!(bbox.ray_intersect(&Ray3f::new(o, d, Some(0.0), Some(1.0))));

        let outside = Vector3f::new(-3.0, 0.0, 0.0);
        let toward = Ray3f::new(outside, Vector3f::new(1.0, 0.0, 0.0), None, None);
        let short = Ray3f::new(outside, Vector3f::new(1.0, 0.0, 0.0), None, Some(1.5));
        let away = Ray3f::new(Vector3f::new(-1.1, 0.0, 0.0), Vector3f::new(-0.1, 10.0, 10.0), None, None);
        assert!(bbox.ray_intersect(&toward));
        assert!(!bbox.ray_intersect(&short));
        assert!(!bbox.ray_intersect(&away));
        assert!(!AABB::default().ray_intersect(&toward));
    }
}
