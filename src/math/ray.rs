// Copyright 2020 @TwoCookingMice

use super::constants::{Float, Vector3f, FLOAT_MAX, RAY_EPSILON};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray3f {
    origin: Vector3f,
    dir: Vector3f,
    pub min_t: Float,
    pub max_t: Float
}

impl Default for Ray3f {
    fn default() -> Self {
        Self { origin: Vector3f::zeros(),
               dir: Vector3f::new(0.0, 0.0, 1.0),
               min_t: 0.0,
               max_t: FLOAT_MAX }
    }
}

impl Ray3f {
    pub fn new(o: Vector3f, d: Vector3f,
               min_t: Option<Float>, max_t: Option<Float>) -> Self {
        Self { origin: o, dir: d.normalize(),
               min_t: min_t.unwrap_or(0.0),
               max_t: max_t.unwrap_or(FLOAT_MAX)}
    }

    /// Continuation ray leaving a surface point; skips self-intersection.
    pub fn spawn(o: Vector3f, d: Vector3f) -> Self {
        Self::new(o, d, Some(RAY_EPSILON), None)
    }

    /// Segment ray that stops just short of `target`.
    pub fn segment(o: Vector3f, target: Vector3f) -> Option<Self> {
        let delta = target - o;
        let length = delta.norm();
        if length <= 2.0 * RAY_EPSILON {
            return None;
        }
        Some(Self::new(o, delta / length, Some(RAY_EPSILON), Some(length - RAY_EPSILON)))
    }

    pub fn origin(&self) -> Vector3f {
        self.origin
    }

    pub fn dir(&self) -> Vector3f {
        self.dir
    }

    pub fn at(&self, t: Float) -> Vector3f {
        self.origin + self.dir * t
    }

    pub fn test_segment(&self, t: Float) -> bool {
        t >= self.min_t && t <= self.max_t
    }
}

/* Tests for Ray */

#[cfg(test)]
mod tests {
    use super::Vector3f;
    use super::Ray3f;

    #[test]
    fn test_ray3f() {
        let o = Vector3f::new(0.0, 0.0, 0.0);
        let d = Vector3f::new(1.0, 0.0, 1.0);
        let ray = Ray3f::new(o, d, None, None);
        assert_eq!(o, ray.origin());

        let v1 = ray.at(2.0);
        assert!((v1[0] - std::f32::consts::SQRT_2).abs() < 1e-5);
        assert!((v1[1] - 0.0).abs() < 1e-5);
        assert!((v1[2] - std::f32::consts::SQRT_2).abs() < 1e-5);

        let spawned = Ray3f::spawn(o, d);
        assert!(!spawned.test_segment(0.0));
        assert!(spawned.test_segment(100.0));
    }

    #[test]
    fn test_segment_stops_before_target() {
        let ray = Ray3f::segment(Vector3f::zeros(), Vector3f::new(0.0, 3.0, 0.0)).unwrap();
        assert!(ray.max_t < 3.0);
        assert!(ray.test_segment(2.9));
        assert!(!ray.test_segment(3.0));
        assert!(Ray3f::segment(Vector3f::zeros(), Vector3f::zeros()).is_none());
    }
}
