// Copyright @yucwang 2023

use crate::core::interaction::Intersection;
use crate::math::aabb::AABB;
use crate::math::constants::{ Float, Vector2f, Vector3f };
use crate::math::ray::Ray3f;
use crate::math::warp::square_to_triangle;

/// Scene primitive. Vertex normals and uvs are optional; the front face follows
/// the winding p0 -> p1 -> p2.
#[derive(Debug, Clone)]
pub struct Triangle {
    p: [Vector3f; 3],
    n: Option<[Vector3f; 3]>,
    uv: [Vector2f; 3],
    geo_normal: Vector3f,
    area: Float,
    pub material_index: usize,
    pub emitter_index: Option<usize>,
}

/// Point drawn uniformly on a triangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrianglePoint {
    pub pos: Vector3f,
    pub normal: Vector3f,
    pub barycentric: Vector3f,
    pub pdf_area: Float,
}

impl Triangle {
    pub fn new(p0: Vector3f, p1: Vector3f, p2: Vector3f, material_index: usize) -> Self {
        let cross = (p1 - p0).cross(&(p2 - p0));
        let len = cross.norm();
        let geo_normal = if len > 0.0 { cross / len } else { Vector3f::new(0.0, 0.0, 1.0) };
        Triangle {
            p: [p0, p1, p2],
            n: None,
            uv: [Vector2f::new(0.0, 0.0), Vector2f::new(1.0, 0.0), Vector2f::new(0.0, 1.0)],
            geo_normal,
            area: 0.5 * len,
            material_index,
            emitter_index: None,
        }
    }

    pub fn with_normals(mut self, n0: Vector3f, n1: Vector3f, n2: Vector3f) -> Self {
        self.n = Some([n0.normalize(), n1.normalize(), n2.normalize()]);
        self
    }

    pub fn with_uvs(mut self, uv0: Vector2f, uv1: Vector2f, uv2: Vector2f) -> Self {
        self.uv = [uv0, uv1, uv2];
        self
    }

    pub fn bounding_box(&self) -> AABB {
        let mut bound = AABB::new(self.p[0], self.p[1]);
        bound.expand_by_point(&self.p[2]);
        bound
    }

    pub fn centroid(&self) -> Vector3f {
        (self.p[0] + self.p[1] + self.p[2]) / 3.0
    }

    pub fn surface_area(&self) -> Float {
        self.area
    }

    pub fn geometric_normal(&self) -> Vector3f {
        self.geo_normal
    }

    pub fn vertices(&self) -> (Vector3f, Vector3f, Vector3f) {
        (self.p[0], self.p[1], self.p[2])
    }

    /// Two-sided ray test. Returns the distance and the (b1, b2) barycentrics.
    pub fn ray_intersection_t(&self, ray: &Ray3f) -> Option<(Float, Vector2f)> {
        let e1 = self.p[1] - self.p[0];
        let e2 = self.p[2] - self.p[0];
        let pvec = ray.dir().cross(&e2);
        let det = e1.dot(&pvec);
        if det.abs() < 1e-12 {
            return None;
        }

        let inv_det = 1.0 / det;
        let tvec = ray.origin() - self.p[0];
        let b1 = tvec.dot(&pvec) * inv_det;
        if b1 < 0.0 || b1 > 1.0 {
            return None;
        }

        let qvec = tvec.cross(&e1);
        let b2 = ray.dir().dot(&qvec) * inv_det;
        if b2 < 0.0 || b1 + b2 > 1.0 {
            return None;
        }

        let t = e2.dot(&qvec) * inv_det;
        if !ray.test_segment(t) {
            return None;
        }
        Some((t, Vector2f::new(b1, b2)))
    }

    pub fn ray_intersection(&self, ray: &Ray3f, triangle_index: usize) -> Option<Intersection> {
        self.ray_intersection_t(ray)
            .map(|(t, b)| self.intersection_at(t, &b, triangle_index))
    }

    pub fn intersection_at(&self, t: Float, b: &Vector2f, triangle_index: usize) -> Intersection {
        let barycentric = Vector3f::new(1.0 - b.x - b.y, b.x, b.y);
        Intersection {
            pos: self.interpolate_position(&barycentric),
            geo_normal: self.geo_normal,
            sh_normal: self.shading_normal(&barycentric),
            barycentric,
            tex: self.uv[0] * barycentric.x + self.uv[1] * barycentric.y + self.uv[2] * barycentric.z,
            t,
            triangle_index,
            material_index: self.material_index,
            emitter_index: self.emitter_index,
        }
    }

    pub fn sample(&self, u: &Vector2f) -> TrianglePoint {
        let b = square_to_triangle(u);
        let barycentric = Vector3f::new(1.0 - b.x - b.y, b.x, b.y);
        TrianglePoint {
            pos: self.interpolate_position(&barycentric),
            normal: self.geo_normal,
            barycentric,
            pdf_area: if self.area > 0.0 { 1.0 / self.area } else { 0.0 },
        }
    }

    fn interpolate_position(&self, b: &Vector3f) -> Vector3f {
        self.p[0] * b.x + self.p[1] * b.y + self.p[2] * b.z
    }

    fn shading_normal(&self, b: &Vector3f) -> Vector3f {
        match &self.n {
            Some(n) => {
                let sh = n[0] * b.x + n[1] * b.y + n[2] * b.z;
                if sh.norm_squared() > 0.0 { sh.normalize() } else { self.geo_normal }
            }
            None => self.geo_normal,
        }
    }
}

/// Two triangles covering the planar quad p0 p1 p2 p3 (counter-clockwise).
pub fn quad(p0: Vector3f, p1: Vector3f, p2: Vector3f, p3: Vector3f, material_index: usize) -> [Triangle; 2] {
    [
        Triangle::new(p0, p1, p2, material_index)
            .with_uvs(Vector2f::new(0.0, 0.0), Vector2f::new(1.0, 0.0), Vector2f::new(1.0, 1.0)),
        Triangle::new(p0, p2, p3, material_index)
            .with_uvs(Vector2f::new(0.0, 0.0), Vector2f::new(1.0, 1.0), Vector2f::new(0.0, 1.0)),
    ]
}
