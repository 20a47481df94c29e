// Copyright @yucwang 2026

use crate::core::interaction::Intersection;
use crate::math::aabb::AABB;
use crate::math::constants::{Float, Vector2f, Vector3f};
use crate::math::ray::Ray3f;
use crate::shapes::triangle::Triangle;

const SAH_BUCKETS: usize = 12;
const MAX_LEAF_SIZE: usize = 4;

#[derive(Debug, Clone)]
enum BVHNode {
    Leaf { bounds: AABB, start: usize, count: usize },
    Interior { bounds: AABB, left: usize, right: usize, axis: usize },
}

impl BVHNode {
    fn bounds(&self) -> &AABB {
        match self {
            BVHNode::Leaf { bounds, .. } => bounds,
            BVHNode::Interior { bounds, .. } => bounds,
        }
    }
}

/// SAH bounding volume hierarchy over a triangle soup. Stores triangle
/// indices only; the triangles are passed back in at query time.
pub struct BVH {
    nodes: Vec<BVHNode>,
    indices: Vec<usize>,
}

struct BuildPrimitive {
    bounds: AABB,
    centroid: Vector3f,
}

impl BVH {
    pub fn build(triangles: &[Triangle]) -> Self {
        let prims: Vec<BuildPrimitive> = triangles
            .iter()
            .map(|tri| BuildPrimitive { bounds: tri.bounding_box(), centroid: tri.centroid() })
            .collect();
        let mut bvh = Self { nodes: Vec::new(), indices: (0..prims.len()).collect() };
        if !prims.is_empty() {
            bvh.build_recursive(&prims, 0, prims.len());
        }
        log::debug!("BVH built: {} triangles, {} nodes", prims.len(), bvh.nodes.len());
        bvh
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Closest hit along `ray`. Returns the triangle index, distance and (b1, b2).
    pub fn closest_hit(&self, triangles: &[Triangle], ray: &Ray3f) -> Option<(usize, Float, Vector2f)> {
        if self.nodes.is_empty() {
            return None;
        }

        let mut ray = *ray;
        let mut closest = None;
        let mut stack = vec![0usize];
        while let Some(node_idx) = stack.pop() {
            let node = &self.nodes[node_idx];
            if !node.bounds().ray_intersect(&ray) {
                continue;
            }
            match *node {
                BVHNode::Leaf { start, count, .. } => {
                    for &prim_idx in &self.indices[start..start + count] {
                        if let Some((t, b)) = triangles[prim_idx].ray_intersection_t(&ray) {
                            ray.max_t = t;
                            closest = Some((prim_idx, t, b));
                        }
                    }
                }
                BVHNode::Interior { left, right, axis, .. } => {
                    // Visit the near child first.
                    if ray.dir()[axis] < 0.0 {
                        stack.push(left);
                        stack.push(right);
                    } else {
                        stack.push(right);
                        stack.push(left);
                    }
                }
            }
        }
        closest
    }

    pub fn ray_intersection(&self, triangles: &[Triangle], ray: &Ray3f) -> Option<Intersection> {
        self.closest_hit(triangles, ray)
            .map(|(idx, t, b)| triangles[idx].intersection_at(t, &b, idx))
    }

    fn build_recursive(&mut self, prims: &[BuildPrimitive], start: usize, end: usize) -> usize {
        let mut bounds = AABB::default();
        let mut centroid_bounds = AABB::default();
        for &idx in &self.indices[start..end] {
            bounds.expand_by_aabb(&prims[idx].bounds);
            centroid_bounds.expand_by_point(&prims[idx].centroid);
        }

        let count = end - start;
        let node_idx = self.nodes.len();
        self.nodes.push(BVHNode::Leaf { bounds, start, count });
        if count <= MAX_LEAF_SIZE {
            return node_idx;
        }

        let axis = centroid_bounds.max_extent();
        if centroid_bounds.diagonal()[axis] < 1e-6 {
            return node_idx;
        }
        let bucket_of = |c: &Vector3f| -> usize {
            ((centroid_bounds.offset(c)[axis] * SAH_BUCKETS as Float) as usize).min(SAH_BUCKETS - 1)
        };

        let mut buckets = [(0usize, AABB::default()); SAH_BUCKETS];
        for &idx in &self.indices[start..end] {
            let bucket = &mut buckets[bucket_of(&prims[idx].centroid)];
            bucket.0 += 1;
            bucket.1.expand_by_aabb(&prims[idx].bounds);
        }

        let area = bounds.surface_area().max(1e-6);
        let side_cost = |range: &[(usize, AABB)]| -> Float {
            let mut b = AABB::default();
            let mut n = 0usize;
            for (c, bnd) in range {
                n += c;
                b.expand_by_aabb(bnd);
            }
            if n > 0 { n as Float * b.surface_area() } else { 0.0 }
        };
        let (split, cost) = (0..SAH_BUCKETS - 1)
            .map(|i| (i, 1.0 + (side_cost(&buckets[..=i]) + side_cost(&buckets[i + 1..])) / area))
            .fold((0, Float::INFINITY), |best, cur| if cur.1 < best.1 { cur } else { best });

        if cost >= count as Float {
            return node_idx;
        }

        let mut mid = start;
        for i in start..end {
            if bucket_of(&prims[self.indices[i]].centroid) <= split {
                self.indices.swap(i, mid);
                mid += 1;
            }
        }
        if mid == start || mid == end {
            return node_idx;
        }

        let left = self.build_recursive(prims, start, mid);
        let right = self.build_recursive(prims, mid, end);
        self.nodes[node_idx] = BVHNode::Interior { bounds, left, right, axis };
        node_idx
    }
}

#[cfg(test)]
mod tests {
    use super::BVH;
    use crate::math::constants::{Float, Vector3f};
    use crate::math::ray::Ray3f;
    use crate::shapes::triangle::Triangle;

    fn build_triangles() -> Vec<Triangle> {
        let mut tris = Vec::new();
        for i in 0..32 {
            let x = (i % 8) as Float * 2.0;
            let z = -((i / 8) as Float);
            let p0 = Vector3f::new(x, 0.0, z);
            let p1 = Vector3f::new(x + 0.5, 0.0, z);
            let p2 = Vector3f::new(x, 0.5, z);
            tris.push(Triangle::new(p0, p1, p2, i));
        }
        tris
    }

    fn naive_closest(triangles: &[Triangle], ray: &Ray3f) -> Option<(usize, Float)> {
        let mut best: Option<(usize, Float)> = None;
        for (i, tri) in triangles.iter().enumerate() {
            if let Some((t, _)) = tri.ray_intersection_t(ray) {
                if best.map_or(true, |(_, cur)| t < cur) {
                    best = Some((i, t));
                }
            }
        }
        best
    }

    #[test]
    fn test_bvh_vs_naive_triangles() {
        let triangles = build_triangles();
        let bvh = BVH::build(&triangles);
        assert!(bvh.node_count() > 1);

        for i in 0..8 {
            let origin = Vector3f::new(i as Float * 2.0 + 0.1, 0.1, 1.0);
            for dir in [Vector3f::new(0.0, 0.0, -1.0), Vector3f::new(0.01, 0.0, -1.0)].iter() {
                let ray = Ray3f::new(origin, *dir, None, None);
                let (idx, t, _) = bvh.closest_hit(&triangles, &ray).expect("BVH miss");
                let (naive_idx, naive_t) = naive_closest(&triangles, &ray).expect("naive miss");
                assert_eq!(idx, naive_idx);
                assert!((t - naive_t).abs() < 1e-5);
            }
        }

        let hit = bvh.ray_intersection(&triangles,
            &Ray3f::new(Vector3f::new(4.1, 0.1, -1.5), Vector3f::new(0.0, 0.0, -1.0), None, None)).unwrap();
        assert_eq!(hit.material_index, 18);
        assert!((hit.t - 0.5).abs() < 1e-5);

        let miss_ray = Ray3f::new(Vector3f::new(100.0, 100.0, 1.0), Vector3f::new(0.0, 0.0, -1.0), None, None);
        assert!(bvh.closest_hit(&triangles, &miss_ray).is_none());
        assert!(BVH::build(&[]).closest_hit(&[], &miss_ray).is_none());
    }
}
