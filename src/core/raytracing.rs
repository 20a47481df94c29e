// Copyright @yucwang 2026

use crate::core::bsdf::BSDF;
use crate::core::bvh::BVH;
use crate::core::interaction::Intersection;
use crate::core::sampler::Sampler;
use crate::core::scene::Scene;
use crate::math::constants::RAY_EPSILON;
use crate::math::ray::Ray3f;
use crate::shapes::triangle::Triangle;

/// Upper bound on alpha-masked surfaces skipped by one `trace` call.
pub const MAX_ALPHA_SKIPS: usize = 64;

/// Nearest-hit query over a triangle soup; deterministic for fixed inputs.
pub trait IntersectionOracle: Send + Sync {
    fn intersect(&self, triangles: &[Triangle], ray: &Ray3f) -> Option<Intersection>;
}

impl IntersectionOracle for BVH {
    fn intersect(&self, triangles: &[Triangle], ray: &Ray3f) -> Option<Intersection> {
        self.ray_intersection(triangles, ray)
    }
}

/// Tests every triangle. Reference oracle for scenes without a BVH.
pub struct BruteForce;

impl IntersectionOracle for BruteForce {
    fn intersect(&self, triangles: &[Triangle], ray: &Ray3f) -> Option<Intersection> {
        let mut ray = *ray;
        let mut closest = None;
        for (i, tri) in triangles.iter().enumerate() {
            if let Some((t, b)) = tri.ray_intersection_t(&ray) {
                ray.max_t = t;
                closest = Some((i, t, b));
            }
        }
        closest.map(|(i, t, b)| triangles[i].intersection_at(t, &b, i))
    }
}

/// Scene view handed to the integrator.
#[derive(Clone, Copy)]
pub struct Raytracing<'a> {
    scene: &'a Scene,
    oracle: &'a dyn IntersectionOracle,
}

impl<'a> Raytracing<'a> {
    /// Uses the scene's BVH, or brute force when the scene was not finalized.
    pub fn new(scene: &'a Scene) -> Self {
        match scene.bvh() {
            Some(bvh) => Self { scene, oracle: bvh },
            None => Self { scene, oracle: &BruteForce },
        }
    }

    pub fn with_oracle(scene: &'a Scene, oracle: &'a dyn IntersectionOracle) -> Self {
        Self { scene, oracle }
    }

    pub fn scene(&self) -> &'a Scene {
        self.scene
    }

    /// Closest hit that is not discarded by its material's alpha mask.
    pub fn trace(&self, ray: &Ray3f, smp: &mut dyn Sampler) -> Option<Intersection> {
        let mut ray = *ray;
        for _ in 0..MAX_ALPHA_SKIPS {
            let hit = self.oracle.intersect(self.scene.triangles(), &ray)?;
            let material = self.scene.material(hit.material_index);
            if !material.continue_tracing(&hit.tex, self.scene.images(), smp) {
                return Some(hit);
            }
            ray.min_t = hit.t + RAY_EPSILON;
            if ray.min_t >= ray.max_t {
                return None;
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::image::Image;
    use crate::core::material::Material;
    use crate::core::sampler::LcgRng;
    use crate::materials::lambertian_diffuse::LambertianDiffuseBSDF;
    use crate::math::constants::{Vector3f, Vector4f};
    use crate::math::spectrum::RGBSpectrum;
    use crate::sensors::perspective::PerspectiveCamera;

    fn layered_scene(alpha: f32) -> Scene {
        let camera = PerspectiveCamera::new(Vector3f::new(0.0, 0.0, 5.0), Vector3f::zeros(),
                                            Vector3f::new(0.0, 1.0, 0.0), 0.5, 1, 1);
        let mut scene = Scene::new(camera);
        let mask = scene.add_image(Image::constant(Vector4f::new(1.0, 1.0, 1.0, alpha)));
        let masked = scene.add_material(Material::Diffuse(LambertianDiffuseBSDF::new(RGBSpectrum::splat(0.5), Some(mask))));
        let solid = scene.add_material(Material::Diffuse(LambertianDiffuseBSDF::new(RGBSpectrum::splat(0.5), None)));
        scene.add_triangle(Triangle::new(Vector3f::new(-1.0, -1.0, 1.0), Vector3f::new(1.0, -1.0, 1.0),
                                         Vector3f::new(0.0, 1.0, 1.0), masked));
        scene.add_triangle(Triangle::new(Vector3f::new(-1.0, -1.0, 0.0), Vector3f::new(1.0, -1.0, 0.0),
                                         Vector3f::new(0.0, 1.0, 0.0), solid));
        scene
    }

    #[test]
    fn test_bvh_and_brute_force_agree() {
        let mut scene = layered_scene(1.0);
        scene.finalize().unwrap();
        let ray = Ray3f::new(Vector3f::new(0.0, 0.0, 5.0), Vector3f::new(0.0, 0.0, -1.0), None, None);
        let a = Raytracing::new(&scene).trace(&ray, &mut LcgRng::new(1)).unwrap();
        let b = Raytracing::with_oracle(&scene, &BruteForce).trace(&ray, &mut LcgRng::new(1)).unwrap();
        assert_eq!(a.triangle_index, 0);
        assert_eq!(a, b);
    }

    #[test]
    fn test_fully_transparent_surface_is_skipped() {
        let mut scene = layered_scene(0.0);
        scene.finalize().unwrap();
        let rt = Raytracing::new(&scene);
        let ray = Ray3f::new(Vector3f::new(0.0, 0.0, 5.0), Vector3f::new(0.0, 0.0, -1.0), None, None);
        let mut rng = LcgRng::new(9);
        for _ in 0..16 {
            let hit = rt.trace(&ray, &mut rng).unwrap();
            assert_eq!(hit.triangle_index, 1);
            assert!((hit.t - 5.0).abs() < 1e-4);
        }
    }
}
