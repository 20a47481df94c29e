// Copyright @yucwang 2026

use crate::core::bsdf::{BSDFData, BSDFProperties, BSDF};
use crate::core::interaction::Intersection;
use crate::core::medium::MediumSample;
use crate::core::raytracing::Raytracing;
use crate::core::sampler::{LcgRng, Sampler};
use crate::integrators::common::{apply_rr, emitter_hit_weight, power_heuristic, sample_emitter,
                                 transmittance, MAX_BOUNDARY_CROSSINGS};
use crate::integrators::payload::{PathPayload, PathState};
use crate::math::constants::{Float, Vector3f};
use crate::math::ray::Ray3f;
use crate::math::spectrum::SpectralQuery;
use crate::validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PTOptions {
    /// Samples per pixel.
    pub iterations: u32,
    /// Bounce cap; zero leaves only directly visible emitters.
    pub max_depth: u32,
    /// Path length at which Russian roulette starts.
    pub rr_start: u32,
}

impl Default for PTOptions {
    fn default() -> Self {
        Self { iterations: 1, max_depth: 2, rr_start: 65536 }
    }
}

impl PTOptions {
    pub fn max_path_length(&self) -> u32 {
        self.max_depth.saturating_add(1)
    }
}

enum HitOutcome {
    Scattered,
    CrossedBoundary,
    Terminated,
}

/// Unidirectional spectral path tracer with NEE and MIS. Both render
/// backends drive it through `init_payload` and `step`.
pub struct PathIntegrator {
    options: PTOptions,
}

impl PathIntegrator {
    pub fn new(options: PTOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &PTOptions {
        &self.options
    }

    pub fn init_payload(&self, rt: &Raytracing, pixel_index: usize, iteration: u32, seed: u64) -> PathPayload {
        let scene = rt.scene();
        let mut payload = PathPayload::new(pixel_index, iteration, LcgRng::for_path(seed, pixel_index, iteration));
        let spect = SpectralQuery::sample(payload.sampler.next());
        let jitter = payload.sampler.next_2d();

        payload.uv = scene.camera().film_uv(pixel_index, &jitter);
        payload.ray = scene.camera().generate_ray(&payload.uv);
        payload.spect = spect;
        payload.throughput = spect.constant(1.0);
        payload.accumulated = spect.zero();
        payload.medium = scene.camera_medium();
        payload.path_length = 1;
        payload.eta = 1.0;
        payload.mis_origin = payload.ray.origin();
        payload.state = PathState::Running;
        payload
    }

    /// Advances a running path by one segment.
    pub fn step(&self, rt: &Raytracing, mut payload: PathPayload) -> PathPayload {
        if !payload.is_running() {
            return payload;
        }

        let hit = rt.trace(&payload.ray, &mut payload.sampler);
        let max_t = hit.as_ref().map_or(Float::INFINITY, |h| h.t);

        if let Some(medium_sample) = self.try_sampling_medium(rt, &mut payload, max_t) {
            if medium_sample.sampled_medium() {
                self.evaluate_sampled_medium(rt, &mut payload, &medium_sample);
                return payload;
            }
        }
        if payload.throughput.is_zero() {
            payload.state = PathState::Stopped;
            return payload;
        }

        match hit {
            Some(hit) => match self.handle_hit_ray(rt, &mut payload, &hit) {
                HitOutcome::Scattered => self.apply_roulette(&mut payload),
                HitOutcome::CrossedBoundary => {
                    payload.boundary_crossings += 1;
                    if payload.boundary_crossings > MAX_BOUNDARY_CROSSINGS {
                        payload.state = PathState::Stopped;
                    }
                }
                HitOutcome::Terminated => payload.state = PathState::Stopped,
            },
            None => self.handle_missed_ray(rt, &mut payload),
        }
        payload
    }

    /// Runs a path from initialization to termination.
    pub fn run(&self, rt: &Raytracing, pixel_index: usize, iteration: u32, seed: u64) -> PathPayload {
        let mut payload = self.init_payload(rt, pixel_index, iteration, seed);
        while payload.is_running() {
            payload = self.step(rt, payload);
        }
        payload
    }

    fn try_sampling_medium(&self, rt: &Raytracing, payload: &mut PathPayload, max_t: Float) -> Option<MediumSample> {
        let medium = rt.scene().medium(payload.medium)?;
        let sample = medium.sample(&payload.spect, &mut payload.sampler, &payload.ray, max_t);
        validate!(sample.weight);
        payload.throughput *= sample.weight;
        Some(sample)
    }

    fn evaluate_sampled_medium(&self, rt: &Raytracing, payload: &mut PathPayload, sample: &MediumSample) {
        let medium = match rt.scene().medium(payload.medium) {
            Some(medium) => medium,
            None => {
                payload.state = PathState::Stopped;
                return;
            }
        };
        // Both NEE and phase sampling add a segment.
        if payload.throughput.is_zero() || payload.path_length >= self.options.max_path_length() {
            payload.state = PathState::Stopped;
            return;
        }

        let spect = payload.spect;
        if let Some(light) = sample_emitter(rt, &spect, &mut payload.sampler, &sample.pos) {
            let phase = medium.phase_function(&spect, &sample.pos, &sample.w_i, &light.direction);
            if phase > 0.0 {
                let tr = transmittance(rt, &spect, &mut payload.sampler, &sample.pos, &light.origin, payload.medium);
                let light_pdf = light.pdf_dir * light.pdf_sample;
                let mis = if light.is_delta { 1.0 } else { power_heuristic(light_pdf, phase) };
                let contribution = payload.throughput * light.value * tr * (phase * mis / light_pdf);
                payload.add_radiance(contribution);
            }
        }

        let w_o = medium.sample_phase_function(&spect, &mut payload.sampler, &sample.pos, &sample.w_i);
        payload.mis_pdf = medium.phase_function(&spect, &sample.pos, &sample.w_i, &w_o);
        payload.mis_delta = false;
        payload.mis_origin = sample.pos;
        payload.ray = Ray3f::new(sample.pos, w_o, None, None);
        payload.path_length += 1;
        self.apply_roulette(payload);
    }

    fn handle_hit_ray(&self, rt: &Raytracing, payload: &mut PathPayload, hit: &Intersection) -> HitOutcome {
        let scene = rt.scene();
        let material = scene.material(hit.material_index);
        let spect = payload.spect;
        let w_i = payload.ray.dir();

        if let Some(boundary) = material.as_boundary() {
            let data = BSDFData::new(spect, payload.medium, hit, w_i, w_i);
            payload.medium = boundary.medium_after(&data);
            payload.ray = Ray3f::spawn(hit.shading_pos(&w_i), w_i);
            return HitOutcome::CrossedBoundary;
        }

        if let Some(emitter_index) = hit.emitter_index {
            let emitter = &scene.emitters()[emitter_index];
            let radiance = emitter.radiance_at(&spect, &payload.mis_origin, &hit.pos);
            if !radiance.value.is_zero() {
                let light_pdf = radiance.pdf_dir * scene.emitter_discrete_pdf(emitter_index);
                let weight = emitter_hit_weight(payload.path_length, payload.mis_delta, payload.mis_pdf, light_pdf);
                payload.add_radiance(payload.throughput * radiance.value * weight);
            }
        }

        // NEE needs room for one more segment, and so does BSDF sampling.
        if payload.path_length >= self.options.max_path_length() {
            return HitOutcome::Terminated;
        }

        let data = BSDFData::new(spect, payload.medium, hit, w_i, Vector3f::zeros());
        if let Some(light) = sample_emitter(rt, &spect, &mut payload.sampler, &hit.pos) {
            let eval = material.evaluate(&data.with_w_o(light.direction), scene.images());
            if !eval.bsdf.is_zero() {
                let tr = transmittance(rt, &spect, &mut payload.sampler,
                                       &hit.shading_pos(&light.direction), &light.origin, payload.medium);
                if !tr.is_zero() {
                    let light_pdf = light.pdf_dir * light.pdf_sample;
                    let mis = if light.is_delta { 1.0 } else { power_heuristic(light_pdf, eval.pdf) };
                    let contribution = payload.throughput * eval.bsdf * light.value * tr * (mis / light_pdf);
                    payload.add_radiance(contribution);
                }
            }
        }

        let bsdf_sample = material.sample(&data, scene.images(), &mut payload.sampler);
        if !bsdf_sample.valid() {
            return HitOutcome::Terminated;
        }
        validate!(bsdf_sample.weight);
        payload.throughput *= bsdf_sample.weight;
        if payload.throughput.is_zero() {
            return HitOutcome::Terminated;
        }
        if bsdf_sample.properties.contains(BSDFProperties::MEDIUM_CHANGED) {
            payload.medium = bsdf_sample.medium_index;
        }
        payload.eta *= bsdf_sample.eta;
        payload.mis_pdf = bsdf_sample.pdf;
        payload.mis_delta = bsdf_sample.is_delta();
        payload.mis_origin = hit.pos;
        payload.ray = Ray3f::spawn(hit.shading_pos(&bsdf_sample.w_o), bsdf_sample.w_o);
        payload.path_length += 1;
        HitOutcome::Scattered
    }

    fn handle_missed_ray(&self, rt: &Raytracing, payload: &mut PathPayload) {
        let scene = rt.scene();
        let direction = payload.ray.dir();
        for &index in scene.environment_emitters() {
            let radiance = scene.emitters()[index].radiance_along(&payload.spect, &direction);
            if radiance.value.is_zero() || radiance.pdf_dir <= 0.0 {
                continue;
            }
            let light_pdf = radiance.pdf_dir * scene.emitter_discrete_pdf(index);
            let weight = emitter_hit_weight(payload.path_length, payload.mis_delta, payload.mis_pdf, light_pdf);
            payload.add_radiance(payload.throughput * radiance.value * weight);
        }
        payload.state = PathState::Finished;
    }

    fn apply_roulette(&self, payload: &mut PathPayload) {
        if payload.path_length < self.options.rr_start {
            return;
        }
        match apply_rr(&payload.throughput, payload.eta, &mut payload.sampler) {
            Some(throughput) => payload.throughput = throughput,
            None => payload.state = PathState::Stopped,
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::core::material::Material;
    use crate::core::scene::Scene;
    use crate::emitters::environment::EnvironmentEmitter;
    use crate::integrators::common::transmittance;
    use crate::materials::boundary::BoundaryBSDF;
    use crate::materials::conductor::ConductorBSDF;
    use crate::materials::dielectric::DielectricBSDF;
    use crate::materials::lambertian_diffuse::LambertianDiffuseBSDF;
    use crate::media::homogeneous_medium::HomogeneousMedium;
    use crate::math::constants::Vector2f;
    use crate::math::spectrum::RGBSpectrum;
    use crate::sensors::perspective::PerspectiveCamera;
    use crate::shapes::cube::cuboid;
    use crate::shapes::triangle::{quad, Triangle};

    fn assert_close(a: Float, b: Float, eps: Float) {
        assert!((a - b).abs() < eps, "expected {} ≈ {}", a, b);
    }

    /// Diffuse floor (albedo 0.5) lit by a unit square light of radiance 4
    /// one unit above it, seen straight down from between the two.
    pub fn direct_lighting_scene() -> Scene {
        let camera = PerspectiveCamera::new(Vector3f::new(0.0, 0.0, 0.5), Vector3f::zeros(),
                                            Vector3f::new(0.0, 1.0, 0.0), 1e-3, 1, 1);
        let mut scene = Scene::new(camera);
        let floor = scene.add_material(Material::Diffuse(LambertianDiffuseBSDF::new(RGBSpectrum::splat(0.5), None)));
        let black = scene.add_material(Material::Diffuse(LambertianDiffuseBSDF::new(RGBSpectrum::splat(0.0), None)));
        scene.add_triangle(Triangle::new(Vector3f::new(-10.0, -10.0, 0.0), Vector3f::new(10.0, -10.0, 0.0),
                                         Vector3f::new(0.0, 10.0, 0.0), floor));
        for tri in quad(Vector3f::new(-0.5, -0.5, 1.0), Vector3f::new(-0.5, 0.5, 1.0),
                        Vector3f::new(0.5, 0.5, 1.0), Vector3f::new(0.5, -0.5, 1.0), black).iter() {
            scene.add_emissive_triangle(tri.clone(), RGBSpectrum::splat(4.0));
        }
        scene
    }

    fn mean_radiance(integrator: &PathIntegrator, rt: &Raytracing, iterations: u32) -> Vector3f {
        let mut sum = Vector3f::zeros();
        for it in 0..iterations {
            sum += integrator.run(rt, 0, it, 7).radiance();
        }
        sum / iterations as Float
    }

    #[test]
    fn test_single_bounce_matches_analytic_irradiance() {
        let mut scene = direct_lighting_scene();
        scene.finalize().unwrap();
        let rt = Raytracing::new(&scene);
        let integrator = PathIntegrator::new(PTOptions { iterations: 10000, max_depth: 1, rr_start: 65536 });

        // Form factor of a parallel square centered above the point.
        let x: Float = 0.5;
        let s = (1.0 + x * x).sqrt();
        let form_factor = 4.0 * (2.0 * x / s * (x / s).atan()) / (2.0 * std::f32::consts::PI);
        let expected = 0.5 * 4.0 * form_factor;

        let mean = mean_radiance(&integrator, &rt, integrator.options().iterations);
        let grey = (mean.x + mean.y + mean.z) / 3.0;
        assert_close(grey, expected, 0.02 * expected);
    }

    #[test]
    fn test_max_depth_zero_skips_next_event_estimation() {
        let mut scene = direct_lighting_scene();
        scene.finalize().unwrap();
        let rt = Raytracing::new(&scene);
        let integrator = PathIntegrator::new(PTOptions { max_depth: 0, ..PTOptions::default() });
        for it in 0..64 {
            let payload = integrator.run(&rt, 0, it, 1);
            assert_eq!(payload.state, PathState::Stopped);
            assert!(payload.accumulated.is_zero());
        }

        let lit = PathIntegrator::new(PTOptions { max_depth: 1, ..PTOptions::default() });
        assert!(mean_radiance(&lit, &rt, 16).x > 0.0);
    }

    #[test]
    fn test_unused_media_leave_results_bit_identical() {
        let mut plain = direct_lighting_scene();
        plain.finalize().unwrap();
        let mut with_media = direct_lighting_scene();
        with_media.add_medium(Box::new(HomogeneousMedium::new(RGBSpectrum::splat(2.0), RGBSpectrum::splat(0.5))));
        with_media.finalize().unwrap();

        let integrator = PathIntegrator::new(PTOptions { max_depth: 3, rr_start: 2, ..PTOptions::default() });
        let rt_a = Raytracing::new(&plain);
        let rt_b = Raytracing::new(&with_media);
        for it in 0..64 {
            let a = integrator.run(&rt_a, 0, it, 11);
            let b = integrator.run(&rt_b, 0, it, 11);
            assert_eq!(a.accumulated, b.accumulated);
            assert_eq!(a.path_length, b.path_length);
        }
    }

    fn environment_scene(camera_medium: Option<HomogeneousMedium>) -> Scene {
        let camera = PerspectiveCamera::new(Vector3f::zeros(), Vector3f::new(0.0, 0.0, 1.0),
                                            Vector3f::new(0.0, 1.0, 0.0), 1e-3, 1, 1);
        let mut scene = Scene::new(camera);
        scene.add_emitter(Box::new(EnvironmentEmitter::new(RGBSpectrum::splat(0.8))));
        if let Some(medium) = camera_medium {
            let index = scene.add_medium(Box::new(medium));
            scene.set_camera_medium(Some(index));
        }
        scene
    }

    #[test]
    fn test_non_scattering_medium_matches_vacuum() {
        let mut vacuum = environment_scene(None);
        vacuum.finalize().unwrap();
        let mut clear = environment_scene(Some(HomogeneousMedium::new(RGBSpectrum::splat(0.0), RGBSpectrum::splat(0.5))));
        clear.finalize().unwrap();

        let integrator = PathIntegrator::new(PTOptions::default());
        for it in 0..16 {
            let a = integrator.run(&Raytracing::new(&vacuum), 0, it, 5);
            let b = integrator.run(&Raytracing::new(&clear), 0, it, 5);
            assert_eq!(a.state, PathState::Finished);
            assert_eq!(b.state, PathState::Finished);
            let (ra, rb) = (a.radiance(), b.radiance());
            for c in 0..3 {
                assert_close(ra[c], rb[c], 1e-6);
            }
        }
    }

    /// Absorbing slab between z = 1 and z = 2 bounded by two boundary quads.
    fn slab_scene(sigma_t: Float) -> Scene {
        let mut scene = environment_scene(None);
        let medium = scene.add_medium(Box::new(HomogeneousMedium::new(RGBSpectrum::splat(sigma_t), RGBSpectrum::splat(0.0))));
        let interface = scene.add_material(Material::Boundary(BoundaryBSDF::new(Some(medium), None)));
        let bottom = quad(Vector3f::new(-2.0, -2.0, 1.0), Vector3f::new(-2.0, 2.0, 1.0),
                          Vector3f::new(2.0, 2.0, 1.0), Vector3f::new(2.0, -2.0, 1.0), interface);
        let top = quad(Vector3f::new(-2.0, -2.0, 2.0), Vector3f::new(2.0, -2.0, 2.0),
                       Vector3f::new(2.0, 2.0, 2.0), Vector3f::new(-2.0, 2.0, 2.0), interface);
        for tri in bottom.iter().chain(top.iter()) {
            scene.add_triangle(tri.clone());
        }
        scene
    }

    #[test]
    fn test_transmittance_crosses_boundaries() {
        let mut scene = slab_scene(0.7);
        scene.finalize().unwrap();
        let rt = Raytracing::new(&scene);
        let spect = SpectralQuery::sample(0.25);
        let mut rng = LcgRng::new(2);
        let tr = transmittance(&rt, &spect, &mut rng, &Vector3f::new(0.1, 0.2, 0.0),
                               &Vector3f::new(0.1, 0.2, 3.0), None);
        for i in 0..crate::math::spectrum::SPECTRAL_SAMPLES {
            assert_close(tr.component(i), (-0.7 as Float).exp(), 1e-4);
        }
    }

    #[test]
    fn test_absorbing_slab_attenuates_environment() {
        let mut scene = slab_scene(0.7);
        scene.finalize().unwrap();
        let rt = Raytracing::new(&scene);
        let integrator = PathIntegrator::new(PTOptions::default());
        let count = 20000;
        let mean = mean_radiance(&integrator, &rt, count);
        let grey = (mean.x + mean.y + mean.z) / 3.0;
        assert_close(grey, 0.8 * (-0.7 as Float).exp(), 0.02);
    }

    #[test]
    fn test_step_advances_until_terminal_state() {
        let mut scene = environment_scene(None);
        scene.finalize().unwrap();
        let rt = Raytracing::new(&scene);
        let integrator = PathIntegrator::new(PTOptions::default());
        let payload = integrator.init_payload(&rt, 0, 0, 3);
        assert_eq!(payload.state, PathState::Running);
        assert_eq!(payload.path_length, 1);
        assert!((payload.throughput.monochromatic() - 1.0).abs() < 1e-6);
        let payload = integrator.step(&rt, payload);
        assert_eq!(payload.state, PathState::Finished);
        let again = integrator.step(&rt, payload);
        assert_eq!(again.state, PathState::Finished);
    }

    #[test]
    fn test_medium_scatter_updates_payload() {
        let dense = HomogeneousMedium::new(RGBSpectrum::splat(50.0), RGBSpectrum::splat(1.0)).with_anisotropy(0.4);
        let mut scene = environment_scene(Some(dense));
        scene.finalize().unwrap();
        let rt = Raytracing::new(&scene);
        let integrator = PathIntegrator::new(PTOptions::default());

        for it in 0..16 {
            let payload = integrator.init_payload(&rt, 0, it, 9);
            let payload = integrator.step(&rt, payload);
            // Nothing to hit, so the free flight always ends in the medium.
            assert_eq!(payload.state, PathState::Running);
            assert_eq!(payload.path_length, 2);
            assert!(!payload.mis_delta);
            assert!(payload.mis_pdf > 0.0);
            assert_eq!(payload.ray.origin(), payload.mis_origin);
            assert_close(payload.throughput.monochromatic(), 1.0, 1e-4);
        }
    }

    #[test]
    fn test_conservative_slab_preserves_uniform_environment() {
        let mut scene = environment_scene(None);
        let medium = scene.add_medium(Box::new(
            HomogeneousMedium::new(RGBSpectrum::splat(1.5), RGBSpectrum::splat(1.0)).with_anisotropy(0.4)));
        let interface = scene.add_material(Material::Boundary(BoundaryBSDF::new(Some(medium), None)));
        for tri in cuboid(Vector3f::new(-50.0, -50.0, 1.0), Vector3f::new(50.0, 50.0, 2.0), interface) {
            scene.add_triangle(tri);
        }
        scene.finalize().unwrap();
        let rt = Raytracing::new(&scene);
        let integrator = PathIntegrator::new(PTOptions { iterations: 20000, max_depth: 200, rr_start: 8 });

        let mean = mean_radiance(&integrator, &rt, integrator.options().iterations);
        let grey = (mean.x + mean.y + mean.z) / 3.0;
        assert_close(grey, 0.8, 0.02);
    }

    #[test]
    fn test_glass_transmission_adopts_interior_medium() {
        let mut scene = environment_scene(None);
        let interior = scene.add_medium(Box::new(HomogeneousMedium::new(RGBSpectrum::splat(0.5), RGBSpectrum::splat(0.5))));
        let glass = scene.add_material(Material::Dielectric(
            DielectricBSDF::new(Vector2f::zeros(), 1.5, 1.0).with_media(Some(interior), None)));
        for tri in quad(Vector3f::new(-2.0, -2.0, 1.0), Vector3f::new(-2.0, 2.0, 1.0),
                        Vector3f::new(2.0, 2.0, 1.0), Vector3f::new(2.0, -2.0, 1.0), glass).iter() {
            scene.add_triangle(tri.clone());
        }
        scene.finalize().unwrap();
        let rt = Raytracing::new(&scene);
        let integrator = PathIntegrator::new(PTOptions::default());

        let mut transmitted = 0;
        for it in 0..64 {
            let payload = integrator.step(&rt, integrator.init_payload(&rt, 0, it, 13));
            assert_eq!(payload.state, PathState::Running);
            assert!(payload.mis_delta);
            if payload.ray.dir().z > 0.0 {
                transmitted += 1;
                assert_eq!(payload.medium, Some(interior));
                assert_close(payload.eta, 1.5, 1e-5);
            } else {
                assert_eq!(payload.medium, None);
            }
        }
        assert!(transmitted > 48);
    }

    #[test]
    fn test_mirror_reflection_sees_light_without_mis_loss() {
        let camera = PerspectiveCamera::new(Vector3f::new(0.0, 0.0, 0.5), Vector3f::zeros(),
                                            Vector3f::new(0.0, 1.0, 0.0), 1e-3, 1, 1);
        let mut scene = Scene::new(camera);
        let mirror = scene.add_material(Material::Conductor(ConductorBSDF::new(Vector2f::zeros(), RGBSpectrum::splat(0.8))));
        let black = scene.add_material(Material::Diffuse(LambertianDiffuseBSDF::new(RGBSpectrum::splat(0.0), None)));
        for tri in quad(Vector3f::new(-10.0, -10.0, 0.0), Vector3f::new(10.0, -10.0, 0.0),
                        Vector3f::new(10.0, 10.0, 0.0), Vector3f::new(-10.0, 10.0, 0.0), mirror).iter() {
            scene.add_triangle(tri.clone());
        }
        for tri in quad(Vector3f::new(-0.5, -0.5, 1.0), Vector3f::new(-0.5, 0.5, 1.0),
                        Vector3f::new(0.5, 0.5, 1.0), Vector3f::new(0.5, -0.5, 1.0), black).iter() {
            scene.add_emissive_triangle(tri.clone(), RGBSpectrum::splat(4.0));
        }
        scene.finalize().unwrap();
        let rt = Raytracing::new(&scene);
        let integrator = PathIntegrator::new(PTOptions { max_depth: 1, ..PTOptions::default() });

        for it in 0..16 {
            let bounced = integrator.step(&rt, integrator.init_payload(&rt, 0, it, 21));
            assert!(bounced.mis_delta);
            assert!(bounced.accumulated.is_zero());

            let payload = integrator.run(&rt, 0, it, 21);
            assert_eq!(payload.state, PathState::Stopped);
            assert_close(payload.accumulated.monochromatic(), 0.8 * 4.0, 1e-4);
        }
    }
}
