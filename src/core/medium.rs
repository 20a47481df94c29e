// Copyright @yucwang 2026

use crate::core::sampler::Sampler;
use crate::math::constants::{Float, Vector3f};
use crate::math::ray::Ray3f;
use crate::math::spectrum::{SpectralQuery, SpectralResponse};

/// Outcome of distance sampling along one ray segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MediumSample {
    pub pos: Vector3f,
    /// Propagation direction at `pos`.
    pub w_i: Vector3f,
    pub t: Float,
    /// Estimator weight, applied to throughput whether or not an event was sampled.
    pub weight: SpectralResponse,
    pub scattered: bool,
}

impl MediumSample {
    pub fn sampled_medium(&self) -> bool {
        self.scattered
    }
}

pub trait Medium: Send + Sync {
    /// Samples a scattering distance in `[ray.min_t, max_t)`; `max_t` may be infinite.
    fn sample(&self, spect: &SpectralQuery, smp: &mut dyn Sampler, ray: &Ray3f, max_t: Float) -> MediumSample;

    fn transmittance(&self, spect: &SpectralQuery, smp: &mut dyn Sampler, p0: &Vector3f, p1: &Vector3f) -> SpectralResponse;

    /// Phase function value; `w_i` is the incoming propagation direction.
    fn phase_function(&self, spect: &SpectralQuery, pos: &Vector3f, w_i: &Vector3f, w_o: &Vector3f) -> Float;

    fn sample_phase_function(&self, spect: &SpectralQuery, smp: &mut dyn Sampler, pos: &Vector3f, w_i: &Vector3f) -> Vector3f;
}
