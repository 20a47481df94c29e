// Copyright @yucwang 2026

use crate::core::bsdf::BSDFData;
use crate::core::emitter::EmitterSample;
use crate::core::raytracing::Raytracing;
use crate::core::sampler::Sampler;
use crate::math::constants::{Float, Vector3f};
use crate::math::ray::Ray3f;
use crate::math::spectrum::{SpectralQuery, SpectralResponse};

/// Upper bound on medium interfaces walked by one path or shadow segment.
pub const MAX_BOUNDARY_CROSSINGS: u32 = 256;

const RR_MAX_SURVIVAL: Float = 0.95;

/// Power heuristic with exponent 2: weight of the strategy with density `a`.
pub fn power_heuristic(a: Float, b: Float) -> Float {
    let a2 = a * a;
    let b2 = b * b;
    if a2 + b2 > 0.0 {
        a2 / (a2 + b2)
    } else {
        0.0
    }
}

/// Weight of an emitter reached by a sampled direction. No competing
/// strategy exists for primary rays or after a delta sample.
pub fn emitter_hit_weight(path_length: u32, mis_delta: bool, mis_pdf: Float, light_pdf: Float) -> Float {
    if path_length == 1 || mis_delta {
        1.0
    } else {
        power_heuristic(mis_pdf, light_pdf)
    }
}

/// Russian roulette. Returns the rescaled throughput of a surviving path.
pub fn apply_rr(throughput: &SpectralResponse, eta: Float, smp: &mut dyn Sampler) -> Option<SpectralResponse> {
    let q = (throughput.monochromatic() * eta * eta).min(RR_MAX_SURVIVAL);
    if q <= 0.0 || smp.next() >= q {
        return None;
    }
    Some(*throughput / q)
}

/// Picks an emitter by power and samples it from `from`.
pub fn sample_emitter(rt: &Raytracing, spect: &SpectralQuery, smp: &mut dyn Sampler, from: &Vector3f)
    -> Option<EmitterSample> {
    let scene = rt.scene();
    let (index, pdf_sample) = scene.sample_emitter_index(smp.next())?;
    let mut sample = scene.emitters()[index].sample(spect, smp, from);
    sample.pdf_sample = pdf_sample;
    if sample.pdf_dir > 0.0 && pdf_sample > 0.0 {
        Some(sample)
    } else {
        None
    }
}

/// Transmittance from `p0` to `p1` starting in `medium`. Boundary surfaces
/// switch the medium; any other surface blocks the segment.
pub fn transmittance(rt: &Raytracing,
                     spect: &SpectralQuery,
                     smp: &mut dyn Sampler,
                     p0: &Vector3f,
                     p1: &Vector3f,
                     medium: Option<usize>) -> SpectralResponse {
    let scene = rt.scene();
    let mut result = spect.constant(1.0);
    let mut medium = medium;
    let mut origin = *p0;

    for _ in 0..MAX_BOUNDARY_CROSSINGS {
        let ray = match Ray3f::segment(origin, *p1) {
            Some(ray) => ray,
            None => return result,
        };
        let hit = match rt.trace(&ray, smp) {
            Some(hit) => hit,
            None => {
                if let Some(m) = scene.medium(medium) {
                    result *= m.transmittance(spect, smp, &origin, p1);
                }
                return result;
            }
        };

        let boundary = match scene.material(hit.material_index).as_boundary() {
            Some(boundary) => boundary,
            None => return spect.zero(),
        };
        if let Some(m) = scene.medium(medium) {
            result *= m.transmittance(spect, smp, &origin, &hit.pos);
        }
        if result.is_zero() {
            return result;
        }
        let data = BSDFData::new(*spect, medium, &hit, ray.dir(), ray.dir());
        medium = boundary.medium_after(&data);
        origin = hit.pos;
    }
    spect.zero()
}
