// Copyright @yucwang 2026

use crate::core::medium::{Medium, MediumSample};
use crate::core::sampler::Sampler;
use crate::math::constants::{Float, Vector3f, INV_4PI, PI};
use crate::math::frame::Frame;
use crate::math::ray::Ray3f;
use crate::math::spectrum::{RGBSpectrum, SpectralQuery, SpectralResponse, SPECTRAL_SAMPLES};

/// Constant-density medium with a Henyey-Greenstein phase function.
pub struct HomogeneousMedium {
    sigma_t: RGBSpectrum,
    albedo: RGBSpectrum,
    anisotropy: Float,
    scale: Float,
}

impl HomogeneousMedium {
    pub fn new(sigma_t: RGBSpectrum, albedo: RGBSpectrum) -> Self {
        Self {
            sigma_t,
            albedo: clamp_spectrum(albedo),
            anisotropy: 0.0,
            scale: 1.0,
        }
    }

    pub fn with_scale(mut self, scale: Float) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_anisotropy(mut self, g: Float) -> Self {
        self.anisotropy = g.max(-0.99).min(0.99);
        self
    }

    fn sigma_t(&self, spect: &SpectralQuery) -> SpectralResponse {
        spect.from_rgb(&(self.sigma_t * self.scale))
    }

    fn sigma_s(&self, spect: &SpectralQuery) -> SpectralResponse {
        spect.from_rgb(&(self.sigma_t * self.albedo * self.scale))
    }
}

fn clamp_spectrum(value: RGBSpectrum) -> RGBSpectrum {
    RGBSpectrum::new(
        value[0].clamp(0.0, 1.0),
        value[1].clamp(0.0, 1.0),
        value[2].clamp(0.0, 1.0),
    )
}

// exp(-sigma * t) that stays finite for sigma == 0 and t == inf.
fn beer_lambert(sigma_t: &SpectralResponse, t: Float) -> SpectralResponse {
    sigma_t.map(|s| if s <= 0.0 { 1.0 } else { (-s * t).exp() })
}

pub fn henyey_greenstein(g: Float, cos_theta: Float) -> Float {
    let denom = 1.0 + g * g - 2.0 * g * cos_theta;
    INV_4PI * (1.0 - g * g) / (denom * denom.max(0.0).sqrt())
}

impl Medium for HomogeneousMedium {
    fn sample(&self, spect: &SpectralQuery, smp: &mut dyn Sampler, ray: &Ray3f, max_t: Float) -> MediumSample {
        let sigma_t = self.sigma_t(spect);

        // Pick one wavelength to drive the free-flight distance.
        let channel = ((smp.next() * SPECTRAL_SAMPLES as Float) as usize).min(SPECTRAL_SAMPLES - 1);
        let sigma_c = sigma_t.component(channel);
        let distance = if sigma_c > 0.0 {
            -(1.0 - smp.next()).ln() / sigma_c
        } else {
            Float::INFINITY
        };

        let scattered = distance < max_t;
        let t = if scattered { distance } else { max_t };
        let tr = beer_lambert(&sigma_t, t);

        // Single-sample MIS over the wavelengths' distance densities.
        let weight = if scattered {
            let density = (sigma_t * tr).monochromatic();
            if density > 0.0 {
                tr * self.sigma_s(spect) / spect.constant(density)
            } else {
                spect.zero()
            }
        } else {
            let density = tr.monochromatic();
            if density > 0.0 {
                tr / spect.constant(density)
            } else {
                spect.zero()
            }
        };

        MediumSample {
            pos: if t.is_finite() { ray.at(t) } else { ray.origin() },
            w_i: ray.dir(),
            t,
            weight,
            scattered,
        }
    }

    fn transmittance(&self, spect: &SpectralQuery, _smp: &mut dyn Sampler, p0: &Vector3f, p1: &Vector3f) -> SpectralResponse {
        beer_lambert(&self.sigma_t(spect), (p1 - p0).norm())
    }

    fn phase_function(&self, _spect: &SpectralQuery, _pos: &Vector3f, w_i: &Vector3f, w_o: &Vector3f) -> Float {
        henyey_greenstein(self.anisotropy, w_i.dot(w_o))
    }

    fn sample_phase_function(&self, _spect: &SpectralQuery, smp: &mut dyn Sampler, _pos: &Vector3f, w_i: &Vector3f) -> Vector3f {
        let g = self.anisotropy;
        let u = smp.next_2d();
        let cos_theta = if g.abs() < 1e-3 {
            1.0 - 2.0 * u.x
        } else {
            let sqr = (1.0 - g * g) / (1.0 - g + 2.0 * g * u.x);
            (1.0 + g * g - sqr * sqr) / (2.0 * g)
        };
        let cos_theta = cos_theta.max(-1.0).min(1.0);
        let sin_theta = (1.0 - cos_theta * cos_theta).max(0.0).sqrt();
        let phi = 2.0 * PI * u.y;

        let frame = Frame::from_normal(*w_i);
        frame.from_local(&Vector3f::new(sin_theta * phi.cos(), sin_theta * phi.sin(), cos_theta)).normalize()
    }
}
