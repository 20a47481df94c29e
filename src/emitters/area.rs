// Copyright @yucwang 2026

use crate::core::emitter::{Emitter, EmitterFlag, EmitterRadiance, EmitterSample};
use crate::core::sampler::Sampler;
use crate::math::constants::{Float, Vector3f, EPSILON, PI};
use crate::math::spectrum::{RGBSpectrum, SpectralQuery};
use crate::shapes::triangle::Triangle;

/// Emissive triangle radiating from its front face only.
pub struct AreaEmitter {
    triangle: Triangle,
    radiance: RGBSpectrum,
}

impl AreaEmitter {
    pub fn new(triangle: Triangle, radiance: RGBSpectrum) -> Self {
        Self { triangle, radiance }
    }

    pub fn triangle(&self) -> &Triangle {
        &self.triangle
    }

    // Solid-angle density of `pos` seen from `from`, zero behind the emitter.
    fn pdf_dir(&self, from: &Vector3f, pos: &Vector3f) -> Option<(Vector3f, Float)> {
        let offset = pos - from;
        let dist_sqr = offset.norm_squared();
        if dist_sqr <= 0.0 {
            return None;
        }
        let direction = offset / dist_sqr.sqrt();
        let cos_l = -direction.dot(&self.triangle.geometric_normal());
        if cos_l <= EPSILON {
            return None;
        }
        let area = self.triangle.surface_area();
        if area <= 0.0 {
            return None;
        }
        Some((direction, dist_sqr / (area * cos_l)))
    }
}

impl Emitter for AreaEmitter {
    fn get_flag(&self) -> EmitterFlag {
        EmitterFlag::SURFACE
    }

    fn power(&self) -> Float {
        self.radiance.luminance() * self.triangle.surface_area() * PI
    }

    fn sample(&self, spect: &SpectralQuery, smp: &mut dyn Sampler, from: &Vector3f) -> EmitterSample {
        let point = self.triangle.sample(&smp.next_2d());
        match self.pdf_dir(from, &point.pos) {
            Some((direction, pdf_dir)) => EmitterSample {
                value: spect.from_rgb(&self.radiance),
                origin: point.pos,
                direction,
                pdf_area: point.pdf_area,
                pdf_dir,
                pdf_sample: 0.0,
                is_delta: false,
            },
            None => EmitterSample::invalid(spect),
        }
    }

    fn radiance_at(&self, spect: &SpectralQuery, from: &Vector3f, pos: &Vector3f) -> EmitterRadiance {
        match self.pdf_dir(from, pos) {
            Some((_, pdf_dir)) => EmitterRadiance {
                value: spect.from_rgb(&self.radiance),
                pdf_area: 1.0 / self.triangle.surface_area(),
                pdf_dir,
            },
            None => EmitterRadiance::zero(spect),
        }
    }
}
