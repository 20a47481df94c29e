// Copyright @yucwang 2026

use crate::core::emitter::{Emitter, EmitterFlag, EmitterRadiance, EmitterSample};
use crate::core::sampler::Sampler;
use crate::math::aabb::AABB;
use crate::math::constants::{Float, Vector3f, PI};
use crate::math::spectrum::{RGBSpectrum, SpectralQuery};
use crate::math::warp::{sample_uniform_sphere, sample_uniform_sphere_pdf};

/// Constant radiance arriving from every direction outside the scene.
pub struct EnvironmentEmitter {
    radiance: RGBSpectrum,
    bsphere_center: Vector3f,
    bsphere_radius: Float,
}

impl EnvironmentEmitter {
    pub fn new(radiance: RGBSpectrum) -> Self {
        Self {
            radiance,
            bsphere_center: Vector3f::zeros(),
            bsphere_radius: 1.0,
        }
    }

    fn pdf_area(&self) -> Float {
        1.0 / (PI * self.bsphere_radius * self.bsphere_radius)
    }
}

impl Emitter for EnvironmentEmitter {
    fn get_flag(&self) -> EmitterFlag {
        EmitterFlag::DIRECTION
    }

    fn power(&self) -> Float {
        let r = self.bsphere_radius;
        self.radiance.luminance() * PI * 4.0 * PI * r * r
    }

    fn set_scene_bounds(&mut self, bounds: &AABB) {
        if bounds.is_valid() {
            self.bsphere_center = bounds.center();
            self.bsphere_radius = bounds.bounding_radius().max(1e-3);
        }
    }

    fn sample(&self, spect: &SpectralQuery, smp: &mut dyn Sampler, from: &Vector3f) -> EmitterSample {
        let direction = sample_uniform_sphere(&smp.next_2d());
        let reach = 2.0 * self.bsphere_radius + (from - self.bsphere_center).norm();
        EmitterSample {
            value: spect.from_rgb(&self.radiance),
            origin: from + direction * reach,
            direction,
            pdf_area: self.pdf_area(),
            pdf_dir: sample_uniform_sphere_pdf(),
            pdf_sample: 0.0,
            is_delta: false,
        }
    }

    fn radiance_along(&self, spect: &SpectralQuery, _direction: &Vector3f) -> EmitterRadiance {
        EmitterRadiance {
            value: spect.from_rgb(&self.radiance),
            pdf_area: self.pdf_area(),
            pdf_dir: sample_uniform_sphere_pdf(),
        }
    }
}
