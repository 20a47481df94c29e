// Copyright @yucwang 2026

use crate::core::emitter::{Emitter, EmitterFlag, EmitterSample};
use crate::core::sampler::Sampler;
use crate::math::aabb::AABB;
use crate::math::constants::{Float, Vector3f, PI};
use crate::math::spectrum::{RGBSpectrum, SpectralQuery};

/// Parallel light travelling along `direction`; can only be reached by NEE.
pub struct DirectionalEmitter {
    direction: Vector3f,
    irradiance: RGBSpectrum,
    bsphere_center: Vector3f,
    bsphere_radius: Float,
}

impl DirectionalEmitter {
    pub fn new(direction: Vector3f, irradiance: RGBSpectrum) -> Self {
        let len = direction.norm();
        let direction = if len > 0.0 { direction / len } else { Vector3f::new(0.0, 0.0, -1.0) };
        Self {
            direction,
            irradiance,
            bsphere_center: Vector3f::zeros(),
            bsphere_radius: 1.0,
        }
    }
}

impl Emitter for DirectionalEmitter {
    fn get_flag(&self) -> EmitterFlag {
        EmitterFlag::DIRECTION | EmitterFlag::DELTA
    }

    fn power(&self) -> Float {
        self.irradiance.luminance() * PI * self.bsphere_radius * self.bsphere_radius
    }

    fn set_scene_bounds(&mut self, bounds: &AABB) {
        if bounds.is_valid() {
            self.bsphere_center = bounds.center();
            self.bsphere_radius = bounds.bounding_radius().max(1e-3);
        }
    }

    fn sample(&self, spect: &SpectralQuery, _smp: &mut dyn Sampler, from: &Vector3f) -> EmitterSample {
        let towards = -self.direction;
        let reach = 2.0 * self.bsphere_radius + (from - self.bsphere_center).norm();
        EmitterSample {
            value: spect.from_rgb(&self.irradiance),
            origin: from + towards * reach,
            direction: towards,
            pdf_area: 1.0 / (PI * self.bsphere_radius * self.bsphere_radius),
            pdf_dir: 1.0,
            pdf_sample: 0.0,
            is_delta: true,
        }
    }
}
