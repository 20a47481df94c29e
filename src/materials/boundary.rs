// Copyright @yucwang 2026

use crate::core::bsdf::{BSDFData, BSDFEval, BSDFProperties, BSDFSample, BSDF};
use crate::core::image::Image;
use crate::core::sampler::Sampler;
use crate::math::constants::{Float, Vector2f};

/// Interface between two media. Rays pass straight through; only the medium changes.
pub struct BoundaryBSDF {
    int_medium: Option<usize>,
    ext_medium: Option<usize>,
}

impl BoundaryBSDF {
    pub fn new(int_medium: Option<usize>, ext_medium: Option<usize>) -> Self {
        Self { int_medium, ext_medium }
    }

    pub fn media(&self) -> [Option<usize>; 2] {
        [self.int_medium, self.ext_medium]
    }

    /// Medium on the far side of the surface for a ray travelling along `data.w_i`.
    pub fn medium_after(&self, data: &BSDFData) -> Option<usize> {
        if data.intersection.is_entering(&data.w_i) {
            self.int_medium
        } else {
            self.ext_medium
        }
    }
}

impl BSDF for BoundaryBSDF {
    fn sample(&self, data: &BSDFData, _images: &[Image], _smp: &mut dyn Sampler) -> BSDFSample {
        BSDFSample {
            w_o: data.w_i,
            weight: data.spectrum_sample.constant(1.0),
            pdf: 1.0,
            eta: 1.0,
            medium_index: self.medium_after(data),
            properties: BSDFProperties::DELTA_TRANSMISSION | BSDFProperties::MEDIUM_CHANGED,
        }
    }

    fn evaluate(&self, data: &BSDFData, _images: &[Image]) -> BSDFEval {
        BSDFEval::zero(&data.spectrum_sample)
    }

    fn pdf(&self, _data: &BSDFData, _images: &[Image]) -> Float {
        0.0
    }

    fn continue_tracing(&self, _tex: &Vector2f, _images: &[Image], _smp: &mut dyn Sampler) -> bool {
        false
    }
}
