// Copyright @yucwang 2023

use crate::core::image::{Image, ImageOptions};
use crate::core::interaction::Intersection;
use crate::core::sampler::Sampler;
use crate::math::constants::{ Float, Vector2f, Vector3f, DELTA_ALPHA_THRESHOLD, EPSILON };
use crate::math::frame::Frame;
use crate::math::spectrum::{ RGBSpectrum, SpectralQuery, SpectralResponse };

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BSDFProperties(u8);

impl BSDFProperties {
    pub const NONE: Self = Self(0);
    pub const DIFFUSE: Self = Self(1 << 0);
    pub const DELTA_REFLECTION: Self = Self(1 << 1);
    pub const DELTA_TRANSMISSION: Self = Self(1 << 2);
    pub const MEDIUM_CHANGED: Self = Self(1 << 3);

    pub fn contains(self, other: Self) -> bool {
        (self.0 & other.0) != 0
    }
}

impl std::ops::BitOr for BSDFProperties {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        Self(self.0 | rhs.0)
    }
}

impl std::ops::BitOrAssign for BSDFProperties {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

/// Inputs of one BSDF query. `w_i` points towards the surface, `w_o` away from it.
#[derive(Debug, Clone, Copy)]
pub struct BSDFData<'a> {
    pub spectrum_sample: SpectralQuery,
    pub medium_index: Option<usize>,
    pub intersection: &'a Intersection,
    pub w_i: Vector3f,
    pub w_o: Vector3f,
}

impl<'a> BSDFData<'a> {
    pub fn new(spectrum_sample: SpectralQuery,
               medium_index: Option<usize>,
               intersection: &'a Intersection,
               w_i: Vector3f,
               w_o: Vector3f) -> Self {
        Self { spectrum_sample, medium_index, intersection, w_i, w_o }
    }

    pub fn with_w_o(&self, w_o: Vector3f) -> Self {
        Self { w_o, ..*self }
    }

    pub fn tex(&self) -> Vector2f {
        self.intersection.tex
    }

    /// Shading frame facing the incoming ray, or `None` at grazing incidence.
    pub fn check_side(&self) -> Option<Frame> {
        let frame = self.intersection.facing_frame(&self.w_i);
        if -frame.nrm().dot(&self.w_i) <= EPSILON {
            None
        } else {
            Some(frame)
        }
    }

    pub fn zero(&self) -> SpectralResponse {
        self.spectrum_sample.zero()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BSDFEval {
    /// f
    pub func: SpectralResponse,
    /// f * cos(theta_o)
    pub bsdf: SpectralResponse,
    /// bsdf / pdf
    pub weight: SpectralResponse,
    pub pdf: Float,
}

impl BSDFEval {
    pub fn zero(spect: &SpectralQuery) -> Self {
        Self { func: spect.zero(), bsdf: spect.zero(), weight: spect.zero(), pdf: 0.0 }
    }

    pub fn valid(&self) -> bool {
        self.pdf > 0.0 && !self.bsdf.is_zero()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BSDFSample {
    pub w_o: Vector3f,
    pub weight: SpectralResponse,
    pub pdf: Float,
    /// Relative index of refraction crossed by the sample (1 for reflection).
    pub eta: Float,
    pub medium_index: Option<usize>,
    pub properties: BSDFProperties,
}

impl BSDFSample {
    pub fn invalid(spect: &SpectralQuery) -> Self {
        Self {
            w_o: Vector3f::zeros(),
            weight: spect.zero(),
            pdf: 0.0,
            eta: 1.0,
            medium_index: None,
            properties: BSDFProperties::NONE,
        }
    }

    pub fn from_eval(w_o: Vector3f, eval: &BSDFEval, properties: BSDFProperties) -> Self {
        Self {
            w_o,
            weight: eval.weight,
            pdf: eval.pdf,
            eta: 1.0,
            medium_index: None,
            properties,
        }
    }

    pub fn valid(&self) -> bool {
        self.pdf > 0.0
    }

    pub fn is_delta(&self) -> bool {
        self.properties.contains(BSDFProperties::DELTA_REFLECTION)
            || self.properties.contains(BSDFProperties::DELTA_TRANSMISSION)
    }
}

/// Four-operation contract every material class implements.
pub trait BSDF: Send + Sync {
    fn sample(&self, data: &BSDFData, images: &[Image], smp: &mut dyn Sampler) -> BSDFSample;
    fn evaluate(&self, data: &BSDFData, images: &[Image]) -> BSDFEval;
    fn pdf(&self, data: &BSDFData, images: &[Image]) -> Float;
    fn continue_tracing(&self, tex: &Vector2f, images: &[Image], smp: &mut dyn Sampler) -> bool;
}

/// Mean roughness small enough to treat the lobe as a delta distribution.
pub fn is_delta_roughness(roughness: &Vector2f) -> bool {
    roughness.dot(&Vector2f::new(0.5, 0.5)) <= DELTA_ALPHA_THRESHOLD
}

/// Modulates an RGB parameter by an optional image and lifts it to the path's wavelengths.
pub fn apply_image(spect: &SpectralQuery,
                   value: &RGBSpectrum,
                   image_index: Option<usize>,
                   tex: &Vector2f,
                   images: &[Image]) -> SpectralResponse {
    let rgb = match image_index.and_then(|i| images.get(i)) {
        Some(image) => {
            let texel = image.evaluate(tex);
            *value * RGBSpectrum::new(texel.x, texel.y, texel.z)
        }
        None => *value,
    };
    spect.from_rgb(&rgb)
}

/// Stochastic alpha test: true when the ray should pass through unaffected.
pub fn alpha_continue_tracing(image_index: Option<usize>,
                              tex: &Vector2f,
                              images: &[Image],
                              smp: &mut dyn Sampler) -> bool {
    let image = match image_index.and_then(|i| images.get(i)) {
        Some(image) => image,
        None => return false,
    };
    image.options().contains(ImageOptions::HAS_ALPHA_CHANNEL) && image.evaluate(tex).w < smp.next()
}
