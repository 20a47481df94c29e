// Copyright @yucwang 2026

use crate::core::sampler::Sampler;
use crate::math::aabb::AABB;
use crate::math::constants::{Float, Vector3f};
use crate::math::spectrum::{SpectralQuery, SpectralResponse};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmitterFlag(u8);

impl EmitterFlag {
    pub const NONE: Self = Self(0);
    pub const DIRECTION: Self = Self(1 << 0);
    pub const SURFACE: Self = Self(1 << 1);
    pub const DELTA: Self = Self(1 << 2);

    pub fn contains(self, other: Self) -> bool {
        (self.0 & other.0) != 0
    }
}

impl std::ops::BitOr for EmitterFlag {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        Self(self.0 | rhs.0)
    }
}

impl std::ops::BitOrAssign for EmitterFlag {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

/// Light sample seen from a shading point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EmitterSample {
    pub value: SpectralResponse,
    /// Point on (or far beyond, for distant lights) the emitter.
    pub origin: Vector3f,
    /// Unit direction from the shading point towards `origin`.
    pub direction: Vector3f,
    pub pdf_area: Float,
    /// Solid-angle density at the shading point.
    pub pdf_dir: Float,
    /// Discrete probability of having chosen this emitter.
    pub pdf_sample: Float,
    pub is_delta: bool,
}

impl EmitterSample {
    pub fn invalid(spect: &SpectralQuery) -> Self {
        Self {
            value: spect.zero(),
            origin: Vector3f::zeros(),
            direction: Vector3f::zeros(),
            pdf_area: 0.0,
            pdf_dir: 0.0,
            pdf_sample: 0.0,
            is_delta: false,
        }
    }
}

/// Radiance leaving an emitter towards a point, with the densities the
/// emitter sampler would have assigned to that configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EmitterRadiance {
    pub value: SpectralResponse,
    pub pdf_area: Float,
    pub pdf_dir: Float,
}

impl EmitterRadiance {
    pub fn zero(spect: &SpectralQuery) -> Self {
        Self { value: spect.zero(), pdf_area: 0.0, pdf_dir: 0.0 }
    }
}

pub trait Emitter: Send + Sync {
    fn get_flag(&self) -> EmitterFlag;

    /// Relative weight for emitter selection.
    fn power(&self) -> Float;

    fn set_scene_bounds(&mut self, _bounds: &AABB) {}

    fn sample(&self, spect: &SpectralQuery, smp: &mut dyn Sampler, from: &Vector3f) -> EmitterSample;

    /// Radiance arriving at `from` from the point `pos` on this emitter.
    fn radiance_at(&self, spect: &SpectralQuery, _from: &Vector3f, _pos: &Vector3f) -> EmitterRadiance {
        EmitterRadiance::zero(spect)
    }

    /// Radiance arriving along an unoccluded ray travelling in `direction`.
    fn radiance_along(&self, spect: &SpectralQuery, _direction: &Vector3f) -> EmitterRadiance {
        EmitterRadiance::zero(spect)
    }

    fn is_delta(&self) -> bool {
        self.get_flag().contains(EmitterFlag::DELTA)
    }

    /// Distant, non-delta lights reached by rays leaving the scene.
    fn is_environment(&self) -> bool {
        self.get_flag().contains(EmitterFlag::DIRECTION) && !self.is_delta()
    }
}
