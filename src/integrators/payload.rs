// Copyright @yucwang 2026

use crate::core::sampler::LcgRng;
use crate::math::constants::{Float, Vector2f, Vector3f};
use crate::math::ray::Ray3f;
use crate::math::spectrum::{SpectralQuery, SpectralResponse};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathState {
    Uninitialized,
    Running,
    /// Terminated by a failed sample, roulette or the depth cap.
    Stopped,
    /// Left the scene after miss handling.
    Finished,
}

/// Mutable state of one camera path. Owned by exactly one path for its lifetime.
pub struct PathPayload {
    pub state: PathState,
    pub ray: Ray3f,
    pub throughput: SpectralResponse,
    pub accumulated: SpectralResponse,
    pub spect: SpectralQuery,
    pub medium: Option<usize>,
    /// Number of path segments so far; 1 for the primary ray.
    pub path_length: u32,
    pub boundary_crossings: u32,
    /// Product of the relative IORs crossed, used by Russian roulette.
    pub eta: Float,
    /// Density of the last directional sample, consumed by emitter-hit MIS.
    pub mis_pdf: Float,
    pub mis_delta: bool,
    /// Vertex the last directional sample was taken from.
    pub mis_origin: Vector3f,
    pub pixel_index: usize,
    pub uv: Vector2f,
    pub iteration: u32,
    pub sampler: LcgRng,
}

impl PathPayload {
    pub fn new(pixel_index: usize, iteration: u32, sampler: LcgRng) -> Self {
        let spect = SpectralQuery::default();
        Self {
            state: PathState::Uninitialized,
            ray: Ray3f::default(),
            throughput: spect.zero(),
            accumulated: spect.zero(),
            spect,
            medium: None,
            path_length: 0,
            boundary_crossings: 0,
            eta: 1.0,
            mis_pdf: 0.0,
            mis_delta: false,
            mis_origin: Vector3f::zeros(),
            pixel_index,
            uv: Vector2f::zeros(),
            iteration,
            sampler,
        }
    }

    pub fn is_running(&self) -> bool {
        self.state == PathState::Running
    }

    pub fn add_radiance(&mut self, value: SpectralResponse) {
        crate::validate!(value);
        if value.is_valid() {
            self.accumulated += value;
        }
    }

    /// RGB estimate of the accumulated radiance.
    pub fn radiance(&self) -> Vector3f {
        self.accumulated.to_rgb()
    }
}
