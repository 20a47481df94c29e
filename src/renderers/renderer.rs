// Copyright @yucwang 2021

use crate::core::error::RenderError;
use crate::core::scene::Scene;
use crate::integrators::path::PathIntegrator;
use crate::renderers::film::Film;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Dispatch settings shared by the backends.
#[derive(Debug, Clone)]
pub struct RenderSettings {
    pub seed: u64,
    /// Worker threads; zero means one per available core.
    pub threads: usize,
    /// Edge length of a CPU block in pixels.
    pub block_size: usize,
    /// Payloads advanced together by the wavefront backend.
    pub lanes: usize,
    pub show_progress: bool,
    pub stop: Arc<AtomicBool>,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            seed: 0,
            threads: 0,
            block_size: 32,
            lanes: 4096,
            show_progress: true,
            stop: Arc::new(AtomicBool::new(false)),
        }
    }
}

impl RenderSettings {
    pub fn thread_count(&self) -> usize {
        if self.threads > 0 {
            self.threads
        } else {
            std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1)
        }
    }

    pub fn is_stopped(&self) -> bool {
        self.stop.load(Ordering::Relaxed)
    }

    pub(crate) fn progress_bar(&self, len: u64, unit: &str) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }
        let progress = ProgressBar::new(len);
        let template = format!("[{{elapsed_precise}}] {{bar:40.cyan/blue}} {{pos}}/{{len}} {}", unit);
        progress.set_style(
            ProgressStyle::with_template(&template).unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        progress
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RenderStats {
    pub paths: u64,
    pub cancelled: bool,
}

pub trait Renderer {
    fn name(&self) -> &'static str;

    /// Adds `integrator.options().iterations` samples per pixel to `film`.
    fn render(&self, scene: &Scene, integrator: &PathIntegrator, film: &mut Film) -> Result<RenderStats, RenderError>;
}

/// Checks shared by every backend before dispatch.
pub(crate) fn check_targets(scene: &Scene, film: &Film) -> Result<(), RenderError> {
    if film.pixel_count() == 0 {
        return Err(RenderError::EmptyOutput);
    }
    let camera = scene.camera();
    if camera.width() != film.width() || camera.height() != film.height() {
        return Err(RenderError::SceneMismatch {
            film_width: film.width(),
            film_height: film.height(),
            camera_width: camera.width(),
            camera_height: camera.height(),
        });
    }
    Ok(())
}

/// Maps the outcome of a pass to the caller-facing result.
pub(crate) fn finish_pass(backend: &str, stats: RenderStats) -> Result<RenderStats, RenderError> {
    if stats.cancelled && stats.paths == 0 {
        return Err(RenderError::Cancelled);
    }
    if stats.cancelled {
        log::warn!("{} render cancelled after {} paths", backend, stats.paths);
    } else {
        log::debug!("{} render traced {} paths", backend, stats.paths);
    }
    Ok(stats)
}
