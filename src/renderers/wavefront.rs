// Copyright @yucwang 2026

use crate::core::error::RenderError;
use crate::core::raytracing::Raytracing;
use crate::core::scene::Scene;
use crate::integrators::path::PathIntegrator;
use crate::integrators::payload::PathPayload;
use crate::math::constants::Vector3f;
use crate::renderers::film::Film;
use crate::renderers::renderer::{check_targets, finish_pass, RenderSettings, RenderStats, Renderer};
use std::ops::Range;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;
use std::thread;

/// Lane-parallel dispatch: a batch of payloads is advanced one segment per
/// kernel step, and retired lanes are compacted out after every step.
pub struct WavefrontRenderer {
    settings: RenderSettings,
}

impl WavefrontRenderer {
    pub fn new(settings: RenderSettings) -> Self {
        Self { settings }
    }

    // None when the pass was stopped; abandoned lanes commit nothing.
    fn run_batch(&self, rt: &Raytracing, integrator: &PathIntegrator, iteration: u32, pixels: Range<usize>)
        -> Option<Vec<(usize, Vector3f)>> {
        let mut active: Vec<PathPayload> = pixels
            .map(|pixel| integrator.init_payload(rt, pixel, iteration, self.settings.seed))
            .collect();
        let mut retired = Vec::with_capacity(active.len());

        while !active.is_empty() {
            if self.settings.is_stopped() {
                return None;
            }
            let stepped: Vec<PathPayload> = active.into_iter().map(|p| integrator.step(rt, p)).collect();
            active = Vec::with_capacity(stepped.len());
            for payload in stepped {
                if payload.is_running() {
                    active.push(payload);
                } else {
                    retired.push((payload.pixel_index, payload.radiance()));
                }
            }
        }
        Some(retired)
    }
}

impl Renderer for WavefrontRenderer {
    fn name(&self) -> &'static str {
        "wavefront"
    }

    fn render(&self, scene: &Scene, integrator: &PathIntegrator, film: &mut Film) -> Result<RenderStats, RenderError> {
        check_targets(scene, film)?;
        let lanes = self.settings.lanes;
        if lanes == 0 {
            return Err(RenderError::LaneUnavailable {
                backend: self.name(),
                reason: String::from("lane count is zero"),
            });
        }

        let pixel_count = film.pixel_count();
        let iterations = integrator.options().iterations.max(1);
        let batches = (pixel_count + lanes - 1) / lanes;
        let rt = Raytracing::new(scene);
        let progress = self.settings.progress_bar((batches as u64) * iterations as u64, "batches");
        log::info!("Wavefront render: {} pixels, {} spp, {} lanes per batch", pixel_count, iterations, lanes);

        let mut stats = RenderStats::default();
        for iteration in 0..iterations {
            if self.settings.is_stopped() {
                break;
            }
            let next_batch = AtomicUsize::new(0);
            let (tx, rx) = mpsc::channel::<Vec<(usize, Vector3f)>>();
            thread::scope(|scope| {
                for _ in 0..self.settings.thread_count() {
                    let next_batch = &next_batch;
                    let tx = tx.clone();
                    scope.spawn(move || {
                        loop {
                            let batch = next_batch.fetch_add(1, Ordering::Relaxed);
                            if batch >= batches {
                                break;
                            }
                            let pixels = batch * lanes..((batch + 1) * lanes).min(pixel_count);
                            match self.run_batch(&rt, integrator, iteration, pixels) {
                                Some(results) => {
                                    if tx.send(results).is_err() {
                                        break;
                                    }
                                }
                                None => break,
                            }
                        }
                    });
                }

                drop(tx);
                for results in rx.iter() {
                    stats.paths += results.len() as u64;
                    for (pixel_index, rgb) in results.iter() {
                        film.commit(*pixel_index, rgb);
                    }
                    progress.inc(1);
                }
            });
        }
        progress.finish_and_clear();

        stats.cancelled = stats.paths < (pixel_count as u64) * iterations as u64;
        finish_pass(self.name(), stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::integrators::path::tests::direct_lighting_scene;
    use crate::integrators::path::PTOptions;
    use crate::renderers::cpu::CpuRenderer;
    use crate::sensors::perspective::PerspectiveCamera;
    use std::sync::atomic::AtomicBool;
    use std::sync::Arc;

    fn quiet_settings() -> RenderSettings {
        RenderSettings { seed: 42, threads: 3, block_size: 3, lanes: 5, show_progress: false, ..RenderSettings::default() }
    }

    fn wide_scene() -> Scene {
        let mut scene = direct_lighting_scene();
        let camera = PerspectiveCamera::new(Vector3f::new(0.0, -2.0, 2.5), Vector3f::zeros(),
                                            Vector3f::new(0.0, 0.0, 1.0), 1.0, 7, 5);
        scene = scene.with_camera(camera);
        scene.finalize().unwrap();
        scene
    }

    #[test]
    fn test_backends_produce_identical_films() {
        let scene = wide_scene();
        let integrator = PathIntegrator::new(PTOptions { iterations: 4, max_depth: 3, rr_start: 2 });

        let mut cpu_film = Film::new(7, 5);
        let cpu = CpuRenderer::new(quiet_settings()).render(&scene, &integrator, &mut cpu_film).unwrap();
        let mut wave_film = Film::new(7, 5);
        let wave = WavefrontRenderer::new(RenderSettings { threads: 2, ..quiet_settings() })
            .render(&scene, &integrator, &mut wave_film).unwrap();

        assert_eq!(cpu.paths, 7 * 5 * 4);
        assert_eq!(wave.paths, cpu.paths);
        assert!(!cpu.cancelled && !wave.cancelled);
        for i in 0..cpu_film.pixel_count() {
            assert_eq!(cpu_film.pixel(i), wave_film.pixel(i));
        }
        assert!(cpu_film.resolve().mean().x > 0.0);
    }

    #[test]
    fn test_progressive_passes_stay_identical_across_backends() {
        let scene = wide_scene();
        let first = PathIntegrator::new(PTOptions { iterations: 3, max_depth: 3, rr_start: 2 });
        let second = PathIntegrator::new(PTOptions { iterations: 5, max_depth: 3, rr_start: 2 });
        let cpu = CpuRenderer::new(quiet_settings());
        let wave = WavefrontRenderer::new(quiet_settings());

        let mut cpu_film = Film::new(7, 5);
        let mut wave_film = Film::new(7, 5);
        // Same first pass on both films, then a second pass into non-empty films.
        cpu.render(&scene, &first, &mut cpu_film).unwrap();
        cpu.render(&scene, &first, &mut wave_film).unwrap();
        cpu.render(&scene, &second, &mut cpu_film).unwrap();
        wave.render(&scene, &second, &mut wave_film).unwrap();

        for i in 0..cpu_film.pixel_count() {
            assert_eq!(cpu_film.pixel(i).w, 8.0);
            assert_eq!(cpu_film.pixel(i), wave_film.pixel(i));
        }
    }

    #[test]
    fn test_dispatch_failures_are_reported() {
        let scene = wide_scene();
        let integrator = PathIntegrator::new(PTOptions::default());

        let mut empty = Film::new(0, 0);
        assert!(matches!(CpuRenderer::new(quiet_settings()).render(&scene, &integrator, &mut empty),
                         Err(RenderError::EmptyOutput)));

        let mut wrong = Film::new(3, 3);
        assert!(matches!(WavefrontRenderer::new(quiet_settings()).render(&scene, &integrator, &mut wrong),
                         Err(RenderError::SceneMismatch { .. })));

        let mut film = Film::new(7, 5);
        let no_lanes = WavefrontRenderer::new(RenderSettings { lanes: 0, ..quiet_settings() });
        assert!(matches!(no_lanes.render(&scene, &integrator, &mut film), Err(RenderError::LaneUnavailable { .. })));
    }

    #[test]
    fn test_cancelled_pass_commits_nothing() {
        let scene = wide_scene();
        let integrator = PathIntegrator::new(PTOptions::default());
        let stop = Arc::new(AtomicBool::new(true));
        let settings = RenderSettings { stop, ..quiet_settings() };

        let mut film = Film::new(7, 5);
        assert!(matches!(WavefrontRenderer::new(settings.clone()).render(&scene, &integrator, &mut film),
                         Err(RenderError::Cancelled)));
        assert!(matches!(CpuRenderer::new(settings).render(&scene, &integrator, &mut film),
                         Err(RenderError::Cancelled)));
        assert_eq!(film.pixel(0).w, 0.0);
    }
}
