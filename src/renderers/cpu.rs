// Copyright @yucwang 2021

use crate::core::error::RenderError;
use crate::core::raytracing::Raytracing;
use crate::core::scene::Scene;
use crate::integrators::path::PathIntegrator;
use crate::math::constants::Vector3f;
use crate::renderers::film::Film;
use crate::renderers::renderer::{check_targets, finish_pass, RenderSettings, RenderStats, Renderer};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;
use std::thread;

/// Square pixel blocks pulled from a shared counter by worker threads.
/// Each block runs every iteration of its pixels before being committed.
pub struct CpuRenderer {
    settings: RenderSettings,
}

struct Block {
    x0: usize,
    y0: usize,
    x1: usize,
    y1: usize,
}

impl CpuRenderer {
    pub fn new(settings: RenderSettings) -> Self {
        Self { settings }
    }

    fn block(&self, index: usize, blocks_x: usize, width: usize, height: usize) -> Block {
        let size = self.settings.block_size;
        let x0 = (index % blocks_x) * size;
        let y0 = (index / blocks_x) * size;
        Block { x0, y0, x1: (x0 + size).min(width), y1: (y0 + size).min(height) }
    }
}

impl Renderer for CpuRenderer {
    fn name(&self) -> &'static str {
        "cpu"
    }

    fn render(&self, scene: &Scene, integrator: &PathIntegrator, film: &mut Film) -> Result<RenderStats, RenderError> {
        check_targets(scene, film)?;
        if self.settings.block_size == 0 {
            return Err(RenderError::LaneUnavailable {
                backend: self.name(),
                reason: String::from("block size is zero"),
            });
        }

        let (width, height) = (film.width(), film.height());
        let iterations = integrator.options().iterations.max(1);
        let block_size = self.settings.block_size;
        let blocks_x = (width + block_size - 1) / block_size;
        let blocks_y = (height + block_size - 1) / block_size;
        let total_blocks = blocks_x * blocks_y;
        let seed = self.settings.seed;
        let rt = Raytracing::new(scene);
        let progress = self.settings.progress_bar(total_blocks as u64, "blocks");
        log::info!("CPU render: {}x{}, {} spp, {} threads", width, height, iterations, self.settings.thread_count());

        let next_block = AtomicUsize::new(0);
        let (tx, rx) = mpsc::channel::<(Block, Vec<Vec<Vector3f>>)>();
        let mut stats = RenderStats::default();

        thread::scope(|scope| {
            for _ in 0..self.settings.thread_count() {
                let next_block = &next_block;
                let tx = tx.clone();
                scope.spawn(move || {
                    loop {
                        if self.settings.is_stopped() {
                            break;
                        }
                        let block_index = next_block.fetch_add(1, Ordering::Relaxed);
                        if block_index >= total_blocks {
                            break;
                        }

                        let block = self.block(block_index, blocks_x, width, height);
                        let mut samples = Vec::with_capacity((block.x1 - block.x0) * (block.y1 - block.y0));
                        for y in block.y0..block.y1 {
                            for x in block.x0..block.x1 {
                                let pixel_index = x + width * y;
                                samples.push((0..iterations)
                                    .map(|iteration| integrator.run(&rt, pixel_index, iteration, seed).radiance())
                                    .collect::<Vec<Vector3f>>());
                            }
                        }
                        if tx.send((block, samples)).is_err() {
                            break;
                        }
                    }
                });
            }

            drop(tx);
            for (block, samples) in rx.iter() {
                // One commit per iteration, in iteration order.
                let mut it = samples.iter();
                for y in block.y0..block.y1 {
                    for x in block.x0..block.x1 {
                        if let Some(pixel_samples) = it.next() {
                            for rgb in pixel_samples.iter() {
                                film.commit(x + width * y, rgb);
                            }
                        }
                    }
                }
                stats.paths += ((block.x1 - block.x0) * (block.y1 - block.y0)) as u64 * iterations as u64;
                progress.inc(1);
            }
        });
        progress.finish_and_clear();

        stats.cancelled = stats.paths < (width * height) as u64 * iterations as u64;
        finish_pass(self.name(), stats)
    }
}
