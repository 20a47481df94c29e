// Copyright @yucwang 2026

use thiserror::Error;

/// Failures of a render pass as a whole; per-path failures never surface here.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("output buffer has zero pixels")]
    EmptyOutput,
    #[error("film is {film_width}x{film_height} but camera expects {camera_width}x{camera_height}")]
    SceneMismatch {
        film_width: usize,
        film_height: usize,
        camera_width: usize,
        camera_height: usize,
    },
    #[error("{backend} backend unavailable: {reason}")]
    LaneUnavailable {
        backend: &'static str,
        reason: String,
    },
    #[error("invalid scene: {0}")]
    InvalidScene(String),
    #[error("render pass stopped before any sample completed")]
    Cancelled,
    #[error("image I/O failed: {0}")]
    Io(#[from] exr::error::Error),
}
