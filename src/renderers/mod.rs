// Copyright @yucwang 2026

pub mod cpu;
pub mod film;
pub mod renderer;
pub mod wavefront;
