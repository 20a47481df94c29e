// Copyright @yucwang 2026

pub mod area;
pub mod directional;
pub mod environment;
