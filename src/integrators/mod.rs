// Copyright @yucwang 2026

pub mod common;
pub mod path;
pub mod payload;
