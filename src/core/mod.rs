// Copyright @yucwang 2021

pub mod bsdf;
pub mod bvh;
pub mod debug;
pub mod emitter;
pub mod error;
pub mod image;
pub mod interaction;
pub mod material;
pub mod medium;
pub mod raytracing;
pub mod sampler;
pub mod scene;
pub mod scene_loader;
