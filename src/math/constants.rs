/* Copyright 2020 @Yuchen Wong */

use nalgebra as na;

pub type Float = f32;

pub type Vector2f = na::Vector2<Float>;
pub type Vector3f = na::Vector3<Float>;
pub type Vector4f = na::Vector4<Float>;

pub const EPSILON: Float = 1e-4;
pub const PI: Float = 3.14159265359;
pub const INV_PI: Float = 0.31830988618;
pub const INV_4PI: Float = 0.07957747154;
pub const FLOAT_MAX: Float = std::f32::MAX;

// Average roughness at or below which microfacet lobes collapse to delta lobes.
pub const DELTA_ALPHA_THRESHOLD: Float = 1e-4;

// Offset applied when re-launching rays from a surface.
pub const RAY_EPSILON: Float = 1e-4;
