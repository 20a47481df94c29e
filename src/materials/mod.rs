// Copyright @yucwang 2026

pub mod boundary;
pub mod coating;
pub mod conductor;
pub mod dielectric;
pub mod lambertian_diffuse;
pub mod microfacet;
pub mod plastic;
