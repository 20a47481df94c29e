// Copyright @yucwang 2026

use crate::core::bsdf::{ BSDFData, BSDFEval, BSDFSample, BSDF };
use crate::core::image::Image;
use crate::core::sampler::Sampler;
use crate::materials::boundary::BoundaryBSDF;
use crate::materials::coating::CoatingBSDF;
use crate::materials::conductor::ConductorBSDF;
use crate::materials::dielectric::DielectricBSDF;
use crate::materials::lambertian_diffuse::LambertianDiffuseBSDF;
use crate::materials::plastic::PlasticBSDF;
use crate::math::constants::{ Float, Vector2f };

/// Closed set of material classes; each query is resolved with one match.
pub enum Material {
    Diffuse(LambertianDiffuseBSDF),
    Plastic(PlasticBSDF),
    Coating(CoatingBSDF),
    Dielectric(DielectricBSDF),
    Conductor(ConductorBSDF),
    Boundary(BoundaryBSDF),
}

impl Material {
    pub fn name(&self) -> &'static str {
        match self {
            Material::Diffuse(_) => "diffuse",
            Material::Plastic(_) => "plastic",
            Material::Coating(_) => "coating",
            Material::Dielectric(_) => "dielectric",
            Material::Conductor(_) => "conductor",
            Material::Boundary(_) => "boundary",
        }
    }

    /// Interior and exterior media referenced by interface materials.
    pub fn media(&self) -> [Option<usize>; 2] {
        match self {
            Material::Boundary(m) => m.media(),
            Material::Dielectric(m) => m.media(),
            _ => [None, None],
        }
    }

    pub fn as_boundary(&self) -> Option<&BoundaryBSDF> {
        match self {
            Material::Boundary(boundary) => Some(boundary),
            _ => None,
        }
    }
}

impl BSDF for Material {
    fn sample(&self, data: &BSDFData, images: &[Image], smp: &mut dyn Sampler) -> BSDFSample {
        match self {
            Material::Diffuse(m) => m.sample(data, images, smp),
            Material::Plastic(m) => m.sample(data, images, smp),
            Material::Coating(m) => m.sample(data, images, smp),
            Material::Dielectric(m) => m.sample(data, images, smp),
            Material::Conductor(m) => m.sample(data, images, smp),
            Material::Boundary(m) => m.sample(data, images, smp),
        }
    }

    fn evaluate(&self, data: &BSDFData, images: &[Image]) -> BSDFEval {
        match self {
            Material::Diffuse(m) => m.evaluate(data, images),
            Material::Plastic(m) => m.evaluate(data, images),
            Material::Coating(m) => m.evaluate(data, images),
            Material::Dielectric(m) => m.evaluate(data, images),
            Material::Conductor(m) => m.evaluate(data, images),
            Material::Boundary(m) => m.evaluate(data, images),
        }
    }

    fn pdf(&self, data: &BSDFData, images: &[Image]) -> Float {
        match self {
            Material::Diffuse(m) => m.pdf(data, images),
            Material::Plastic(m) => m.pdf(data, images),
            Material::Coating(m) => m.pdf(data, images),
            Material::Dielectric(m) => m.pdf(data, images),
            Material::Conductor(m) => m.pdf(data, images),
            Material::Boundary(m) => m.pdf(data, images),
        }
    }

    fn continue_tracing(&self, tex: &Vector2f, images: &[Image], smp: &mut dyn Sampler) -> bool {
        match self {
            Material::Diffuse(m) => m.continue_tracing(tex, images, smp),
            Material::Plastic(m) => m.continue_tracing(tex, images, smp),
            Material::Coating(m) => m.continue_tracing(tex, images, smp),
            Material::Dielectric(m) => m.continue_tracing(tex, images, smp),
            Material::Conductor(m) => m.continue_tracing(tex, images, smp),
            Material::Boundary(m) => m.continue_tracing(tex, images, smp),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::interaction::tests::sample_hit;
    use crate::core::sampler::LcgRng;
    use crate::math::constants::Vector3f;
    use crate::math::spectrum::{ RGBSpectrum, SpectralQuery };

    #[test]
    fn test_dispatch_reaches_each_class() {
        let materials = vec![
            Material::Diffuse(LambertianDiffuseBSDF::new(RGBSpectrum::splat(0.5), None)),
            Material::Plastic(PlasticBSDF::new(RGBSpectrum::splat(0.5), RGBSpectrum::splat(1.0), Vector2f::new(0.2, 0.2), 1.5, 1.0)),
            Material::Coating(CoatingBSDF::new(RGBSpectrum::splat(0.5), RGBSpectrum::splat(0.04), Vector2f::new(0.2, 0.2), 1.5, 1.0)),
            Material::Conductor(ConductorBSDF::new(Vector2f::new(0.2, 0.2), RGBSpectrum::splat(0.9))),
        ];
        let hit = sample_hit();
        let spect = SpectralQuery::sample(0.5);
        let w_i = Vector3f::new(0.0, 0.1, -1.0).normalize();
        let w_o = Vector3f::new(0.1, -0.1, 1.0).normalize();
        let data = BSDFData::new(spect, None, &hit, w_i, w_o);
        let mut rng = LcgRng::new(2);

        for material in materials.iter() {
            let eval = material.evaluate(&data, &[]);
            assert!(eval.valid(), "{} failed to evaluate", material.name());
            assert!((eval.pdf - material.pdf(&data, &[])).abs() < 1e-4 * eval.pdf.max(1.0));
            assert!(!material.continue_tracing(&Vector2f::zeros(), &[], &mut rng));
            assert!(material.as_boundary().is_none());
        }

        let boundary = Material::Boundary(BoundaryBSDF::new(Some(0), None));
        assert!(boundary.as_boundary().is_some());
        assert!(!boundary.evaluate(&data, &[]).valid());
    }
}
