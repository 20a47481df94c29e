// Copyright @yucwang 2026

use crate::core::bsdf::{ apply_image, is_delta_roughness, BSDFData, BSDFEval, BSDFProperties, BSDFSample, BSDF };
use crate::core::image::Image;
use crate::core::sampler::Sampler;
use crate::materials::microfacet::{ fresnel_schlick, half_vector, reflect, NormalDistribution };
use crate::math::constants::{ Float, Vector2f, EPSILON };
use crate::math::spectrum::RGBSpectrum;
use crate::validate;

pub struct ConductorBSDF {
    roughness: Vector2f,
    specular_reflectance: RGBSpectrum,
    specular_image: Option<usize>,
}

impl ConductorBSDF {
    pub fn new(roughness: Vector2f, specular_reflectance: RGBSpectrum) -> Self {
        Self { roughness, specular_reflectance, specular_image: None }
    }

    pub fn with_specular_image(mut self, image_index: usize) -> Self {
        self.specular_image = Some(image_index);
        self
    }
}

impl BSDF for ConductorBSDF {
    fn sample(&self, data: &BSDFData, images: &[Image], smp: &mut dyn Sampler) -> BSDFSample {
        let spect = &data.spectrum_sample;
        let frame = match data.check_side() {
            Some(frame) => frame,
            None => return BSDFSample::invalid(spect),
        };

        if is_delta_roughness(&self.roughness) {
            let n = frame.nrm();
            let f0 = apply_image(spect, &self.specular_reflectance, self.specular_image, &data.tex(), images);
            let weight = fresnel_schlick(&f0, -n.dot(&data.w_i));
            validate!(weight);
            return BSDFSample {
                w_o: reflect(&-data.w_i, &n).normalize(),
                weight,
                pdf: 1.0,
                eta: 1.0,
                medium_index: None,
                properties: BSDFProperties::DELTA_REFLECTION,
            };
        }

        let ggx = NormalDistribution::new(&frame, self.roughness);
        let m = ggx.sample(smp, &data.w_i);
        let w_o = reflect(&-data.w_i, &m).normalize();
        if frame.nrm().dot(&w_o) <= EPSILON {
            return BSDFSample::invalid(spect);
        }

        let eval = self.evaluate(&data.with_w_o(w_o), images);
        BSDFSample::from_eval(w_o, &eval, BSDFProperties::NONE)
    }

    fn evaluate(&self, data: &BSDFData, images: &[Image]) -> BSDFEval {
        let spect = &data.spectrum_sample;
        if is_delta_roughness(&self.roughness) {
            return BSDFEval::zero(spect);
        }

        let frame = match data.check_side() {
            Some(frame) => frame,
            None => return BSDFEval::zero(spect),
        };
        let m = match half_vector(&data.w_i, &data.w_o) {
            Some(m) => m,
            None => return BSDFEval::zero(spect),
        };

        let n_dot_o = frame.nrm().dot(&data.w_o);
        let n_dot_i = -frame.nrm().dot(&data.w_i);
        let m_dot_o = m.dot(&data.w_o);
        if n_dot_o <= EPSILON || n_dot_i <= EPSILON || m_dot_o <= EPSILON {
            return BSDFEval::zero(spect);
        }

        let ggx = NormalDistribution::new(&frame, self.roughness);
        let eval = ggx.evaluate(&m, &data.w_i, &data.w_o);
        let f0 = apply_image(spect, &self.specular_reflectance, self.specular_image, &data.tex(), images);
        let f = fresnel_schlick(&f0, m_dot_o);

        let func = f * (eval.ndf * eval.visibility / (4.0 * n_dot_i * n_dot_o));
        let bsdf = func * n_dot_o;
        let pdf = eval.pdf / (4.0 * m_dot_o);
        if pdf <= 0.0 {
            return BSDFEval::zero(spect);
        }
        let weight = bsdf / spect.constant(pdf);
        validate!(bsdf);
        validate!(pdf);
        validate!(weight);
        BSDFEval { func, bsdf, weight, pdf }
    }

    fn pdf(&self, data: &BSDFData, _images: &[Image]) -> Float {
        if is_delta_roughness(&self.roughness) {
            return 0.0;
        }

        let frame = match data.check_side() {
            Some(frame) => frame,
            None => return 0.0,
        };
        let m = match half_vector(&data.w_i, &data.w_o) {
            Some(m) => m,
            None => return 0.0,
        };

        let m_dot_o = m.dot(&data.w_o);
        if frame.nrm().dot(&data.w_o) <= EPSILON || m_dot_o <= EPSILON {
            return 0.0;
        }
        let ggx = NormalDistribution::new(&frame, self.roughness);
        ggx.pdf(&m, &data.w_i, &data.w_o) / (4.0 * m_dot_o)
    }

    fn continue_tracing(&self, _tex: &Vector2f, _images: &[Image], _smp: &mut dyn Sampler) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::interaction::tests::sample_hit;
    use crate::core::sampler::LcgRng;
    use crate::math::constants::Vector3f;
    use crate::math::spectrum::SpectralQuery;

    #[test]
    fn test_smooth_mirror() {
        let bsdf = ConductorBSDF::new(Vector2f::zeros(), RGBSpectrum::splat(0.9));
        let hit = sample_hit();
        let spect = SpectralQuery::sample(0.5);
        let w_i = Vector3f::new(0.0, 0.6, -0.8);
        let data = BSDFData::new(spect, None, &hit, w_i, Vector3f::zeros());

        let mut rng = LcgRng::new(1);
        let sample = bsdf.sample(&data, &[], &mut rng);
        assert!(sample.is_delta());
        assert!((sample.w_o - Vector3f::new(0.0, 0.6, 0.8)).norm() < 1e-5);
        assert!(sample.weight.monochromatic() > 0.89);
        assert_eq!(bsdf.pdf(&data.with_w_o(sample.w_o), &[]), 0.0);
    }

    #[test]
    fn test_rough_throughput_is_bounded() {
        let bsdf = ConductorBSDF::new(Vector2f::new(0.3, 0.1), RGBSpectrum::splat(1.0));
        let hit = sample_hit();
        let spect = SpectralQuery::sample(0.25);
        let w_i = Vector3f::new(0.4, 0.0, -1.0).normalize();
        let data = BSDFData::new(spect, None, &hit, w_i, Vector3f::zeros());

        let mut rng = LcgRng::new(17);
        let count = 20000;
        let mut sum = 0.0;
        for _ in 0..count {
            let sample = bsdf.sample(&data, &[], &mut rng);
            if sample.valid() {
                assert!((sample.pdf - bsdf.pdf(&data.with_w_o(sample.w_o), &[])).abs() <= 1e-3 * sample.pdf.max(1.0));
                sum += sample.weight.monochromatic();
            }
        }
        // White furnace: a separable-masking microfacet mirror never gains energy.
        let albedo = sum / count as Float;
        assert!(albedo <= 1.01, "albedo {}", albedo);
        assert!(albedo > 0.8, "albedo {}", albedo);
    }
}
